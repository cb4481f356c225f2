//! End-to-end scans of document snapshots written to disk
//!
//! Each test builds a small document graph, stores it as a snapshot next to a
//! validator report, and runs the full pipeline through `Scanner::scan_files`.

use a11yscan::geometry::Rectangle;
use a11yscan::graph::{DocumentSnapshot, ObjectGraph};
use a11yscan::objects::{ObjectId, PdfArray, PdfDictionary, PdfObject, PdfStream};
use a11yscan::page_content::{ImageRegion, LayoutGroup, PageLayout};
use a11yscan::{
    PriorityRule, PriorityTier, ScanConfig, ScanError, ScanReport, Scanner, TextType, WarningCode,
};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const XMP: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:pdf="http://ns.adobe.com/pdf/1.3/"
        pdf:Producer="Equidox 7">
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Annual Budget 2024</rdf:li></rdf:Alt></dc:title>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;

/// Builds a document graph page by page
struct DocumentBuilder {
    graph: ObjectGraph,
    pages_id: ObjectId,
    pages: Vec<ObjectId>,
    catalog: PdfDictionary,
}

impl DocumentBuilder {
    fn new() -> Self {
        let mut graph = ObjectGraph::new();
        let pages_id = graph.reserve_id();
        Self {
            graph,
            pages_id,
            pages: Vec::new(),
            catalog: PdfDictionary::new().with("Type", PdfObject::name("Catalog")),
        }
    }

    fn image(&mut self, data: &[u8], width: i64, height: i64) -> ObjectId {
        self.graph.add_object(PdfStream::new(
            PdfDictionary::new()
                .with("Type", PdfObject::name("XObject"))
                .with("Subtype", PdfObject::name("Image"))
                .with("Width", width)
                .with("Height", height),
            data.to_vec(),
        ))
    }

    fn page(&mut self, images: &[ObjectId], annots: Vec<PdfObject>) -> ObjectId {
        let mut xobjects = PdfDictionary::new();
        for (i, id) in images.iter().enumerate() {
            xobjects.insert(format!("Im{i}"), *id);
        }
        let id = self.graph.add_object(
            PdfDictionary::new()
                .with("Type", PdfObject::name("Page"))
                .with("Parent", self.pages_id)
                .with("MediaBox", PdfArray(vec![0i64.into(), 0i64.into(), 612i64.into(), 792i64.into()]))
                .with("Resources", PdfDictionary::new().with("XObject", xobjects))
                .with("Annots", PdfArray(annots)),
        );
        self.pages.push(id);
        id
    }

    fn node(&mut self, dict: PdfDictionary) -> PdfObject {
        self.graph.add_object(dict).into()
    }

    fn structure(&mut self, kids: Vec<PdfObject>, role_map: Option<PdfDictionary>) {
        let mut root = PdfDictionary::new()
            .with("Type", PdfObject::name("StructTreeRoot"))
            .with("K", PdfArray(kids));
        if let Some(role_map) = role_map {
            root.insert("RoleMap", role_map);
        }
        let root = self.graph.add_object(root);
        self.catalog.insert("StructTreeRoot", root);
    }

    fn snapshot(mut self, layouts: Vec<PageLayout>) -> DocumentSnapshot {
        let kids = self.pages.iter().map(|id| PdfObject::from(*id)).collect();
        self.graph.insert(
            self.pages_id,
            PdfDictionary::new()
                .with("Type", PdfObject::name("Pages"))
                .with("Kids", PdfArray(kids))
                .with("Count", self.pages.len() as i64),
        );
        self.catalog.insert("Pages", self.pages_id);
        let catalog = self.graph.add_object(self.catalog);
        self.graph.set_root(catalog);
        DocumentSnapshot::from_graph(&self.graph, layouts)
    }
}

fn letter() -> Rectangle {
    Rectangle::from_corners(0.0, 0.0, 612.0, 792.0)
}

fn text_pages(count: usize) -> Vec<PageLayout> {
    (0..count)
        .map(|_| PageLayout::new(letter()).with_group(LayoutGroup::text()))
        .collect()
}

fn validator_report(summaries: &str) -> String {
    format!(
        r#"{{"report": {{"buildInformation": {{}}, "jobs": [{{"itemDetails": {{"name": "doc.pdf"}},
            "validationResult": [{{"compliant": false, "details": {{"passedRules": 90, "failedRules": 3,
            "ruleSummaries": {summaries}}}}}]}}]}}}}"#
    )
}

/// Write a snapshot and a validator report into `dir`
fn write_inputs(dir: &Path, stem: &str, snapshot: &DocumentSnapshot, report: &str) -> (PathBuf, PathBuf) {
    let snapshot_path = dir.join(format!("{stem}.json"));
    let report_path = dir.join(format!("{stem}-vera.json"));
    std::fs::write(&snapshot_path, snapshot.to_json_string().unwrap()).unwrap();
    std::fs::write(&report_path, report).unwrap();
    (snapshot_path, report_path)
}

fn scan(snapshot: &DocumentSnapshot, report: &str) -> ScanReport {
    let dir = TempDir::new().unwrap();
    let (snapshot_path, report_path) = write_inputs(dir.path(), "doc", snapshot, report);
    Scanner::default()
        .scan_files(&report_path, &snapshot_path)
        .unwrap()
}

/// Three-page budget document exported by an approved generator: a chart
/// repeated on two pages (alt text on one occurrence) and an undescribed
/// photo on the third page.
fn budget_document() -> DocumentSnapshot {
    let mut doc = DocumentBuilder::new();
    let chart = doc.image(b"chart-pixels", 400, 300);
    let photo = doc.image(b"photo-pixels", 800, 600);
    let page1 = doc.page(&[chart], vec![]);
    let page2 = doc.page(&[chart], vec![]);
    let page3 = doc.page(&[photo], vec![]);

    let h1 = doc.node(PdfDictionary::new().with("S", PdfObject::name("Title1")).with("Pg", page1));
    let chart_alt = doc.node(
        PdfDictionary::new()
            .with("S", PdfObject::name("Chart"))
            .with("Pg", page1)
            .with("Alt", PdfObject::string("Spending by department, 2024")),
    );
    let h2 = doc.node(PdfDictionary::new().with("S", PdfObject::name("H2")));
    let section2 = doc.node(
        PdfDictionary::new()
            .with("S", PdfObject::name("Sect"))
            .with("Pg", page2)
            .with("K", PdfArray(vec![h2, PdfObject::Integer(0)])),
    );
    let chart_again = doc.node(PdfDictionary::new().with("S", PdfObject::name("Figure")).with("Pg", page2));
    let h3 = doc.node(PdfDictionary::new().with("S", PdfObject::name("H3")));
    let photo_node = doc.node(PdfDictionary::new().with("S", PdfObject::name("Figure")).with("Pg", page3));
    let document = doc.node(
        PdfDictionary::new()
            .with("S", PdfObject::name("Document"))
            .with(
                "K",
                PdfArray(vec![h1, chart_alt, section2, chart_again, h3, photo_node]),
            ),
    );

    doc.structure(
        vec![document],
        Some(
            PdfDictionary::new()
                .with("Title1", PdfObject::name("H1"))
                .with("Chart", PdfObject::name("Figure")),
        ),
    );

    let metadata = doc.graph.add_object(PdfStream::new(
        PdfDictionary::new()
            .with("Type", PdfObject::name("Metadata"))
            .with("Subtype", PdfObject::name("XML")),
        XMP.as_bytes().to_vec(),
    ));
    doc.catalog.insert("Metadata", metadata);
    doc.catalog.insert("Lang", PdfObject::string("en-US"));
    doc.snapshot(text_pages(3))
}

#[test]
fn test_budget_document_end_to_end() {
    let report = scan(
        &budget_document(),
        &validator_report(
            r#"[
                {"clause": "7.2", "testNumber": 3, "failedChecks": 900},
                {"clause": "7.18.5", "testNumber": 1, "failedChecks": 2},
                {"clause": "7.3", "testNumber": 1, "failedChecks": 1}
            ]"#,
        ),
    );

    let features = &report.features;
    assert_eq!(features.violation_count, 2);
    assert_eq!(features.failed_check_count, 3);
    assert!(features.tagged);
    assert_eq!(features.text_type, TextType::TextOnly);
    assert!(!features.has_form);
    assert!(features.title_set);
    assert!(features.language_set);
    assert_eq!(features.page_count, 3);
    assert!(!features.has_bookmarks);
    assert!(features.approved_generator);
    assert!(features.headings_valid);
    assert_eq!(features.images_with_alt, 1);
    assert_eq!(features.images_without_alt, 1);

    assert_eq!(report.structure.headings, vec![1, 2, 3]);
    assert_eq!(report.structure.figure_count, 3);
    assert_eq!(report.metadata.title.as_deref(), Some("Annual Budget 2024"));
    assert_eq!(report.metadata.producer.as_deref(), Some("Equidox 7"));
    assert_eq!(report.classification.tier, PriorityTier::Low);
    assert_eq!(report.classification.rule, PriorityRule::ApprovedGenerator);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_scanned_untagged_document() {
    let mut doc = DocumentBuilder::new();
    let scan_image = doc.image(b"scanner-output", 2550, 3300);
    doc.page(&[scan_image], vec![]);
    doc.page(&[scan_image], vec![]);
    let layouts = (0..2)
        .map(|_| {
            PageLayout::new(letter())
                .with_image_region(ImageRegion::new(Rectangle::from_corners(0.0, 0.0, 612.0, 792.0)))
        })
        .collect();
    let snapshot = doc.snapshot(layouts);

    let report = scan(
        &snapshot,
        &validator_report(
            r#"[
                {"clause": "7.1", "testNumber": "3", "failedChecks": 2},
                {"clause": "7.1", "testNumber": "11", "failedChecks": 1}
            ]"#,
        ),
    );

    assert!(report.validation.untagged);
    assert!(report.validation.suspect_image_only);
    assert!(!report.features.tagged);
    assert_eq!(report.features.text_type, TextType::ImageOnly);
    assert_eq!(report.classification.rule, PriorityRule::Untagged);
    assert!(report.requires_review());

    // Untagged: the walker falls back to its defaults
    assert_eq!(report.structure.nodes_visited, 0);
    assert!(report.structure.image_coverage.is_empty());
}

#[test]
fn test_form_with_errors_is_high() {
    let mut doc = DocumentBuilder::new();
    let field = PdfDictionary::new()
        .with("Subtype", PdfObject::name("Widget"))
        .with("FT", PdfObject::name("Tx"))
        .with("T", PdfObject::string("applicant_name"));
    doc.page(&[], vec![field.into()]);
    for _ in 0..3 {
        doc.page(&[], vec![]);
    }
    let h1 = doc.node(PdfDictionary::new().with("S", PdfObject::name("H1")));
    doc.structure(vec![h1], None);
    let snapshot = doc.snapshot(text_pages(4));

    let report = scan(
        &snapshot,
        &validator_report(r#"[{"clause": "7.18.4", "testNumber": 1, "failedChecks": 20}]"#),
    );

    assert!(report.features.has_form);
    assert_eq!(report.classification.errors_per_page, 5);
    assert_eq!(report.classification.tier, PriorityTier::High);
    assert_eq!(report.classification.rule, PriorityRule::FormWithErrors);
}

#[test]
fn test_outline_counts_as_bookmarks() {
    let mut doc = DocumentBuilder::new();
    doc.page(&[], vec![]);
    let h1 = doc.node(PdfDictionary::new().with("S", PdfObject::name("H1")));
    doc.structure(vec![h1], None);
    let first = doc.graph.add_object(PdfDictionary::new().with("Title", PdfObject::string("Introduction")));
    let outlines = doc.graph.add_object(
        PdfDictionary::new()
            .with("Type", PdfObject::name("Outlines"))
            .with("First", first)
            .with("Count", -1i64),
    );
    doc.catalog.insert("Outlines", outlines);
    let snapshot = doc.snapshot(text_pages(1));

    let report = scan(&snapshot, &validator_report("[]"));
    assert!(report.features.has_bookmarks);
}

#[test]
fn test_soft_failures_do_not_abort() {
    let mut doc = DocumentBuilder::new();
    doc.page(&[], vec![]);
    let h2 = doc.node(PdfDictionary::new().with("S", PdfObject::name("H2")));
    doc.structure(vec![h2], None);
    let broken_xmp = doc.graph.add_object(PdfStream::new(
        PdfDictionary::new().with("Subtype", PdfObject::name("XML")),
        b"<x:xmpmeta><unclosed>".to_vec(),
    ));
    doc.catalog.insert("Metadata", broken_xmp);
    let snapshot = doc.snapshot(text_pages(1));

    // A crashed validator leaves an empty file
    let report = scan(&snapshot, "");

    let codes: Vec<WarningCode> = report.warnings.iter().map(|w| w.code).collect();
    assert_eq!(
        codes,
        vec![
            WarningCode::MalformedValidatorReport,
            WarningCode::MetadataUnreadable
        ]
    );
    assert_eq!(report.features.violation_count, 0);
    assert!(!report.features.headings_valid);
    assert_eq!(report.classification.rule, PriorityRule::NoErrors);
}

#[test]
fn test_unreadable_snapshot_is_fatal() {
    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("corrupt.json");
    let report_path = dir.path().join("corrupt-vera.json");
    std::fs::write(&snapshot_path, b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj").unwrap();
    std::fs::write(&report_path, validator_report("[]")).unwrap();

    let err = Scanner::default()
        .scan_files(&report_path, &snapshot_path)
        .unwrap_err();
    assert!(matches!(err, ScanError::DocumentUnreadable(_)));
}

#[test]
fn test_missing_validator_report_is_io_error() {
    let dir = TempDir::new().unwrap();
    let (snapshot_path, _) = write_inputs(dir.path(), "doc", &budget_document(), "{}");

    let err = Scanner::default()
        .scan_files(dir.path().join("nope.json"), &snapshot_path)
        .unwrap_err();
    assert!(matches!(err, ScanError::Io(_)));
}

#[test]
fn test_custom_config_changes_signals() {
    let config = ScanConfig::default().with_approved_generators(Vec::<String>::new());
    let dir = TempDir::new().unwrap();
    let (snapshot_path, report_path) = write_inputs(
        dir.path(),
        "budget",
        &budget_document(),
        &validator_report(r#"[{"clause": "7.18.5", "testNumber": 1, "failedChecks": 15}]"#),
    );

    let report = Scanner::new(config)
        .scan_files(&report_path, &snapshot_path)
        .unwrap();
    assert!(!report.features.approved_generator);
    assert_eq!(report.classification.rule, PriorityRule::MediumErrorDensity);
    assert_eq!(report.classification.tier, PriorityTier::Medium);
}

#[test]
fn test_report_json_shape() {
    let report = scan(&budget_document(), &validator_report("[]"));
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["classification"]["tier"], "Low");
    assert_eq!(json["classification"]["rule"], "approved_generator");
    assert_eq!(json["features"]["text_type"], "Text Only");
    assert_eq!(json["structure"]["image_coverage"].as_object().unwrap().len(), 2);
    assert!(json["scanned_at"].is_string());
}

//! Single-document scan pipeline
//!
//! Combines the validator report, the document graph and the page layout
//! analysis into a [`ScanReport`]:
//!
//! ```text
//! validator report ──► ValidationReportAggregator ─┐
//! document graph ────► StructureTreeWalker ────────┤
//!                 └──► metadata ───────────────────┼─► DocumentFeatureVector ─► classify
//! page layouts ──────► PageContentClassifier ──────┘
//! ```
//!
//! Only an unusable document graph fails the scan. Every other problem
//! degrades the affected signal and is listed in [`ScanReport::warnings`].

use crate::config::ScanConfig;
use crate::error::{Result, ScanWarning, WarningCode};
use crate::graph::{Document, DocumentSnapshot, ObjectResolver};
use crate::headings::{check_heading_hierarchy, HeadingIssue};
use crate::metadata::{read_metadata, DocumentMetadata};
use crate::page_content::{DocumentContent, PageLayout};
use crate::priority::{classify, Classification, DocumentFeatureVector};
use crate::structure::StructureSummary;
use crate::validation::ValidationReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything learned about one document
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub features: DocumentFeatureVector,
    pub classification: Classification,
    pub validation: ValidationReport,
    pub content: DocumentContent,
    pub structure: StructureSummary,
    pub metadata: DocumentMetadata,
    /// First heading rule broken, if any
    pub heading_issue: Option<HeadingIssue>,
    pub warnings: Vec<ScanWarning>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn requires_review(&self) -> bool {
        self.classification.requires_review()
    }
}

/// Runs the scan pipeline with one configuration
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan one document.
    ///
    /// `validator_report` is the raw validator output; it is tolerated in
    /// any shape. `layouts` holds one entry per page in page order.
    pub fn scan(
        &self,
        validator_report: &str,
        resolver: &dyn ObjectResolver,
        layouts: &[PageLayout],
    ) -> Result<ScanReport> {
        let document = Document::open(resolver)?;
        let mut warnings = Vec::new();

        let validation = self.config.aggregator().aggregate_str(validator_report);
        warnings.extend(validation.warnings);
        let validation = validation.report;

        let mut structure = self.config.walker().walk(&document);
        warnings.append(&mut structure.warnings);

        let metadata = read_metadata(&document);
        warnings.extend(metadata.warnings);
        let metadata = metadata.metadata;

        let page_count = document.page_count();
        if layouts.len() != page_count {
            warn!(
                "layout analysis covers {} pages, document has {}",
                layouts.len(),
                page_count
            );
            warnings.push(ScanWarning::new(
                WarningCode::LayoutPageMismatch,
                format!(
                    "layout analysis covers {} pages, document has {page_count}",
                    layouts.len()
                ),
            ));
        }
        let content = self.config.page_classifier().classify_document(layouts);

        let tagged = document.structure_tree_root().is_some() && !validation.untagged;
        let heading_issue = check_heading_hierarchy(&structure.headings).err();
        debug!(
            "tagged={} headings={:?} figures={}",
            tagged, structure.headings, structure.figure_count
        );

        let features = DocumentFeatureVector {
            violation_count: validation.violation_count,
            failed_check_count: validation.failed_check_count,
            tagged,
            text_type: content.text_type,
            has_form: structure.has_form,
            title_set: metadata.title_set(),
            language_set: metadata.language_set(),
            page_count: page_count as u64,
            has_bookmarks: structure.has_bookmarks,
            approved_generator: metadata
                .is_approved_generator(self.config.approved_generators.as_slice()),
            suspect_image_only: validation.suspect_image_only,
            headings_valid: heading_issue.is_none(),
            images_with_alt: structure.covered_images() as u64,
            images_without_alt: structure.uncovered_images() as u64,
        };

        let classification = classify(&features);
        info!(
            "classified as {} ({}), {} failed checks over {} pages",
            classification.tier, classification.rule, features.failed_check_count, page_count
        );

        Ok(ScanReport {
            features,
            classification,
            validation,
            content,
            structure,
            metadata,
            heading_issue,
            warnings,
            scanned_at: Utc::now(),
        })
    }

    /// Scan a document snapshot, using the layouts it carries
    pub fn scan_snapshot(
        &self,
        validator_report: &str,
        snapshot: DocumentSnapshot,
    ) -> Result<ScanReport> {
        let (graph, layouts) = snapshot.into_parts();
        self.scan(validator_report, &graph, &layouts)
    }

    /// Scan from a validator report file and a snapshot file
    pub fn scan_files<R: AsRef<Path>, S: AsRef<Path>>(
        &self,
        validator_report: R,
        snapshot: S,
    ) -> Result<ScanReport> {
        let snapshot = DocumentSnapshot::load(snapshot)?;
        // Raw bytes: a validator that crashed may leave a non-UTF-8 or empty file
        let report = std::fs::read(validator_report)?;
        self.scan_snapshot(&String::from_utf8_lossy(&report), snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;
    use crate::graph::ObjectGraph;
    use crate::objects::{PdfArray, PdfDictionary, PdfObject};
    use crate::page_content::{ImageRegion, LayoutGroup, TextType};
    use crate::priority::{PriorityRule, PriorityTier};
    use crate::ScanError;

    const CLEAN_REPORT: &str =
        r#"{"report": {"jobs": [{"validationResult": [{"details": {"ruleSummaries": []}}]}]}}"#;

    fn report(summaries: &str) -> String {
        format!(
            r#"{{"report": {{"jobs": [{{"validationResult": [{{"details": {{"ruleSummaries": {summaries}}}}}]}}]}}}}"#
        )
    }

    fn letter() -> Rectangle {
        Rectangle::from_corners(0.0, 0.0, 612.0, 792.0)
    }

    /// Tagged document with `pages` pages and one H1
    fn tagged_document(pages: usize, tagged: bool) -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        let kids: Vec<PdfObject> = (0..pages)
            .map(|_| {
                graph
                    .add_object(PdfDictionary::new().with("Type", PdfObject::name("Page")))
                    .into()
            })
            .collect();
        let tree = graph.add_object(
            PdfDictionary::new()
                .with("Type", PdfObject::name("Pages"))
                .with("Kids", PdfArray(kids)),
        );
        let mut catalog = PdfDictionary::new()
            .with("Type", PdfObject::name("Catalog"))
            .with("Pages", tree)
            .with("Lang", PdfObject::string("en"));
        if tagged {
            let h1 = graph.add_object(PdfDictionary::new().with("S", PdfObject::name("H1")));
            let root = graph.add_object(
                PdfDictionary::new()
                    .with("Type", PdfObject::name("StructTreeRoot"))
                    .with("K", PdfArray(vec![h1.into()])),
            );
            catalog.insert("StructTreeRoot", root);
        }
        let catalog = graph.add_object(catalog);
        graph.set_root(catalog);
        graph
    }

    fn text_layouts(pages: usize) -> Vec<PageLayout> {
        (0..pages)
            .map(|_| PageLayout::new(letter()).with_group(LayoutGroup::text()))
            .collect()
    }

    #[test]
    fn test_clean_tagged_document_is_low() {
        let graph = tagged_document(2, true);
        let report = Scanner::default()
            .scan(CLEAN_REPORT, &graph, &text_layouts(2))
            .unwrap();

        assert!(report.features.tagged);
        assert_eq!(report.features.page_count, 2);
        assert_eq!(report.features.text_type, TextType::TextOnly);
        assert!(report.features.language_set);
        assert!(report.features.headings_valid);
        assert_eq!(report.classification.tier, PriorityTier::Low);
        assert_eq!(report.classification.rule, PriorityRule::NoErrors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validator_untagged_flag_overrides_structure_root() {
        let graph = tagged_document(1, true);
        let report = Scanner::default()
            .scan(
                &report(r#"[{"clause": "7.1", "testNumber": 11, "failedChecks": 1}]"#),
                &graph,
                &text_layouts(1),
            )
            .unwrap();
        assert!(!report.features.tagged);
        assert_eq!(report.classification.rule, PriorityRule::Untagged);
    }

    #[test]
    fn test_missing_structure_root_is_untagged() {
        let graph = tagged_document(1, false);
        let report = Scanner::default()
            .scan(CLEAN_REPORT, &graph, &text_layouts(1))
            .unwrap();
        assert!(!report.features.tagged);
        assert!(report.requires_review());
        assert_eq!(report.heading_issue, Some(HeadingIssue::Empty));
    }

    #[test]
    fn test_scanned_pages_are_image_only() {
        let graph = tagged_document(1, true);
        let scan = PageLayout::new(letter()).with_image_region(ImageRegion::new(letter()));
        let report = Scanner::default().scan(CLEAN_REPORT, &graph, &[scan]).unwrap();
        assert_eq!(report.features.text_type, TextType::ImageOnly);
        assert_eq!(report.classification.rule, PriorityRule::ImageOnly);
    }

    #[test]
    fn test_soft_failures_become_warnings() {
        let graph = tagged_document(2, true);
        let report = Scanner::default().scan("", &graph, &text_layouts(1)).unwrap();

        let codes: Vec<WarningCode> = report.warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            vec![
                WarningCode::MalformedValidatorReport,
                WarningCode::LayoutPageMismatch
            ]
        );
        assert_eq!(report.validation, ValidationReport::default());
    }

    #[test]
    fn test_unreadable_graph_fails() {
        let graph = ObjectGraph::new();
        let err = Scanner::default().scan(CLEAN_REPORT, &graph, &[]).unwrap_err();
        assert!(matches!(err, ScanError::DocumentUnreadable(_)));
    }

    #[test]
    fn test_report_serializes() {
        let graph = tagged_document(1, true);
        let report = Scanner::default()
            .scan(CLEAN_REPORT, &graph, &text_layouts(1))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["classification"]["tier"], "Low");
        assert_eq!(json["features"]["text_type"], "Text Only");
    }
}

//! Document metadata signals
//!
//! Title and producer come from the XMP metadata stream when it has them and
//! from the document information dictionary otherwise. The natural language
//! comes from the catalog `/Lang` entry.

use crate::error::{Result, ScanError, ScanWarning, WarningCode};
use crate::graph::Document;
use crate::objects::{PdfObject, PdfStream};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(feature = "compression")]
use flate2::read::ZlibDecoder;
#[cfg(feature = "compression")]
use std::io::Read;

/// PDF producers whose output is trusted to be accessible
pub const DEFAULT_APPROVED_GENERATORS: &[&str] = &["Equidox 7"];

const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const NS_PDF: &str = "http://ns.adobe.com/pdf/1.3/";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Metadata values relevant to accessibility triage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub language: Option<String>,
    pub producer: Option<String>,
}

impl DocumentMetadata {
    pub fn title_set(&self) -> bool {
        self.title.is_some()
    }

    pub fn language_set(&self) -> bool {
        self.language.is_some()
    }

    /// Producer matches an allowlist entry exactly, ignoring surrounding
    /// whitespace
    pub fn is_approved_generator<S: AsRef<str>>(&self, allowlist: &[S]) -> bool {
        self.producer.as_deref().is_some_and(|producer| {
            let producer = producer.trim();
            allowlist.iter().any(|approved| approved.as_ref().trim() == producer)
        })
    }
}

/// Values found in an XMP packet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpMetadata {
    pub title: Option<String>,
    pub producer: Option<String>,
}

/// Metadata plus the warnings raised while reading it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOutcome {
    pub metadata: DocumentMetadata,
    pub warnings: Vec<ScanWarning>,
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse an XMP packet.
///
/// `dc:title` is read from its `rdf:Alt` items (the first non-empty one), or
/// from the element text when a producer wrote it without a container.
/// `pdf:Producer` may be an element or an attribute of `rdf:Description`.
pub fn parse_xmp(xml: &str) -> Result<XmpMetadata> {
    let xml = xml.trim_start_matches('\u{feff}');
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ScanError::Decode(format!("XMP is not well-formed XML: {e}")))?;

    let mut xmp = XmpMetadata::default();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let tag = node.tag_name();
        match (tag.namespace(), tag.name()) {
            (Some(NS_DC), "title") if xmp.title.is_none() => {
                let items: Vec<_> = node
                    .descendants()
                    .filter(|n| n.is_element() && n.tag_name().namespace() == Some(NS_RDF))
                    .filter(|n| n.tag_name().name() == "li")
                    .collect();
                xmp.title = if items.is_empty() {
                    node.text().and_then(non_empty)
                } else {
                    items.iter().find_map(|li| li.text().and_then(non_empty))
                };
            }
            (Some(NS_PDF), "Producer") if xmp.producer.is_none() => {
                xmp.producer = node.text().and_then(non_empty);
            }
            (Some(NS_RDF), "Description") if xmp.producer.is_none() => {
                xmp.producer = node.attribute((NS_PDF, "Producer")).and_then(non_empty);
            }
            _ => {}
        }
    }

    Ok(xmp)
}

/// Decoded bytes of a metadata stream
pub fn decode_metadata_stream(stream: &PdfStream) -> Result<Vec<u8>> {
    match stream.filters().as_slice() {
        [] => Ok(stream.raw_data().to_vec()),
        ["FlateDecode"] => decode_flate(stream.raw_data()),
        other => Err(ScanError::Decode(format!(
            "unsupported metadata filter chain {other:?}"
        ))),
    }
}

#[cfg(feature = "compression")]
fn decode_flate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut result = Vec::new();
    decoder
        .read_to_end(&mut result)
        .map_err(|e| ScanError::Decode(format!("Flate decode error: {e}")))?;
    Ok(result)
}

#[cfg(not(feature = "compression"))]
fn decode_flate(_data: &[u8]) -> Result<Vec<u8>> {
    Err(ScanError::Decode(
        "FlateDecode requires 'compression' feature".to_string(),
    ))
}

fn read_xmp(stream: &PdfStream) -> Result<XmpMetadata> {
    let bytes = decode_metadata_stream(stream)?;
    let xml = String::from_utf8_lossy(&bytes);
    parse_xmp(&xml)
}

/// Collect title, language and producer.
///
/// An unreadable XMP stream is not fatal: the information dictionary is
/// still consulted and a `METADATA_UNREADABLE` warning is recorded.
pub fn read_metadata(document: &Document<'_>) -> MetadataOutcome {
    let mut warnings = Vec::new();

    let xmp = match document.metadata_stream() {
        Some(stream) => match read_xmp(stream) {
            Ok(xmp) => xmp,
            Err(e) => {
                warn!("metadata stream unreadable: {}", e);
                warnings.push(ScanWarning::new(WarningCode::MetadataUnreadable, e.to_string()));
                XmpMetadata::default()
            }
        },
        None => {
            debug!("no XMP metadata stream");
            XmpMetadata::default()
        }
    };

    let info_text = |key: &str| {
        document
            .info()
            .and_then(|info| document.get(info, key))
            .and_then(PdfObject::as_string)
            .and_then(|s| non_empty(&s.to_text()))
    };

    let language = document
        .get(document.catalog(), "Lang")
        .and_then(PdfObject::as_string)
        .and_then(|s| non_empty(&s.to_text()));

    MetadataOutcome {
        metadata: DocumentMetadata {
            title: xmp.title.or_else(|| info_text("Title")),
            language,
            producer: xmp.producer.or_else(|| info_text("Producer")),
        },
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ObjectGraph;
    use crate::objects::PdfDictionary;

    const XMP: &str = r#"<?xpacket begin="\u{feff}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title><rdf:Alt><rdf:li xml:lang="x-default">Annual Report</rdf:li></rdf:Alt></dc:title>
    </rdf:Description>
    <rdf:Description rdf:about="" xmlns:pdf="http://ns.adobe.com/pdf/1.3/">
      <pdf:Producer>Equidox 7</pdf:Producer>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    fn document_with(
        catalog_extra: impl FnOnce(&mut ObjectGraph, &mut PdfDictionary),
        info: Option<PdfDictionary>,
    ) -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        let mut catalog = PdfDictionary::new().with("Type", PdfObject::name("Catalog"));
        catalog_extra(&mut graph, &mut catalog);
        let catalog = graph.add_object(catalog);
        graph.set_root(catalog);
        if let Some(info) = info {
            let info = graph.add_object(info);
            graph.set_info(info);
        }
        graph
    }

    fn xmp_stream(data: Vec<u8>, flate: bool) -> PdfStream {
        let mut dict = PdfDictionary::new()
            .with("Type", PdfObject::name("Metadata"))
            .with("Subtype", PdfObject::name("XML"));
        if flate {
            dict.insert("Filter", PdfObject::name("FlateDecode"));
        }
        PdfStream::new(dict, data)
    }

    #[test]
    fn test_parse_xmp_elements() {
        let xmp = parse_xmp(XMP).unwrap();
        assert_eq!(xmp.title.as_deref(), Some("Annual Report"));
        assert_eq!(xmp.producer.as_deref(), Some("Equidox 7"));
    }

    #[test]
    fn test_parse_xmp_producer_attribute() {
        let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
<rdf:Description rdf:about="" xmlns:pdf="http://ns.adobe.com/pdf/1.3/" pdf:Producer="Acrobat PDFMaker 23"/>
</rdf:RDF></x:xmpmeta>"#;
        let xmp = parse_xmp(xml).unwrap();
        assert_eq!(xmp.producer.as_deref(), Some("Acrobat PDFMaker 23"));
        assert_eq!(xmp.title, None);
    }

    #[test]
    fn test_parse_xmp_blank_title_is_unset() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="http://purl.org/dc/elements/1.1/">
<rdf:Description><dc:title><rdf:Alt><rdf:li xml:lang="x-default">  </rdf:li></rdf:Alt></dc:title></rdf:Description></rdf:RDF>"#;
        assert_eq!(parse_xmp(xml).unwrap().title, None);
    }

    #[test]
    fn test_parse_xmp_rejects_garbage() {
        assert!(matches!(parse_xmp("<x:xmpmeta"), Err(ScanError::Decode(_))));
    }

    #[test]
    fn test_read_metadata_prefers_xmp() {
        let graph = document_with(
            |graph, catalog| {
                let stream = graph.add_object(xmp_stream(XMP.as_bytes().to_vec(), false));
                catalog.insert("Metadata", stream);
                catalog.insert("Lang", PdfObject::string("en-US"));
            },
            Some(
                PdfDictionary::new()
                    .with("Title", PdfObject::string("Untitled-1"))
                    .with("Producer", PdfObject::string("Word")),
            ),
        );
        let outcome = read_metadata(&Document::open(&graph).unwrap());

        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.metadata.title.as_deref(), Some("Annual Report"));
        assert_eq!(outcome.metadata.language.as_deref(), Some("en-US"));
        assert_eq!(outcome.metadata.producer.as_deref(), Some("Equidox 7"));
        assert!(outcome.metadata.is_approved_generator(DEFAULT_APPROVED_GENERATORS));
    }

    #[test]
    fn test_read_metadata_falls_back_to_info() {
        let graph = document_with(
            |_, catalog| catalog.insert("Lang", PdfObject::string("")),
            Some(
                PdfDictionary::new()
                    .with("Title", PdfObject::string("Budget"))
                    .with("Producer", PdfObject::string(" Equidox 7 ")),
            ),
        );
        let metadata = read_metadata(&Document::open(&graph).unwrap()).metadata;

        assert!(metadata.title_set());
        assert!(!metadata.language_set());
        assert_eq!(metadata.producer.as_deref(), Some("Equidox 7"));
        assert!(metadata.is_approved_generator(&["Equidox 7".to_string()][..]));
    }

    #[test]
    fn test_unreadable_xmp_warns_and_uses_info() {
        let graph = document_with(
            |graph, catalog| {
                let stream = graph.add_object(xmp_stream(b"<broken".to_vec(), false));
                catalog.insert("Metadata", stream);
            },
            Some(PdfDictionary::new().with("Title", PdfObject::string("Budget"))),
        );
        let outcome = read_metadata(&Document::open(&graph).unwrap());

        assert_eq!(outcome.metadata.title.as_deref(), Some("Budget"));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code, WarningCode::MetadataUnreadable);
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_flate_compressed_xmp() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(XMP.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let graph = document_with(
            |graph, catalog| {
                let stream = graph.add_object(xmp_stream(compressed, true));
                catalog.insert("Metadata", stream);
            },
            None,
        );
        let metadata = read_metadata(&Document::open(&graph).unwrap()).metadata;
        assert_eq!(metadata.title.as_deref(), Some("Annual Report"));
    }

    #[test]
    fn test_approved_generator_is_exact_match() {
        let metadata = DocumentMetadata {
            producer: Some("Equidox 7.1".to_string()),
            ..DocumentMetadata::default()
        };
        assert!(!metadata.is_approved_generator(DEFAULT_APPROVED_GENERATORS));
        assert!(!DocumentMetadata::default().is_approved_generator(DEFAULT_APPROVED_GENERATORS));
    }
}

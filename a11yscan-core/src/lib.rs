//! # a11yscan
//!
//! Accessibility signal extraction and remediation priority classification for
//! PDF documents.
//!
//! Given an already-parsed document graph, a PDF/UA validator report and a
//! per-page layout analysis, a11yscan extracts a fixed set of accessibility
//! signals and assigns the document a remediation priority.
//!
//! ## Features
//!
//! - **Validator aggregation**: Collapse rule-level validator output into
//!   violation and failed-check counts, filtering rules known to be noise
//! - **Structure inspection**: Walk the tagged structure tree to check alternate
//!   text on figures, collect heading levels and detect forms and bookmarks
//! - **Page composition**: Detect scanned, image-only documents from layout
//!   analysis
//! - **Metadata**: Read the title, language and producer from the Info
//!   dictionary and the XMP stream
//! - **Priority classification**: An ordered decision table mapping the
//!   feature vector to High, Medium or Low
//! - **Batch scanning**: Scan many documents in parallel, one failure never
//!   stopping the batch
//!
//! ## Quick Start
//!
//! ```rust
//! use a11yscan::{classify, DocumentFeatureVector, PriorityTier, TextType};
//!
//! let features = DocumentFeatureVector {
//!     violation_count: 4,
//!     failed_check_count: 40,
//!     tagged: true,
//!     text_type: TextType::TextOnly,
//!     page_count: 10,
//!     ..Default::default()
//! };
//!
//! let classification = classify(&features);
//! assert_eq!(classification.tier, PriorityTier::Low);
//! assert_eq!(classification.errors_per_page, 4);
//! ```
//!
//! ### Scanning a document snapshot
//!
//! ```rust,no_run
//! use a11yscan::{ScanConfig, Scanner};
//!
//! # fn main() -> a11yscan::Result<()> {
//! let scanner = Scanner::new(ScanConfig::load("a11yscan.json")?);
//! let report = scanner.scan_files("annual-report-vera.json", "annual-report.json")?;
//!
//! println!("{} ({})", report.classification.tier, report.classification.rule);
//! for warning in &report.warnings {
//!     println!("warning: {warning}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod headings;
pub mod metadata;
pub mod objects;
pub mod page_content;
pub mod priority;
pub mod scan;
pub mod structure;
pub mod validation;

// Re-export scan types
pub use config::ScanConfig;
pub use error::{Result, ScanError, ScanWarning, WarningCode};
pub use scan::{ScanReport, Scanner};

// Re-export signal extraction types
pub use graph::{Document, DocumentSnapshot, ObjectGraph, ObjectResolver};
pub use headings::{check_heading_hierarchy, verify_heading_hierarchy, HeadingIssue};
pub use metadata::DocumentMetadata;
pub use page_content::{PageContentClassifier, PageLayout, TextType};
pub use structure::{ImageIdentity, StructureSummary, StructureTreeWalker};
pub use validation::{ValidationReport, ValidationReportAggregator};

// Re-export classification types
pub use priority::{
    classify, requires_review, Classification, DocumentFeatureVector, PriorityRule, PriorityTier,
};

/// Current version of a11yscan
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_scanner_uses_default_config() {
        let scanner = Scanner::default();
        assert_eq!(scanner.config(), &ScanConfig::default());
    }
}

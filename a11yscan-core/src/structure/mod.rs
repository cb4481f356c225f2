//! Tagged PDF structure inspection
//!
//! This module reads the logical structure of a document (ISO 32000-1
//! Section 14.7) to answer accessibility questions about it:
//!
//! - does every image placed under a `Figure` element carry alternate text,
//! - which heading levels appear, in document order,
//! - does the document contain interactive form fields,
//! - does it have a non-empty outline (bookmarks).
//!
//! Custom structure types are resolved to standard ones through the
//! document's role map before being compared.
//!
//! # Example
//!
//! ```rust
//! use a11yscan::graph::{Document, ObjectGraph};
//! use a11yscan::objects::{PdfArray, PdfDictionary, PdfObject};
//! use a11yscan::structure::StructureTreeWalker;
//!
//! let mut graph = ObjectGraph::new();
//! let heading = graph.add_object(PdfDictionary::new().with("S", PdfObject::name("H1")));
//! let root = graph.add_object(
//!     PdfDictionary::new()
//!         .with("Type", PdfObject::name("StructTreeRoot"))
//!         .with("K", PdfArray(vec![heading.into()])),
//! );
//! let catalog = graph.add_object(PdfDictionary::new().with("StructTreeRoot", root));
//! graph.set_root(catalog);
//!
//! let document = Document::open(&graph)?;
//! let summary = StructureTreeWalker::new().walk(&document);
//! assert_eq!(summary.headings, vec![1]);
//! # Ok::<(), a11yscan::ScanError>(())
//! ```

mod identity;
mod roles;
mod walker;

pub use identity::ImageIdentity;
pub use roles::{RoleMap, StandardRole, MAX_ROLE_MAP_HOPS};
pub use walker::{
    detect_bookmarks, detect_form, StructureSummary, StructureTreeWalker,
    DEFAULT_MAX_STRUCTURE_DEPTH, DEFAULT_MAX_STRUCTURE_NODES,
};

//! Document graph access
//!
//! The engine never parses PDF bytes. It reads a document through the
//! [`ObjectResolver`] seam, which any parser can implement by handing out its
//! already-parsed indirect objects. [`ObjectGraph`] is the in-memory
//! implementation used by the CLI (loaded from a [`DocumentSnapshot`]) and by
//! tests.
//!
//! [`Document`] wraps a resolver and exposes the read-only operations the
//! accessibility checks need: the structure tree root, node children, roles,
//! alternate text, associated pages, page annotations, embedded images and the
//! outline.
//!
//! # Example
//!
//! ```rust
//! use a11yscan::graph::{Document, ObjectGraph};
//! use a11yscan::objects::{PdfArray, PdfDictionary, PdfObject};
//!
//! # fn main() -> a11yscan::Result<()> {
//! let mut graph = ObjectGraph::new();
//! let pages = graph.add_object(
//!     PdfDictionary::new()
//!         .with("Type", PdfObject::name("Pages"))
//!         .with("Kids", PdfArray::new()),
//! );
//! let catalog = graph.add_object(
//!     PdfDictionary::new()
//!         .with("Type", PdfObject::name("Catalog"))
//!         .with("Pages", pages),
//! );
//! graph.set_root(catalog);
//!
//! let document = Document::open(&graph)?;
//! assert_eq!(document.page_count(), 0);
//! assert!(document.structure_root().is_none());
//! # Ok(())
//! # }
//! ```

mod document;
mod memory;
mod page_tree;
mod snapshot;

pub use document::{
    Document, EmbeddedImage, Page, StructureChild, StructureNode, MAX_KIDS_ARRAY_NESTING,
};
pub use memory::ObjectGraph;
pub use snapshot::{DocumentSnapshot, IndirectObject};

use crate::objects::{ObjectId, PdfDictionary, PdfObject};

/// Maximum number of reference hops followed when resolving one object
pub const MAX_REFERENCE_HOPS: usize = 32;

/// Source of already-parsed PDF objects.
///
/// Implementations must be read-only and side-effect free; the engine may
/// resolve the same object many times during one scan.
pub trait ObjectResolver {
    /// Look up an indirect object by id
    fn get_object(&self, id: ObjectId) -> Option<&PdfObject>;

    /// The trailer dictionary (carries `/Root` and `/Info`)
    fn trailer(&self) -> &PdfDictionary;
}

impl<T: ObjectResolver + ?Sized> ObjectResolver for &T {
    fn get_object(&self, id: ObjectId) -> Option<&PdfObject> {
        (**self).get_object(id)
    }

    fn trailer(&self) -> &PdfDictionary {
        (**self).trailer()
    }
}

//! Read-only document view over an [`ObjectResolver`]

use super::page_tree::collect_pages;
use super::{ObjectResolver, MAX_REFERENCE_HOPS};
use crate::error::{Result, ScanError};
use crate::geometry::Rectangle;
use crate::objects::{ObjectId, PdfDictionary, PdfObject, PdfStream};
use std::collections::HashSet;

static NULL_OBJECT: PdfObject = PdfObject::Null;

/// Maximum `/Parent` hops followed when looking up inherited page attributes
const MAX_INHERITANCE_HOPS: usize = 32;

/// Maximum nesting of arrays inside a `/K` array that is flattened
pub const MAX_KIDS_ARRAY_NESTING: usize = 32;

/// A structure element (a dictionary carrying `/S`) in the tag tree
#[derive(Debug, Clone, Copy)]
pub struct StructureNode<'a> {
    pub dict: &'a PdfDictionary,
    /// Set when the node is an indirect object; used for cycle detection
    pub id: Option<ObjectId>,
}

/// One entry of a structure node's `/K` content
#[derive(Debug, Clone, Copy)]
pub enum StructureChild<'a> {
    /// A nested structure element
    Element(StructureNode<'a>),
    /// Marked-content reference, either a bare MCID or an `/MCR` dictionary
    MarkedContent(i64),
    /// Object reference (`/OBJR`) such as an annotation or XObject
    ObjectRef(Option<ObjectId>),
    /// `/K` arrays nested deeper than [`MAX_KIDS_ARRAY_NESTING`]; their
    /// content was not read
    Truncated,
}

/// A leaf page of the page tree
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub dict: &'a PdfDictionary,
    pub id: Option<ObjectId>,
}

/// An image XObject reachable from a page's resources
#[derive(Debug, Clone)]
pub struct EmbeddedImage<'a> {
    /// Resource name under which the image was found
    pub name: String,
    /// Name of the enclosing form XObject, when the image was nested in one
    pub form: Option<String>,
    pub stream: &'a PdfStream,
}

impl<'a> EmbeddedImage<'a> {
    pub fn width(&self) -> u32 {
        dimension(self.stream.dict.get("Width"))
    }

    pub fn height(&self) -> u32 {
        dimension(self.stream.dict.get("Height"))
    }
}

fn dimension(value: Option<&PdfObject>) -> u32 {
    value
        .and_then(PdfObject::as_integer)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Read-only view of one document
#[derive(Clone, Copy)]
pub struct Document<'a> {
    resolver: &'a dyn ObjectResolver,
    catalog: &'a PdfDictionary,
}

impl<'a> std::fmt::Debug for Document<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("catalog_keys", &self.catalog.len())
            .finish()
    }
}

impl<'a> Document<'a> {
    /// Open a document view.
    ///
    /// Fails when the trailer has no usable `/Root` catalog: without one the
    /// document cannot be inspected at all.
    pub fn open(resolver: &'a dyn ObjectResolver) -> Result<Self> {
        let root = resolver
            .trailer()
            .get("Root")
            .ok_or_else(|| ScanError::DocumentUnreadable("trailer has no /Root".to_string()))?;

        if let Some(id) = root.as_reference() {
            if resolver.get_object(id).is_none() {
                return Err(ScanError::InvalidObjectReference(id.number, id.generation));
            }
        }

        let catalog = resolve_with(resolver, root).as_dict().ok_or_else(|| {
            ScanError::DocumentUnreadable("/Root is not a dictionary".to_string())
        })?;

        Ok(Self { resolver, catalog })
    }

    pub fn catalog(&self) -> &'a PdfDictionary {
        self.catalog
    }

    /// Follow references until a direct object is reached.
    ///
    /// Dangling references and reference chains longer than
    /// [`MAX_REFERENCE_HOPS`] resolve to `null`.
    pub fn resolve(&self, obj: &'a PdfObject) -> &'a PdfObject {
        resolve_with(self.resolver, obj)
    }

    pub fn resolve_dict(&self, obj: &'a PdfObject) -> Option<&'a PdfDictionary> {
        self.resolve(obj).as_dict()
    }

    /// Look up `key` in `dict` and resolve the value
    pub fn get(&self, dict: &'a PdfDictionary, key: &str) -> Option<&'a PdfObject> {
        match dict.get(key).map(|value| self.resolve(value)) {
            Some(PdfObject::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    pub fn get_dict(&self, dict: &'a PdfDictionary, key: &str) -> Option<&'a PdfDictionary> {
        self.get(dict, key).and_then(PdfObject::as_dict)
    }

    /// The document information dictionary from the trailer
    pub fn info(&self) -> Option<&'a PdfDictionary> {
        self.resolver
            .trailer()
            .get("Info")
            .and_then(|info| self.resolve_dict(info))
    }

    /// The XMP metadata stream referenced by the catalog
    pub fn metadata_stream(&self) -> Option<&'a PdfStream> {
        self.get(self.catalog, "Metadata").and_then(PdfObject::as_stream)
    }

    // Structure tree

    /// The `/StructTreeRoot` dictionary; `None` for untagged documents
    pub fn structure_tree_root(&self) -> Option<&'a PdfDictionary> {
        self.get_dict(self.catalog, "StructTreeRoot")
    }

    /// The structure tree root as a traversable node
    pub fn structure_root(&self) -> Option<StructureNode<'a>> {
        let id = self
            .catalog
            .get("StructTreeRoot")
            .and_then(PdfObject::as_reference);
        self.structure_tree_root()
            .map(|dict| StructureNode { dict, id })
    }

    /// The `/RoleMap` dictionary of the structure tree root
    pub fn role_map(&self) -> Option<&'a PdfDictionary> {
        self.structure_tree_root()
            .and_then(|root| self.get_dict(root, "RoleMap"))
    }

    /// Children of a structure node in `/K` order.
    ///
    /// Arrays nested inside `/K` are flattened in place. An indirect array
    /// is expanded at most once per node.
    pub fn children(&self, node: &StructureNode<'a>) -> Vec<StructureChild<'a>> {
        let mut children = Vec::new();
        let mut expanded = HashSet::new();
        if let Some(kids) = node.dict.get("K") {
            self.push_child(kids, &mut children, &mut expanded, 0);
        }
        children
    }

    fn push_child(
        &self,
        kid: &'a PdfObject,
        children: &mut Vec<StructureChild<'a>>,
        expanded: &mut HashSet<ObjectId>,
        nesting: usize,
    ) {
        let id = kid.as_reference();
        match self.resolve(kid) {
            PdfObject::Integer(mcid) => children.push(StructureChild::MarkedContent(*mcid)),
            PdfObject::Array(_) if nesting > MAX_KIDS_ARRAY_NESTING => {
                children.push(StructureChild::Truncated);
            }
            PdfObject::Array(array) => {
                if let Some(id) = id {
                    if !expanded.insert(id) {
                        return;
                    }
                }
                for item in array.iter() {
                    self.push_child(item, children, expanded, nesting + 1);
                }
            }
            PdfObject::Dictionary(dict) => match dict.get_type() {
                Some("MCR") => {
                    let mcid = dict.get("MCID").and_then(PdfObject::as_integer).unwrap_or(-1);
                    children.push(StructureChild::MarkedContent(mcid));
                }
                Some("OBJR") => {
                    let target = dict.get("Obj").and_then(PdfObject::as_reference);
                    children.push(StructureChild::ObjectRef(target));
                }
                _ if dict.contains_key("S") || dict.contains_key("K") => {
                    children.push(StructureChild::Element(StructureNode { dict, id }));
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Raw role name (`/S`) of a structure node.
    ///
    /// Some producers write `/S` as an array; the first name is used.
    pub fn role(&self, node: &StructureNode<'a>) -> Option<&'a str> {
        match self.get(node.dict, "S")? {
            PdfObject::Name(name) => Some(name.as_str()),
            PdfObject::Array(array) => array
                .get(0)
                .map(|first| self.resolve(first))
                .and_then(PdfObject::as_name)
                .map(|name| name.as_str()),
            _ => None,
        }
    }

    /// Alternate description (`/Alt`) of a structure node
    pub fn alt_text(&self, node: &StructureNode<'a>) -> Option<String> {
        self.text_entry(node.dict, "Alt")
    }

    /// Replacement text (`/ActualText`) of a structure node
    pub fn actual_text(&self, node: &StructureNode<'a>) -> Option<String> {
        self.text_entry(node.dict, "ActualText")
    }

    fn text_entry(&self, dict: &'a PdfDictionary, key: &str) -> Option<String> {
        self.get(dict, key)
            .and_then(PdfObject::as_string)
            .map(|s| s.to_text())
    }

    /// Page the node's content originates from (`/Pg`)
    pub fn associated_page(&self, node: &StructureNode<'a>) -> Option<Page<'a>> {
        let raw = node.dict.get("Pg")?;
        let id = raw.as_reference();
        self.resolve_dict(raw).map(|dict| Page { dict, id })
    }

    // Pages

    /// Leaf pages in document order
    pub fn pages(&self) -> Vec<Page<'a>> {
        match self.catalog.get("Pages") {
            Some(root) => collect_pages(self, root),
            None => Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Look up a page attribute, walking `/Parent` for inheritable entries
    pub fn inherited(&self, page: &Page<'a>, key: &str) -> Option<&'a PdfObject> {
        let mut current = page.dict;
        let mut seen = HashSet::new();
        for _ in 0..MAX_INHERITANCE_HOPS {
            if let Some(value) = self.get(current, key) {
                return Some(value);
            }
            let parent = current.get("Parent")?;
            if let Some(id) = parent.as_reference() {
                if !seen.insert(id) {
                    return None;
                }
            }
            current = self.resolve_dict(parent)?;
        }
        None
    }

    pub fn media_box(&self, page: &Page<'a>) -> Option<Rectangle> {
        let array = self.inherited(page, "MediaBox")?.as_array()?;
        let coords: Vec<f64> = array
            .iter()
            .filter_map(|v| self.resolve(v).as_real())
            .collect();
        match coords.as_slice() {
            [x0, y0, x1, y1] => Some(Rectangle::from_corners(*x0, *y0, *x1, *y1)),
            _ => None,
        }
    }

    /// Annotation dictionaries listed in the page's `/Annots`
    pub fn page_annotations(&self, page: &Page<'a>) -> Vec<&'a PdfDictionary> {
        self.get(page.dict, "Annots")
            .and_then(PdfObject::as_array)
            .map(|annots| {
                annots
                    .iter()
                    .filter_map(|annot| self.resolve_dict(annot))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Image XObjects in the page resources, including images nested one
    /// level deep inside form XObjects
    pub fn page_images(&self, page: &Page<'a>) -> Vec<EmbeddedImage<'a>> {
        let mut images = Vec::new();
        let Some(resources) = self.inherited(page, "Resources").and_then(PdfObject::as_dict)
        else {
            return images;
        };
        let Some(xobjects) = self.get_dict(resources, "XObject") else {
            return images;
        };

        for (name, value) in sorted_entries(xobjects) {
            let Some(stream) = self.resolve(value).as_stream() else {
                continue;
            };
            match stream.dict.get_name("Subtype") {
                Some("Image") => images.push(EmbeddedImage {
                    name: name.to_string(),
                    form: None,
                    stream,
                }),
                Some("Form") => {
                    let nested = self
                        .get_dict(&stream.dict, "Resources")
                        .and_then(|res| self.get_dict(res, "XObject"));
                    let Some(nested) = nested else {
                        continue;
                    };
                    for (inner_name, inner) in sorted_entries(nested) {
                        if let Some(inner_stream) = self.resolve(inner).as_stream() {
                            if inner_stream.dict.get_name("Subtype") == Some("Image") {
                                images.push(EmbeddedImage {
                                    name: inner_name.to_string(),
                                    form: Some(name.to_string()),
                                    stream: inner_stream,
                                });
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        images
    }

    // Outline

    /// The `/Outlines` dictionary of the catalog
    pub fn outline_root(&self) -> Option<&'a PdfDictionary> {
        self.get_dict(self.catalog, "Outlines")
    }

    pub fn outline_count(&self, outline: &'a PdfDictionary) -> Option<i64> {
        self.get(outline, "Count").and_then(PdfObject::as_integer)
    }

    pub fn outline_first_child(&self, outline: &'a PdfDictionary) -> Option<&'a PdfDictionary> {
        self.get_dict(outline, "First")
    }
}

fn resolve_with<'a>(resolver: &'a dyn ObjectResolver, obj: &'a PdfObject) -> &'a PdfObject {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current.as_reference() {
            Some(id) => match resolver.get_object(id) {
                Some(next) => current = next,
                None => return &NULL_OBJECT,
            },
            None => return current,
        }
    }
    &NULL_OBJECT
}

/// Dictionary entries ordered by key, so traversal order is deterministic
fn sorted_entries(dict: &PdfDictionary) -> Vec<(&str, &PdfObject)> {
    let mut entries: Vec<_> = dict.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

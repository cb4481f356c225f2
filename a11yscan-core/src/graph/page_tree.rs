//! Page tree flattening (ISO 32000-1 Section 7.7.3)

use super::document::{Document, Page};
use crate::objects::{ObjectId, PdfObject};
use std::collections::HashSet;
use tracing::debug;

/// Maximum nesting of intermediate `/Pages` nodes
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Collect leaf pages in document order.
///
/// Iterative, so a malformed tree cannot exhaust the stack; nodes already
/// visited through another `/Kids` entry are skipped.
pub(crate) fn collect_pages<'a>(document: &Document<'a>, root: &'a PdfObject) -> Vec<Page<'a>> {
    let mut pages = Vec::new();
    let mut visited: HashSet<ObjectId> = HashSet::new();
    let mut stack: Vec<(&'a PdfObject, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        let id = node.as_reference();
        if let Some(id) = id {
            if !visited.insert(id) {
                debug!("page tree revisits {}, skipping", id);
                continue;
            }
        }
        let Some(dict) = document.resolve_dict(node) else {
            continue;
        };

        let kids = document.get(dict, "Kids").and_then(PdfObject::as_array);
        let is_intermediate = match dict.get_type() {
            Some("Pages") => true,
            None => kids.is_some(),
            Some(_) => false,
        };

        if !is_intermediate {
            pages.push(Page { dict, id });
            continue;
        }

        if depth >= MAX_PAGE_TREE_DEPTH {
            debug!("page tree deeper than {}, truncating", MAX_PAGE_TREE_DEPTH);
            continue;
        }

        if let Some(kids) = kids {
            for kid in kids.iter().rev() {
                stack.push((kid, depth + 1));
            }
        }
    }

    pages
}

//! Structure tree walk
//!
//! One pass over the tag tree collects figure alt-text coverage and heading
//! levels. The pass is iterative with an explicit stack, so neither a deep
//! tree nor a cyclic one can exhaust the call stack: branches deeper than the
//! depth bound are cut, nodes reached twice through indirect references are
//! skipped, and a node budget caps the total work per document.

use super::identity::ImageIdentity;
use super::roles::{RoleMap, StandardRole};
use crate::error::{ScanWarning, WarningCode};
use crate::graph::{
    Document, Page, StructureChild, StructureNode, MAX_KIDS_ARRAY_NESTING,
};
use crate::objects::ObjectId;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Default maximum nesting depth below the structure tree root
pub const DEFAULT_MAX_STRUCTURE_DEPTH: usize = 100;

/// Default maximum number of structure nodes visited per document
pub const DEFAULT_MAX_STRUCTURE_NODES: usize = 250_000;

/// Signals gathered from the structure tree, outline and annotations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureSummary {
    /// Covered flag per unique image found under a Figure
    pub image_coverage: BTreeMap<ImageIdentity, bool>,
    /// Heading levels in document order
    pub headings: Vec<u8>,
    pub figure_count: usize,
    pub has_form: bool,
    pub has_bookmarks: bool,
    pub nodes_visited: usize,
    /// Some part of the tree was not visited
    pub truncated: bool,
    pub warnings: Vec<ScanWarning>,
}

impl StructureSummary {
    pub fn covered_images(&self) -> usize {
        self.image_coverage.values().filter(|covered| **covered).count()
    }

    pub fn uncovered_images(&self) -> usize {
        self.image_coverage.len() - self.covered_images()
    }

    /// True when no figure image lacks alt text (vacuously true with none)
    pub fn all_images_covered(&self) -> bool {
        self.image_coverage.values().all(|covered| *covered)
    }
}

struct Frame<'a> {
    node: StructureNode<'a>,
    depth: usize,
    /// Nearest `/Pg` on this node or an ancestor
    page: Option<Page<'a>>,
}

/// Walks a document's tag tree with fixed resource bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureTreeWalker {
    max_depth: usize,
    max_nodes: usize,
}

impl Default for StructureTreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureTreeWalker {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_STRUCTURE_DEPTH,
            max_nodes: DEFAULT_MAX_STRUCTURE_NODES,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Walk the document.
    ///
    /// An untagged document (no `/StructTreeRoot`) yields the default
    /// summary: no images, no headings, no form, no bookmarks.
    pub fn walk(&self, document: &Document<'_>) -> StructureSummary {
        let Some(root) = document.structure_root() else {
            debug!("no structure tree root, using defaults");
            return StructureSummary::default();
        };

        let mut summary = StructureSummary {
            has_form: detect_form(document),
            has_bookmarks: detect_bookmarks(document),
            ..StructureSummary::default()
        };
        self.walk_tree(document, root, &mut summary);
        summary
    }

    fn walk_tree<'a>(
        &self,
        document: &Document<'a>,
        root: StructureNode<'a>,
        summary: &mut StructureSummary,
    ) {
        let role_map = RoleMap::from_document(document);
        let mut images_by_page: HashMap<ObjectId, Vec<ImageIdentity>> = HashMap::new();
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut depth_exceeded = false;
        let mut kids_truncated = false;
        let mut stack = vec![Frame {
            node: root,
            depth: 0,
            page: None,
        }];

        while let Some(frame) = stack.pop() {
            if let Some(id) = frame.node.id {
                if !visited.insert(id) {
                    debug!("structure node {} reached twice, skipping", id);
                    continue;
                }
            }

            if summary.nodes_visited >= self.max_nodes {
                warn!("structure node budget of {} exhausted", self.max_nodes);
                summary.truncated = true;
                summary.warnings.push(ScanWarning::new(
                    WarningCode::StructureNodeBudgetExceeded,
                    format!("stopped after {} structure nodes", self.max_nodes),
                ));
                break;
            }
            summary.nodes_visited += 1;

            let page = document.associated_page(&frame.node).or(frame.page);
            let role = document
                .role(&frame.node)
                .and_then(|raw| role_map.resolve(raw));

            match role {
                Some(StandardRole::Figure) => {
                    summary.figure_count += 1;
                    let has_alt = document
                        .alt_text(&frame.node)
                        .is_some_and(|alt| !alt.trim().is_empty());
                    if let Some(page) = page {
                        let identities = page_identities(document, &page, &mut images_by_page);
                        record_coverage(&mut summary.image_coverage, &identities, has_alt);
                    }
                }
                Some(other) => {
                    if let Some(level) = other.heading_level() {
                        summary.headings.push(level);
                    }
                }
                None => {}
            }

            let mut elements: Vec<StructureNode<'a>> = Vec::new();
            for child in document.children(&frame.node) {
                match child {
                    StructureChild::Element(node) => elements.push(node),
                    StructureChild::Truncated if !kids_truncated => {
                        kids_truncated = true;
                        warn!(
                            "/K arrays nested deeper than {}, truncating",
                            MAX_KIDS_ARRAY_NESTING
                        );
                        summary.truncated = true;
                        summary.warnings.push(ScanWarning::new(
                            WarningCode::StructureDepthExceeded,
                            format!(
                                "/K arrays nested deeper than {} were not read",
                                MAX_KIDS_ARRAY_NESTING
                            ),
                        ));
                    }
                    _ => {}
                }
            }
            if elements.is_empty() {
                continue;
            }

            if frame.depth >= self.max_depth {
                if !depth_exceeded {
                    depth_exceeded = true;
                    warn!("structure tree deeper than {}, truncating", self.max_depth);
                    summary.truncated = true;
                    summary.warnings.push(ScanWarning::new(
                        WarningCode::StructureDepthExceeded,
                        format!("branches below depth {} were not visited", self.max_depth),
                    ));
                }
                continue;
            }

            // Reversed so that pops follow document order
            for node in elements.into_iter().rev() {
                stack.push(Frame {
                    node,
                    depth: frame.depth + 1,
                    page,
                });
            }
        }
    }
}

fn page_identities<'a>(
    document: &Document<'a>,
    page: &Page<'a>,
    cache: &mut HashMap<ObjectId, Vec<ImageIdentity>>,
) -> Vec<ImageIdentity> {
    let compute = || {
        document
            .page_images(page)
            .iter()
            .map(ImageIdentity::of)
            .collect::<Vec<_>>()
    };
    match page.id {
        Some(id) => cache.entry(id).or_insert_with(compute).clone(),
        None => compute(),
    }
}

/// Alt text on any occurrence covers the image; a later occurrence without
/// alt text never uncovers it.
fn record_coverage(
    coverage: &mut BTreeMap<ImageIdentity, bool>,
    identities: &[ImageIdentity],
    has_alt: bool,
) {
    for identity in identities {
        let covered = coverage.entry(*identity).or_insert(false);
        if has_alt {
            *covered = true;
        }
    }
}

/// A page annotation that is a form field widget: it carries `/FT` itself
/// or inherits it from its parent field
pub fn detect_form(document: &Document<'_>) -> bool {
    document.pages().iter().any(|page| {
        document.page_annotations(page).into_iter().any(|annot| {
            document.get(annot, "FT").is_some()
                || document
                    .get_dict(annot, "Parent")
                    .is_some_and(|parent| document.get(parent, "FT").is_some())
        })
    })
}

/// The outline declares open items or has a first entry
pub fn detect_bookmarks(document: &Document<'_>) -> bool {
    document.outline_root().is_some_and(|outline| {
        document.outline_count(outline).is_some_and(|count| count > 0)
            || document.outline_first_child(outline).is_some()
    })
}

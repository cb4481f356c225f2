//! JSON document snapshots
//!
//! A snapshot is the serialized output of an upstream parser and layout
//! analyzer: the indirect objects of one document, its trailer, and the
//! per-page layout analysis. Loading one is the only fallible step of opening
//! a document; a snapshot that cannot be decoded is reported as
//! [`ScanError::DocumentUnreadable`].

use super::memory::ObjectGraph;
use super::ObjectResolver;
use crate::error::{Result, ScanError};
use crate::objects::{ObjectId, PdfDictionary, PdfObject};
use crate::page_content::PageLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One indirect object of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndirectObject {
    pub id: ObjectId,
    pub object: PdfObject,
}

/// Serialized document graph plus layout analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub trailer: PdfDictionary,
    #[serde(default)]
    pub objects: Vec<IndirectObject>,
    /// Layout analysis per page, in page order
    #[serde(default)]
    pub layouts: Vec<PageLayout>,
}

impl DocumentSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ScanError::DocumentUnreadable(format!("invalid document snapshot: {e}")))
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ScanError::DocumentUnreadable(format!("invalid document snapshot: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a snapshot from an in-memory graph and its layouts
    pub fn from_graph(graph: &ObjectGraph, layouts: Vec<PageLayout>) -> Self {
        Self {
            trailer: graph.trailer().clone(),
            objects: graph
                .objects()
                .into_iter()
                .map(|(id, object)| IndirectObject {
                    id,
                    object: object.clone(),
                })
                .collect(),
            layouts,
        }
    }

    /// Split into the object graph and the layout analysis
    pub fn into_parts(self) -> (ObjectGraph, Vec<PageLayout>) {
        let mut graph = ObjectGraph::new();
        for IndirectObject { id, object } in self.objects {
            graph.insert(id, object);
        }
        graph.set_trailer(self.trailer);
        (graph, self.layouts)
    }
}

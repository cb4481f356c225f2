//! In-memory object table

use super::ObjectResolver;
use crate::objects::{ObjectId, PdfDictionary, PdfObject};
use std::collections::HashMap;

/// An owned table of indirect objects plus a trailer.
///
/// Object numbers handed out by [`ObjectGraph::add_object`] never collide with
/// ids inserted explicitly.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    objects: HashMap<ObjectId, PdfObject>,
    trailer: PdfDictionary,
    next_number: u32,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            trailer: PdfDictionary::new(),
            next_number: 1,
        }
    }

    /// Store an object under the next free object number
    pub fn add_object(&mut self, obj: impl Into<PdfObject>) -> ObjectId {
        let id = self.reserve_id();
        self.objects.insert(id, obj.into());
        id
    }

    /// Claim an object number without storing anything yet, for objects that
    /// must refer to themselves or to a parent created later
    pub fn reserve_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_number.max(1), 0);
        self.next_number = id.number.saturating_add(1);
        id
    }

    /// Store an object under an explicit id, replacing any previous one
    pub fn insert(&mut self, id: ObjectId, obj: impl Into<PdfObject>) {
        if id.number >= self.next_number {
            self.next_number = id.number.saturating_add(1);
        }
        self.objects.insert(id, obj.into());
    }

    pub fn set_trailer(&mut self, trailer: PdfDictionary) {
        self.trailer = trailer;
    }

    /// Point the trailer's `/Root` at a catalog object
    pub fn set_root(&mut self, catalog: ObjectId) {
        self.trailer.insert("Root", catalog);
    }

    /// Point the trailer's `/Info` at a document information dictionary
    pub fn set_info(&mut self, info: ObjectId) {
        self.trailer.insert("Info", info);
    }

    /// Objects ordered by id
    pub fn objects(&self) -> Vec<(ObjectId, &PdfObject)> {
        let mut objects: Vec<_> = self.objects.iter().map(|(id, obj)| (*id, obj)).collect();
        objects.sort_by_key(|(id, _)| *id);
        objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectResolver for ObjectGraph {
    fn get_object(&self, id: ObjectId) -> Option<&PdfObject> {
        self.objects.get(&id)
    }

    fn trailer(&self) -> &PdfDictionary {
        &self.trailer
    }
}

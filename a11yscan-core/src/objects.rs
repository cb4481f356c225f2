//! PDF object model
//!
//! Value types for an already-parsed PDF object graph (ISO 32000-1 Section 7.3).
//! Nothing in this crate parses PDF bytes: objects arrive materialized, either
//! from an in-process parser behind [`crate::graph::ObjectResolver`] or from a
//! JSON document snapshot.
//!
//! The serde representation is externally tagged, so a snapshot reads as
//! `{"Name": "Figure"}`, `{"Reference": [12, 0]}`, `{"Dictionary": {...}}`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Identifier of an indirect object: object number and generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(u32, u16)", into = "(u32, u16)")]
pub struct ObjectId {
    pub number: u32,
    pub generation: u16,
}

impl ObjectId {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl From<(u32, u16)> for ObjectId {
    fn from((number, generation): (u32, u16)) -> Self {
        Self { number, generation }
    }
}

impl From<ObjectId> for (u32, u16) {
    fn from(id: ObjectId) -> Self {
        (id.number, id.generation)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

/// PDF Name object (stored without the leading slash)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PdfName(pub String);

/// PDF String object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StringRepr", into = "StringRepr")]
pub struct PdfString(pub Vec<u8>);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StringRepr {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<StringRepr> for PdfString {
    fn from(repr: StringRepr) -> Self {
        match repr {
            StringRepr::Text(text) => PdfString(text.into_bytes()),
            StringRepr::Bytes(bytes) => PdfString(bytes),
        }
    }
}

impl From<PdfString> for StringRepr {
    fn from(s: PdfString) -> Self {
        match String::from_utf8(s.0) {
            Ok(text) => StringRepr::Text(text),
            Err(err) => StringRepr::Bytes(err.into_bytes()),
        }
    }
}

/// PDF Array object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PdfArray(pub Vec<PdfObject>);

/// PDF Dictionary object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PdfDictionary(pub HashMap<PdfName, PdfObject>);

/// PDF Stream object; `data` holds the raw, still-encoded bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
}

mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded.trim()).map_err(serde::de::Error::custom)
    }
}

impl PdfStream {
    pub fn new(dict: PdfDictionary, data: Vec<u8>) -> Self {
        Self { dict, data }
    }

    /// Get the raw (possibly compressed) stream data
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Names of the filters applied to this stream, in decode order
    pub fn filters(&self) -> Vec<&str> {
        match self.dict.get("Filter") {
            Some(PdfObject::Name(name)) => vec![name.as_str()],
            Some(PdfObject::Array(array)) => array
                .0
                .iter()
                .filter_map(|f| f.as_name().map(PdfName::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// PDF Object types
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum PdfObject {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(PdfName),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    Reference(u32, u16),
}

impl PdfObject {
    pub fn is_null(&self) -> bool {
        matches!(self, PdfObject::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PdfObject::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfObject::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as real number, accepting integers as well
    pub fn as_real(&self) -> Option<f64> {
        match self {
            PdfObject::Real(r) => Some(*r),
            PdfObject::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            PdfObject::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            PdfObject::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PdfArray> {
        match self {
            PdfObject::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get as dictionary; a stream exposes its dictionary
    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfObject::Dictionary(d) => Some(d),
            PdfObject::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&PdfStream> {
        match self {
            PdfObject::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            PdfObject::Reference(number, generation) => Some(ObjectId::new(*number, *generation)),
            _ => None,
        }
    }

    pub fn name(name: &str) -> Self {
        PdfObject::Name(PdfName::new(name))
    }

    pub fn string(text: &str) -> Self {
        PdfObject::String(PdfString::new(text.as_bytes().to_vec()))
    }

    pub fn reference(id: ObjectId) -> Self {
        PdfObject::Reference(id.number, id.generation)
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

impl From<PdfArray> for PdfObject {
    fn from(array: PdfArray) -> Self {
        PdfObject::Array(array)
    }
}

impl From<PdfStream> for PdfObject {
    fn from(stream: PdfStream) -> Self {
        PdfObject::Stream(stream)
    }
}

impl From<ObjectId> for PdfObject {
    fn from(id: ObjectId) -> Self {
        PdfObject::reference(id)
    }
}

impl From<i64> for PdfObject {
    fn from(value: i64) -> Self {
        PdfObject::Integer(value)
    }
}

impl From<f64> for PdfObject {
    fn from(value: f64) -> Self {
        PdfObject::Real(value)
    }
}

impl From<bool> for PdfObject {
    fn from(value: bool) -> Self {
        PdfObject::Boolean(value)
    }
}

impl PdfDictionary {
    pub fn new() -> Self {
        PdfDictionary(HashMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.0.get(&PdfName::new(key))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PdfObject>) {
        self.0.insert(PdfName(key.into()), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PdfObject>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&PdfName::new(key))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PdfName, &PdfObject)> {
        self.0.iter()
    }

    /// Get the dictionary type (value of /Type key)
    pub fn get_type(&self) -> Option<&str> {
        self.get_name("Type")
    }

    /// Get the value of `key` when it is a direct name
    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|obj| obj.as_name()).map(PdfName::as_str)
    }
}

impl PdfArray {
    pub fn new() -> Self {
        PdfArray(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PdfObject> {
        self.0.get(index)
    }

    pub fn push(&mut self, obj: impl Into<PdfObject>) {
        self.0.push(obj.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PdfObject> {
        self.0.iter()
    }
}

impl FromIterator<PdfObject> for PdfArray {
    fn from_iter<I: IntoIterator<Item = PdfObject>>(iter: I) -> Self {
        PdfArray(iter.into_iter().collect())
    }
}

impl PdfString {
    pub fn new(data: Vec<u8>) -> Self {
        PdfString(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode as a PDF text string.
    ///
    /// Handles the UTF-16BE and UTF-8 byte-order marks; anything else is read
    /// as UTF-8 when valid and as Latin-1 otherwise.
    pub fn to_text(&self) -> String {
        let bytes = &self.0;
        if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            return String::from_utf16_lossy(&units);
        }
        if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
            return String::from_utf8_lossy(rest).into_owned();
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl PdfName {
    pub fn new(name: impl Into<String>) -> Self {
        PdfName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//! Standard structure types and role mapping (ISO 32000-1 Section 14.8.4)

use crate::graph::Document;
use crate::objects::PdfObject;
use std::collections::HashMap;
use std::fmt;

/// Maximum number of role map hops followed for one role
pub const MAX_ROLE_MAP_HOPS: usize = 16;

/// Standard structure types
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardRole {
    // Grouping elements
    Document,
    Part,
    Art,
    Sect,
    Div,
    BlockQuote,
    Caption,
    Toc,
    Toci,
    Index,
    NonStruct,
    Private,

    // Block-level elements
    P,
    H,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    L,
    LI,
    Lbl,
    LBody,
    Table,
    TR,
    TH,
    TD,
    THead,
    TBody,
    TFoot,

    // Inline-level elements
    Span,
    Quote,
    Note,
    Reference,
    BibEntry,
    Code,
    Link,
    Annot,
    Ruby,
    RB,
    RT,
    RP,
    Warichu,
    WT,
    WP,

    // Illustration elements
    Figure,
    Formula,
    Form,
}

impl StandardRole {
    /// Parse a standard structure type name
    pub fn from_name(name: &str) -> Option<Self> {
        let role = match name {
            "Document" => StandardRole::Document,
            "Part" => StandardRole::Part,
            "Art" => StandardRole::Art,
            "Sect" => StandardRole::Sect,
            "Div" => StandardRole::Div,
            "BlockQuote" => StandardRole::BlockQuote,
            "Caption" => StandardRole::Caption,
            "TOC" => StandardRole::Toc,
            "TOCI" => StandardRole::Toci,
            "Index" => StandardRole::Index,
            "NonStruct" => StandardRole::NonStruct,
            "Private" => StandardRole::Private,
            "P" => StandardRole::P,
            "H" => StandardRole::H,
            "H1" => StandardRole::H1,
            "H2" => StandardRole::H2,
            "H3" => StandardRole::H3,
            "H4" => StandardRole::H4,
            "H5" => StandardRole::H5,
            "H6" => StandardRole::H6,
            "L" => StandardRole::L,
            "LI" => StandardRole::LI,
            "Lbl" => StandardRole::Lbl,
            "LBody" => StandardRole::LBody,
            "Table" => StandardRole::Table,
            "TR" => StandardRole::TR,
            "TH" => StandardRole::TH,
            "TD" => StandardRole::TD,
            "THead" => StandardRole::THead,
            "TBody" => StandardRole::TBody,
            "TFoot" => StandardRole::TFoot,
            "Span" => StandardRole::Span,
            "Quote" => StandardRole::Quote,
            "Note" => StandardRole::Note,
            "Reference" => StandardRole::Reference,
            "BibEntry" => StandardRole::BibEntry,
            "Code" => StandardRole::Code,
            "Link" => StandardRole::Link,
            "Annot" => StandardRole::Annot,
            "Ruby" => StandardRole::Ruby,
            "RB" => StandardRole::RB,
            "RT" => StandardRole::RT,
            "RP" => StandardRole::RP,
            "Warichu" => StandardRole::Warichu,
            "WT" => StandardRole::WT,
            "WP" => StandardRole::WP,
            "Figure" => StandardRole::Figure,
            "Formula" => StandardRole::Formula,
            "Form" => StandardRole::Form,
            _ => return None,
        };
        Some(role)
    }

    /// Structure type name as written in `/S`
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardRole::Document => "Document",
            StandardRole::Part => "Part",
            StandardRole::Art => "Art",
            StandardRole::Sect => "Sect",
            StandardRole::Div => "Div",
            StandardRole::BlockQuote => "BlockQuote",
            StandardRole::Caption => "Caption",
            StandardRole::Toc => "TOC",
            StandardRole::Toci => "TOCI",
            StandardRole::Index => "Index",
            StandardRole::NonStruct => "NonStruct",
            StandardRole::Private => "Private",
            StandardRole::P => "P",
            StandardRole::H => "H",
            StandardRole::H1 => "H1",
            StandardRole::H2 => "H2",
            StandardRole::H3 => "H3",
            StandardRole::H4 => "H4",
            StandardRole::H5 => "H5",
            StandardRole::H6 => "H6",
            StandardRole::L => "L",
            StandardRole::LI => "LI",
            StandardRole::Lbl => "Lbl",
            StandardRole::LBody => "LBody",
            StandardRole::Table => "Table",
            StandardRole::TR => "TR",
            StandardRole::TH => "TH",
            StandardRole::TD => "TD",
            StandardRole::THead => "THead",
            StandardRole::TBody => "TBody",
            StandardRole::TFoot => "TFoot",
            StandardRole::Span => "Span",
            StandardRole::Quote => "Quote",
            StandardRole::Note => "Note",
            StandardRole::Reference => "Reference",
            StandardRole::BibEntry => "BibEntry",
            StandardRole::Code => "Code",
            StandardRole::Link => "Link",
            StandardRole::Annot => "Annot",
            StandardRole::Ruby => "Ruby",
            StandardRole::RB => "RB",
            StandardRole::RT => "RT",
            StandardRole::RP => "RP",
            StandardRole::Warichu => "Warichu",
            StandardRole::WT => "WT",
            StandardRole::WP => "WP",
            StandardRole::Figure => "Figure",
            StandardRole::Formula => "Formula",
            StandardRole::Form => "Form",
        }
    }

    /// Level of a numbered heading (`H1`..`H6`)
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            StandardRole::H1 => Some(1),
            StandardRole::H2 => Some(2),
            StandardRole::H3 => Some(3),
            StandardRole::H4 => Some(4),
            StandardRole::H5 => Some(5),
            StandardRole::H6 => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for StandardRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pdf_name())
    }
}

/// Custom role name to target role name, as found in `/RoleMap`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMap {
    entries: HashMap<String, String>,
}

impl RoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the role map of a document's structure tree root.
    ///
    /// Entries whose value is not a name are skipped.
    pub fn from_document(document: &Document<'_>) -> Self {
        let mut map = RoleMap::new();
        if let Some(dict) = document.role_map() {
            for (custom, target) in dict.iter() {
                if let PdfObject::Name(target) = document.resolve(target) {
                    map.insert(custom.as_str(), target.as_str());
                }
            }
        }
        map
    }

    pub fn insert(&mut self, custom: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(custom.into(), target.into());
    }

    pub fn get(&self, custom: &str) -> Option<&str> {
        self.entries.get(custom).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a raw role to a standard structure type.
    ///
    /// A role without a map entry is compared directly. A mapped role is
    /// followed transitively for up to [`MAX_ROLE_MAP_HOPS`] entries and
    /// resolves to wherever the chain ends, so `Figure -> Artwork` is not a
    /// Figure. Cycles and over-long chains resolve to `None`.
    pub fn resolve(&self, raw: &str) -> Option<StandardRole> {
        let mut current = raw;
        let mut hops = 0;
        while let Some(next) = self.get(current) {
            if next == current {
                break;
            }
            if hops == MAX_ROLE_MAP_HOPS {
                return None;
            }
            current = next;
            hops += 1;
        }
        StandardRole::from_name(current)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RoleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RoleMap::new();
        for (custom, target) in iter {
            map.insert(custom, target);
        }
        map
    }
}

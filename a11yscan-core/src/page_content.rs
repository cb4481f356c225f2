//! Page content composition
//!
//! Decides, per page, whether the page carries real text, a full-page image,
//! both, or neither, and folds the pages into a document-level [`TextType`].
//! A page whose only content is an image about the size of the page is almost
//! always a scan: text on such a page is not available to assistive
//! technology unless it was OCR'd underneath the image.
//!
//! The input is the output of an external layout analyzer ([`PageLayout`]);
//! this module performs no content-stream interpretation itself.
//!
//! # Example
//!
//! ```rust
//! use a11yscan::geometry::Rectangle;
//! use a11yscan::page_content::{ImageRegion, LayoutGroup, PageContentClassifier, PageLayout, TextType};
//!
//! let page_box = Rectangle::from_corners(0.0, 0.0, 612.0, 792.0);
//! let scanned = PageLayout::new(page_box)
//!     .with_image_region(ImageRegion::new(Rectangle::from_corners(0.0, 0.0, 600.0, 780.0)));
//! let ocr_layer = scanned.clone().with_group(LayoutGroup::text());
//!
//! let classifier = PageContentClassifier::default();
//! assert_eq!(classifier.classify_document(&[scanned.clone()]).text_type, TextType::ImageOnly);
//! assert_eq!(classifier.classify_document(&[ocr_layer]).text_type, TextType::ImageOverText);
//! ```

use crate::geometry::Rectangle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default lower bound of the image-area / page-area ratio for a full-page image
pub const DEFAULT_FULL_PAGE_RATIO_MIN: f64 = 0.9;
/// Default upper bound of the image-area / page-area ratio for a full-page image
pub const DEFAULT_FULL_PAGE_RATIO_MAX: f64 = 1.1;

/// Kind of a layout group reported by the layout analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutGroupKind {
    /// A group of text lines or boxes
    Text,
    /// A graphical container (figure)
    Figure,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGroup {
    pub kind: LayoutGroupKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Rectangle>,
}

impl LayoutGroup {
    pub fn new(kind: LayoutGroupKind) -> Self {
        Self { kind, bbox: None }
    }

    pub fn text() -> Self {
        Self::new(LayoutGroupKind::Text)
    }

    pub fn is_text(&self) -> bool {
        self.kind == LayoutGroupKind::Text
    }
}

/// Bounding box of a graphical container that holds at least one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageRegion {
    pub bbox: Rectangle,
}

impl ImageRegion {
    pub fn new(bbox: Rectangle) -> Self {
        Self { bbox }
    }
}

/// Layout analysis of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_box: Rectangle,
    #[serde(default)]
    pub groups: Vec<LayoutGroup>,
    #[serde(default)]
    pub image_regions: Vec<ImageRegion>,
}

impl PageLayout {
    pub fn new(page_box: Rectangle) -> Self {
        Self {
            page_box,
            groups: Vec::new(),
            image_regions: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: LayoutGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_image_region(mut self, region: ImageRegion) -> Self {
        self.image_regions.push(region);
        self
    }
}

/// Content composition of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageContentProfile {
    pub has_text: bool,
    pub has_full_page_image: bool,
}

/// Document-level content composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextType {
    /// Full-page images on some pages and real text on some pages
    #[serde(rename = "Image Over Text")]
    ImageOverText,
    #[serde(rename = "Text Only")]
    TextOnly,
    /// Full-page images and no real text anywhere: likely an untreated scan
    #[serde(rename = "Image Only")]
    ImageOnly,
    #[default]
    #[serde(rename = "No Image or Text")]
    Neither,
}

impl TextType {
    /// Fold per-page profiles into the document classification
    pub fn from_profiles(profiles: &[PageContentProfile]) -> Self {
        let any_image = profiles.iter().any(|p| p.has_full_page_image);
        let any_text = profiles.iter().any(|p| p.has_text);
        match (any_image, any_text) {
            (true, true) => TextType::ImageOverText,
            (false, true) => TextType::TextOnly,
            (true, false) => TextType::ImageOnly,
            (false, false) => TextType::Neither,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextType::ImageOverText => "Image Over Text",
            TextType::TextOnly => "Text Only",
            TextType::ImageOnly => "Image Only",
            TextType::Neither => "No Image or Text",
        }
    }

    pub fn is_image_only(&self) -> bool {
        matches!(self, TextType::ImageOnly)
    }
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-page profiles plus the folded document classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub pages: Vec<PageContentProfile>,
    pub text_type: TextType,
}

/// Classifier for page content composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageContentClassifier {
    ratio_min: f64,
    ratio_max: f64,
}

impl Default for PageContentClassifier {
    fn default() -> Self {
        Self {
            ratio_min: DEFAULT_FULL_PAGE_RATIO_MIN,
            ratio_max: DEFAULT_FULL_PAGE_RATIO_MAX,
        }
    }
}

impl PageContentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the inclusive ratio bounds of the full-page image heuristic
    pub fn with_ratio_bounds(mut self, min: f64, max: f64) -> Self {
        self.ratio_min = min;
        self.ratio_max = max;
        self
    }

    /// Ratio of a region's area to the page area; `None` for an empty page box
    pub fn area_ratio(region: &Rectangle, page_box: &Rectangle) -> Option<f64> {
        let page_area = page_box.area();
        if page_area <= 0.0 {
            return None;
        }
        Some(region.area() / page_area)
    }

    pub fn is_full_page(&self, region: &Rectangle, page_box: &Rectangle) -> bool {
        Self::area_ratio(region, page_box)
            .map(|ratio| ratio >= self.ratio_min && ratio <= self.ratio_max)
            .unwrap_or(false)
    }

    pub fn classify_page(&self, layout: &PageLayout) -> PageContentProfile {
        PageContentProfile {
            has_text: layout.groups.iter().any(LayoutGroup::is_text),
            has_full_page_image: layout
                .image_regions
                .iter()
                .any(|region| self.is_full_page(&region.bbox, &layout.page_box)),
        }
    }

    pub fn classify_document(&self, layouts: &[PageLayout]) -> DocumentContent {
        let pages: Vec<_> = layouts.iter().map(|l| self.classify_page(l)).collect();
        let text_type = TextType::from_profiles(&pages);
        DocumentContent { pages, text_type }
    }
}

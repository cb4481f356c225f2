//! Basic geometric types for page layout analysis

use serde::{Deserialize, Serialize};

/// A point in 2D page space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// An axis-aligned rectangle in PDF user space.
///
/// Serialized as a `[x0, y0, x1, y1]` bounding box, the same shape as a
/// PDF `/MediaBox` array or a layout analyzer's `bbox`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rectangle {
    pub lower_left: Point,
    pub upper_right: Point,
}

impl Rectangle {
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        Self {
            lower_left,
            upper_right,
        }
    }

    /// Build a rectangle from two arbitrary corners, normalizing the order
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            lower_left: Point::new(x0.min(x1), y0.min(y1)),
            upper_right: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn from_position_and_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            lower_left: Point::new(x, y),
            upper_right: Point::new(x + width, y + height),
        }
    }

    pub fn width(&self) -> f64 {
        self.upper_right.x - self.lower_left.x
    }

    pub fn height(&self) -> f64 {
        self.upper_right.y - self.lower_left.y
    }

    /// Area of the rectangle; degenerate or inverted boxes have zero area
    pub fn area(&self) -> f64 {
        let area = self.width().max(0.0) * self.height().max(0.0);
        if area.is_finite() {
            area
        } else {
            0.0
        }
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.lower_left.x + self.upper_right.x) / 2.0,
            (self.lower_left.y + self.upper_right.y) / 2.0,
        )
    }
}

impl From<[f64; 4]> for Rectangle {
    fn from(bbox: [f64; 4]) -> Self {
        Rectangle::from_corners(bbox[0], bbox[1], bbox[2], bbox[3])
    }
}

impl From<Rectangle> for [f64; 4] {
    fn from(rect: Rectangle) -> Self {
        [
            rect.lower_left.x,
            rect.lower_left.y,
            rect.upper_right.x,
            rect.upper_right.y,
        ]
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for legend-driven plan measurement

use crate::diagnostics::Diagnostic;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection_area(&self, other: &Rect) -> u64 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }
        (x1 - x0) as u64 * (y1 - y0) as u64
    }

    /// Overlap ratio used for match deduplication: intersection area
    /// divided by the smaller of the two rectangle areas.
    pub fn overlap_ratio(&self, other: &Rect) -> f64 {
        let smaller = self.area().min(other.area());
        if smaller == 0 {
            return 0.0;
        }
        self.intersection_area(other) as f64 / smaller as f64
    }
}

/// Building-element category a legend pattern maps to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    Wall,
    Opening,
    Reference,
    Unknown,
}

impl ElementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementCategory::Wall => "wall",
            ElementCategory::Opening => "opening",
            ElementCategory::Reference => "reference",
            ElementCategory::Unknown => "unknown",
        }
    }
}

/// How occurrences of a legend pattern are measured
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    /// Summed surface in square meters
    Area,
    /// Number of occurrences
    Count,
    /// Located but not measured (reference symbols, north arrows, ...)
    None,
}

impl MeasurementType {
    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementType::Area => "m²",
            MeasurementType::Count => "pcs",
            MeasurementType::None => "N/A",
        }
    }
}

/// Drawing scale derived from the plan's scale notation
///
/// `fallback` distinguishes the substituted default from a scale that was
/// actually read off the drawing, so downstream consumers can flag
/// low-trust measurements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaleInfo {
    /// Notation as printed on the drawing, e.g. "1:100"
    pub notation: String,
    /// Denominator N of the 1:N notation
    pub ratio: u32,
    /// Pixels per real-world meter at the assumed scan resolution
    pub pixels_per_meter: f64,
    /// True when no scale text was recognized and the default was used
    pub fallback: bool,
}

/// One accepted occurrence of a legend pattern on the plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternMatch {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Weighted feature similarity in [0, 1]
    pub confidence: f64,
    pub element_type: String,
}

impl PatternMatch {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point2D {
        self.rect().center()
    }
}

/// Text annotation category recognized on the drawing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    Scale,
    Dimension,
    Level,
    FireProtection,
    Utility,
    Opening,
    Other,
}

/// A parsed text annotation with its position on the plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Raw recognized text the pattern matched on
    pub text: String,
    /// Numeric value where the pattern yields one (dimensions, levels)
    pub value: Option<f64>,
    /// Classification code where the pattern yields one (fire rating,
    /// utility letter, opening spec, known abbreviation)
    pub code: Option<String>,
    /// Pattern-specific confidence in [0.75, 0.9]
    pub confidence: f64,
    /// Center of the source word on the full plan
    pub position: Point2D,
}

/// Final measurement for one legend element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementResult {
    pub element: String,
    pub category: ElementCategory,
    pub measurement_type: MeasurementType,
    /// Area in m² for area elements, occurrence count for count
    /// elements, 0.0 for unmeasured reference elements
    pub measurement: f64,
    pub unit: String,
    pub match_count: usize,
    pub locations: Vec<PatternMatch>,
    /// Mean match confidence, 0.0 when no matches survived
    pub average_confidence: f64,
    /// Classification code attached by the classifier, if any
    pub code: Option<String>,
    /// Annotations correlated to this element, nearest first
    pub annotations: Vec<Annotation>,
}

/// Aggregated totals across all element results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Summed area of all wall elements in m²
    pub total_wall_area: f64,
    /// Summed count of all opening elements
    pub total_openings: f64,
    pub total_matches: usize,
    /// Match-weighted average confidence across all elements
    pub average_confidence: f64,
}

/// Complete output of one takeoff run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeoffReport {
    pub scale: ScaleInfo,
    pub results: Vec<ElementResult>,
    pub summary: Summary,
    pub diagnostics: Vec<Diagnostic>,
    /// Unix timestamp (seconds) of report creation
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_ratio() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 0, 100, 100);
        // Intersection 50x100 = 5000, smaller area = 10000
        assert!((a.overlap_ratio(&b) - 0.5).abs() < 1e-9);

        let c = Rect::new(200, 200, 10, 10);
        assert_eq!(a.overlap_ratio(&c), 0.0);

        // Containment: ratio relative to the smaller rect is 1.0
        let inner = Rect::new(10, 10, 20, 20);
        assert!((a.overlap_ratio(&inner) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::new(10, 20, 30, 40);
        let c = r.center();
        assert!((c.x - 25.0).abs() < 1e-9);
        assert!((c.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_measurement_units() {
        assert_eq!(MeasurementType::Area.unit(), "m²");
        assert_eq!(MeasurementType::Count.unit(), "pcs");
        assert_eq!(MeasurementType::None.unit(), "N/A");
    }
}

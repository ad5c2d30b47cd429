// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the takeoff pipeline
//!
//! Every tunable lives here so runs with different plan conventions
//! (legend corner, scan resolution, sample sizes) can coexist. Defaults
//! follow common 300 dpi A1/A3 scan conventions.

use crate::error::{Error, Result};
use crate::features::SimilarityWeights;
use serde::{Deserialize, Serialize};

/// Corner of the plan the legend block sits in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LegendCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Rectangular plan region expressed as fractions of image dimensions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedRegion {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NamedRegion {
    pub fn new(name: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            width,
            height,
        }
    }
}

/// Legend location heuristic and swatch sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendConfig {
    pub corner: LegendCorner,
    /// Legend width as a fraction of plan width
    pub width_ratio: f64,
    /// Legend height as a fraction of plan height
    pub height_ratio: f64,
    /// Margin from the plan border in pixels
    pub margin: u32,
    /// Grid step while scanning for swatches
    pub grid_spacing: u32,
    /// Side length of an extracted swatch
    pub sample_size: u32,
    /// Side length of the acceptance probe
    pub probe_size: u32,
    /// Minimum non-white fraction of the probe to accept a swatch
    pub min_ink_ratio: f64,
    /// Luminance below which a pixel counts as ink
    pub white_luminance: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            corner: LegendCorner::TopRight,
            width_ratio: 0.25,
            height_ratio: 0.4,
            margin: 20,
            grid_spacing: 30,
            sample_size: 80,
            probe_size: 20,
            min_ink_ratio: 0.1,
            white_luminance: 240.0,
        }
    }
}

/// Tiled plan-wide search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Tile side length in pixels
    pub tile_size: u32,
    /// Requested tile overlap; the effective overlap is never smaller
    /// than `sample_size` so a pattern straddling a tile boundary is
    /// always fully contained in at least one tile
    pub tile_overlap: u32,
    /// Sliding window side length
    pub sample_size: u32,
    /// Window step as a fraction of the sample size
    pub step_ratio: f64,
    /// Minimum weighted similarity to accept a window
    pub min_similarity: f64,
    /// Overlap ratio above which the lower-confidence match is dropped
    pub overlap_threshold: f64,
    /// Windows with less ink than this fraction are skipped before
    /// feature extraction; blank paper scores deceptively well on
    /// texture similarity
    pub min_ink_ratio: f64,
    /// Luminance below which a pixel counts as ink
    pub white_luminance: f64,
    pub weights: SimilarityWeights,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            tile_size: 500,
            tile_overlap: 50,
            sample_size: 80,
            step_ratio: 0.5,
            min_similarity: 0.75,
            overlap_threshold: 0.5,
            min_ink_ratio: 0.05,
            white_luminance: 240.0,
            weights: SimilarityWeights::default(),
        }
    }
}

/// Allowed match dimensions for one element category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeBounds {
    pub min: u32,
    pub max: u32,
}

impl SizeBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Context validation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    pub wall_bounds: SizeBounds,
    pub opening_bounds: SizeBounds,
    pub reference_bounds: SizeBounds,
    pub unknown_bounds: SizeBounds,
    /// Maximum relative thickness variation along a wall run
    pub max_thickness_variation: f64,
    /// Openings need edge-like structure on at least this many sides
    pub min_edge_sides: u32,
    /// Mean border gradient above which a side counts as edge-like
    pub edge_strength_threshold: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            wall_bounds: SizeBounds::new(20, 500),
            opening_bounds: SizeBounds::new(10, 200),
            reference_bounds: SizeBounds::new(5, 50),
            unknown_bounds: SizeBounds::new(10, 1000),
            max_thickness_variation: 0.2,
            min_edge_sides: 3,
            edge_strength_threshold: 40.0,
        }
    }
}

/// OCR collaborator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language hint passed to the engine
    pub language: String,
    /// Words below this confidence are discarded
    pub min_word_confidence: f64,
    /// Candidate regions tried in order for the scale notation
    pub scale_regions: Vec<NamedRegion>,
    /// Regions scanned for text annotations
    pub annotation_regions: Vec<NamedRegion>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "deu+eng".into(),
            min_word_confidence: 0.6,
            scale_regions: vec![
                NamedRegion::new("footer", 0.0, 0.85, 1.0, 0.15),
                NamedRegion::new("header", 0.0, 0.0, 1.0, 0.12),
                NamedRegion::new("legend", 0.7, 0.45, 0.3, 0.55),
            ],
            annotation_regions: vec![
                NamedRegion::new("legend", 0.7, 0.0, 0.3, 0.45),
                NamedRegion::new("header", 0.0, 0.0, 1.0, 0.12),
                NamedRegion::new("footer", 0.0, 0.85, 1.0, 0.15),
                NamedRegion::new("main", 0.0, 0.12, 1.0, 0.73),
            ],
        }
    }
}

/// Annotation correlation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Maximum distance (pixels) between an annotation and an element
    /// location for the two to be correlated
    pub max_correlation_distance: f64,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            max_correlation_distance: 50.0,
        }
    }
}

/// Top-level configuration for one takeoff run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Assumed scan resolution in dots per inch
    pub scan_dpi: f64,
    pub legend: LegendConfig,
    pub matcher: MatcherConfig,
    pub context: ContextConfig,
    pub ocr: OcrConfig,
    pub annotations: AnnotationConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.matcher.weights.validate()?;
        if self.scan_dpi <= 0.0 {
            return Err(Error::InvalidConfig("scan_dpi must be positive".into()));
        }
        if self.matcher.sample_size == 0 || self.legend.sample_size == 0 {
            return Err(Error::InvalidConfig("sample_size must be positive".into()));
        }
        if self.matcher.tile_size <= self.matcher.sample_size {
            return Err(Error::InvalidConfig(
                "tile_size must exceed the matcher sample_size".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.matcher.step_ratio) || self.matcher.step_ratio == 0.0 {
            return Err(Error::InvalidConfig(
                "step_ratio must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.legend.width_ratio)
            || !(0.0..=1.0).contains(&self.legend.height_ratio)
        {
            return Err(Error::InvalidConfig(
                "legend width/height ratios must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scan_dpi: 300.0,
            legend: LegendConfig::default(),
            matcher: MatcherConfig::default(),
            context: ContextConfig::default(),
            ocr: OcrConfig::default(),
            annotations: AnnotationConfig::default(),
        }
    }
}

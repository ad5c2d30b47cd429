// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types for legend-driven plan takeoff
//!
//! This crate holds everything the vision pipeline shares that does not
//! touch rasters: the data model (scale, matches, results, annotations),
//! the run configuration, feature-descriptor value types with their
//! similarity metrics, scale arithmetic and the run-level diagnostics
//! collection. All types here are pure values; entities are created once
//! per pipeline run and never mutated afterwards.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod features;
pub mod scale;
pub mod types;

// Re-export commonly used types
pub use config::{
    AnalysisConfig, AnnotationConfig, ContextConfig, LegendConfig, LegendCorner, MatcherConfig,
    NamedRegion, OcrConfig, SizeBounds,
};
pub use diagnostics::{Diagnostic, Diagnostics, Stage};
pub use error::{Error, Result};
pub use features::{descriptor_similarity, FeatureDescriptor, SimilarityWeights};
pub use scale::pixels_per_meter;
pub use types::{
    Annotation, AnnotationKind, ElementCategory, ElementResult, MeasurementType, PatternMatch,
    Point2D, Rect, ScaleInfo, Summary, TakeoffReport,
};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Legend-driven quantity takeoff from scanned architectural drawings
//!
//! This crate provides a complete pipeline for:
//! 1. Calibrating the drawing scale from OCR'd "1:N" notation
//! 2. Segmenting the legend block into pattern swatches
//! 3. Classifying swatches into building element types
//! 4. Searching the whole plan for each pattern (tiled, in parallel)
//! 5. Extracting text annotations and correlating them to elements
//! 6. Aggregating matches into areas, counts and a run summary
//!
//! # Usage
//!
//! ```rust,ignore
//! use takeoff_vision::{analyze_plan, NullOcr};
//! use takeoff_core::AnalysisConfig;
//!
//! let plan = image::open("plan.png")?.to_rgba8();
//! let report = analyze_plan(&plan, &AnalysisConfig::default(), &NullOcr, &labeler)?;
//! println!("wall area: {:.2} m²", report.summary.total_wall_area);
//! ```
//!
//! OCR and pattern labeling are collaborator traits ([`OcrEngine`],
//! [`PatternLabeler`]); the pipeline degrades gracefully when either
//! fails, recording diagnostics instead of aborting.

pub mod aggregate;
pub mod annotate;
pub mod classify;
pub mod context;
pub mod error;
pub mod features;
pub mod image_ops;
pub mod legend;
pub mod matcher;
pub mod ocr;
pub mod overlay;
pub mod scale;

// Re-export commonly used types and functions
pub use classify::{classify_swatches, LegendPattern, PatternLabeler, CLASSIFY_PROMPT};
pub use error::{Error, Result};
pub use features::extract_features;
pub use legend::{extract_swatches, locate_legend, Swatch};
pub use matcher::{deduplicate_matches, find_pattern};
pub use ocr::{NullOcr, OcrEngine, OcrOutput, OcrWord};
pub use overlay::render_overlay;
pub use scale::{calibrate, parse_scale_notation};

use image::RgbaImage;
use takeoff_core::{AnalysisConfig, Diagnostics, Stage, TakeoffReport};
use tracing::info;

/// Run the full takeoff pipeline on one plan raster.
///
/// The only fatal errors are an invalid configuration and (upstream of
/// this function) a plan image that fails to load. OCR and classifier
/// failures degrade to fallbacks and show up in the report's
/// diagnostics.
pub fn analyze_plan(
    plan: &RgbaImage,
    config: &AnalysisConfig,
    ocr: &dyn OcrEngine,
    labeler: &dyn PatternLabeler,
) -> Result<TakeoffReport> {
    config.validate()?;
    let mut diagnostics = Diagnostics::new();

    // Step 1: Scale calibration
    let scale = calibrate(plan, ocr, config, &mut diagnostics);
    info!(notation = %scale.notation, fallback = scale.fallback, "scale calibrated");

    // Step 2: Legend segmentation
    let (legend_crop, legend_rect) = locate_legend(plan, &config.legend);
    let swatches = extract_swatches(&legend_crop, &config.legend);
    if swatches.is_empty() {
        diagnostics.warn(
            Stage::LegendSegmentation,
            "no swatches found in the legend region",
        );
    }
    info!(count = swatches.len(), "legend swatches extracted");

    // Step 3: Pattern classification
    let patterns = classify_swatches(&swatches, labeler, &mut diagnostics);

    // Step 4: Plan-wide search, per pattern. The legend itself is
    // excluded so swatches do not match their own printed samples.
    let mut results = Vec::with_capacity(patterns.len());
    for pattern in &patterns {
        let matches = find_pattern(
            plan,
            pattern,
            &config.matcher,
            &config.context,
            Some(legend_rect),
        );
        if matches.is_empty() {
            diagnostics.warn(
                Stage::PatternMatching,
                format!("no occurrences of '{}' found", pattern.element_type),
            );
        }
        results.push(aggregate::aggregate(pattern, matches, &scale));
    }

    // Step 5: Annotations
    let annotations = annotate::extract_annotations(plan, ocr, &config.ocr, &mut diagnostics);
    annotate::correlate(
        &annotations,
        &mut results,
        config.annotations.max_correlation_distance,
    );

    // Step 6: Report
    let report = aggregate::build_report(scale, results, diagnostics);
    info!(
        elements = report.results.len(),
        matches = report.summary.total_matches,
        "takeoff complete"
    );
    Ok(report)
}

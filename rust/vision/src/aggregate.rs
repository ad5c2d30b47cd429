// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement aggregation
//!
//! Turns the per-pattern match lists into element results and run
//! totals. Area elements sum pixel areas and convert through the
//! calibrated scale; count elements just count. Reference elements are
//! reported with their locations but no measurement.

use crate::classify::LegendPattern;
use std::time::{SystemTime, UNIX_EPOCH};
use takeoff_core::{
    Diagnostics, ElementCategory, ElementResult, MeasurementType, PatternMatch, ScaleInfo, Summary,
    TakeoffReport,
};

/// Build the measurement result for one legend pattern.
pub fn aggregate(pattern: &LegendPattern, matches: Vec<PatternMatch>, scale: &ScaleInfo) -> ElementResult {
    let measurement = match pattern.measurement_type {
        MeasurementType::Area => {
            let pixel_area: f64 = matches
                .iter()
                .map(|m| m.width as f64 * m.height as f64)
                .sum();
            pixel_area / (scale.pixels_per_meter * scale.pixels_per_meter)
        }
        MeasurementType::Count => matches.len() as f64,
        MeasurementType::None => 0.0,
    };

    let average_confidence = if matches.is_empty() {
        0.0
    } else {
        matches.iter().map(|m| m.confidence).sum::<f64>() / matches.len() as f64
    };

    ElementResult {
        element: pattern.element_type.clone(),
        category: pattern.category,
        measurement_type: pattern.measurement_type,
        measurement,
        unit: pattern.measurement_type.unit().to_string(),
        match_count: matches.len(),
        locations: matches,
        average_confidence,
        code: pattern.code.clone(),
        annotations: Vec::new(),
    }
}

/// Compute run totals over all element results.
pub fn summarize(results: &[ElementResult]) -> Summary {
    let mut summary = Summary::default();
    let mut confidence_sum = 0.0;

    for result in results {
        summary.total_matches += result.match_count;
        confidence_sum += result.average_confidence * result.match_count as f64;
        match result.category {
            ElementCategory::Wall if result.measurement_type == MeasurementType::Area => {
                summary.total_wall_area += result.measurement;
            }
            ElementCategory::Opening if result.measurement_type == MeasurementType::Count => {
                summary.total_openings += result.measurement;
            }
            _ => {}
        }
    }

    if summary.total_matches > 0 {
        summary.average_confidence = confidence_sum / summary.total_matches as f64;
    }
    summary
}

/// Assemble the final report.
pub fn build_report(
    scale: ScaleInfo,
    results: Vec<ElementResult>,
    diagnostics: Diagnostics,
) -> TakeoffReport {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let summary = summarize(&results);
    TakeoffReport {
        scale,
        results,
        summary,
        diagnostics: diagnostics.into_entries(),
        timestamp,
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Legend pattern classification
//!
//! Each swatch is labeled through an injected vision-language
//! collaborator. Responses are freeform text that usually, but not
//! always, contains a JSON payload; parsing is defensive and falls back
//! to a deterministic keyword heuristic over the raw text. A failed
//! call (after one retry) skips the swatch with a diagnostic instead of
//! aborting the run.

use crate::features::extract_features;
use crate::legend::Swatch;
use image::RgbaImage;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use takeoff_core::{Diagnostics, ElementCategory, FeatureDescriptor, MeasurementType, Stage};

/// Prompt handed to the vision-language collaborator for every swatch
pub const CLASSIFY_PROMPT: &str = "This image is one pattern swatch from the legend of an \
architectural floor plan. Classify it and answer with a JSON object: \
{\"element_type\": short name, \"category\": one of \"wall\" | \"opening\" | \
\"reference\", \"measurement_type\": one of \"area\" | \"count\" | \"none\", \
\"confidence\": 0.0-1.0}. Categories: wall = structural fills and hatches \
(concrete, masonry, insulation), opening = doors and windows, reference = \
symbols, north arrows, scale bars and other non-measurable marks.";

/// Confidence assigned when the keyword fallback was used
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Vision-language classification collaborator.
///
/// Returns freeform text expected, but not guaranteed, to contain a
/// structured payload.
pub trait PatternLabeler: Send + Sync {
    fn label(&self, swatch: &RgbaImage, prompt: &str) -> crate::error::Result<String>;
}

/// A classified legend pattern, ready for the plan-wide search
#[derive(Debug, Clone)]
pub struct LegendPattern {
    pub id: usize,
    pub element_type: String,
    pub category: ElementCategory,
    pub measurement_type: MeasurementType,
    /// Classifier confidence in the label, not match confidence
    pub confidence: f64,
    /// DIN 276 cost-group code, when one applies
    pub code: Option<String>,
    pub source_image: RgbaImage,
    pub descriptor: FeatureDescriptor,
}

/// Parsed classifier output before it becomes a LegendPattern
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub element_type: String,
    pub category: ElementCategory,
    pub measurement_type: MeasurementType,
    pub confidence: f64,
    pub code: Option<String>,
}

#[derive(Deserialize)]
struct RawClassification {
    #[serde(alias = "elementType", alias = "element", alias = "type")]
    element_type: Option<String>,
    category: Option<String>,
    #[serde(alias = "measurementType", alias = "measurement")]
    measurement_type: Option<String>,
    confidence: Option<f64>,
    code: Option<String>,
}

fn category_from_text(text: &str) -> Option<ElementCategory> {
    let lower = text.to_lowercase();
    const WALL: &[&str] = &[
        "wall", "wand", "mauer", "mauerwerk", "beton", "stahlbeton", "concrete", "masonry",
        "insulation", "dämmung",
    ];
    const OPENING: &[&str] = &[
        "opening", "öffnung", "door", "tür", "tuer", "window", "fenster",
    ];
    const REFERENCE: &[&str] = &[
        "reference", "symbol", "north", "nord", "arrow", "pfeil", "scale bar", "legend",
        "stamp", "marker",
    ];
    if WALL.iter().any(|k| lower.contains(k)) {
        Some(ElementCategory::Wall)
    } else if OPENING.iter().any(|k| lower.contains(k)) {
        Some(ElementCategory::Opening)
    } else if REFERENCE.iter().any(|k| lower.contains(k)) {
        Some(ElementCategory::Reference)
    } else {
        None
    }
}

fn measurement_from_text(text: &str) -> Option<MeasurementType> {
    let lower = text.to_lowercase();
    const AREA: &[&str] = &["area", "fläche", "m2", "m²", "sqm"];
    const COUNT: &[&str] = &["count", "anzahl", "stück", "stk", "pcs", "each"];
    const NONE: &[&str] = &["none", "n/a", "not measured"];
    if AREA.iter().any(|k| lower.contains(k)) {
        Some(MeasurementType::Area)
    } else if COUNT.iter().any(|k| lower.contains(k)) {
        Some(MeasurementType::Count)
    } else if NONE.iter().any(|k| lower.contains(k)) {
        Some(MeasurementType::None)
    } else {
        None
    }
}

fn default_measurement(category: ElementCategory) -> MeasurementType {
    match category {
        ElementCategory::Wall => MeasurementType::Area,
        ElementCategory::Opening => MeasurementType::Count,
        ElementCategory::Reference | ElementCategory::Unknown => MeasurementType::None,
    }
}

/// DIN 276 cost-group code attached per category
fn din_code(category: ElementCategory) -> Option<String> {
    match category {
        ElementCategory::Wall => Some("KG 330".into()),
        ElementCategory::Opening => Some("KG 334".into()),
        ElementCategory::Reference | ElementCategory::Unknown => None,
    }
}

/// Try to parse a structured JSON payload out of freeform response text.
pub fn parse_structured(response: &str) -> Option<Classification> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    let raw: RawClassification = serde_json::from_str(&response[start..=end]).ok()?;

    let category = raw
        .category
        .as_deref()
        .and_then(category_from_text)
        .unwrap_or(ElementCategory::Unknown);
    let measurement_type = raw
        .measurement_type
        .as_deref()
        .and_then(measurement_from_text)
        .unwrap_or_else(|| default_measurement(category));
    let element_type = raw
        .element_type
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| category.as_str().to_string());

    Some(Classification {
        element_type,
        category,
        measurement_type,
        confidence: raw.confidence.unwrap_or(0.7).clamp(0.0, 1.0),
        code: raw.code.or_else(|| din_code(category)),
    })
}

/// Deterministic keyword heuristic over the raw response text, used
/// when no structured payload parses.
pub fn keyword_fallback(response: &str) -> Classification {
    let category = category_from_text(response).unwrap_or(ElementCategory::Unknown);
    let measurement_type =
        measurement_from_text(response).unwrap_or_else(|| default_measurement(category));
    Classification {
        element_type: category.as_str().to_string(),
        category,
        measurement_type,
        confidence: FALLBACK_CONFIDENCE,
        code: din_code(category),
    }
}

fn label_with_retry(
    labeler: &dyn PatternLabeler,
    swatch: &RgbaImage,
) -> std::result::Result<String, String> {
    match labeler.label(swatch, CLASSIFY_PROMPT) {
        Ok(text) => Ok(text),
        Err(first) => {
            tracing::debug!("classifier failed, retrying once: {first}");
            labeler
                .label(swatch, CLASSIFY_PROMPT)
                .map_err(|second| second.to_string())
        }
    }
}

/// Classify all swatches and deduplicate by `(element_type, category)`,
/// first-seen wins. Swatch order is preserved.
pub fn classify_swatches(
    swatches: &[Swatch],
    labeler: &dyn PatternLabeler,
    diagnostics: &mut Diagnostics,
) -> Vec<LegendPattern> {
    let mut patterns = Vec::new();
    let mut seen: FxHashSet<(String, ElementCategory)> = FxHashSet::default();

    for (index, swatch) in swatches.iter().enumerate() {
        let response = match label_with_retry(labeler, &swatch.image) {
            Ok(response) => response,
            Err(err) => {
                diagnostics.warn(
                    Stage::PatternClassification,
                    format!("swatch {index} skipped: {err}"),
                );
                continue;
            }
        };

        let classification =
            parse_structured(&response).unwrap_or_else(|| keyword_fallback(&response));

        let key = (
            classification.element_type.to_lowercase(),
            classification.category,
        );
        if !seen.insert(key) {
            tracing::debug!(
                element = %classification.element_type,
                "duplicate legend pattern skipped"
            );
            continue;
        }

        patterns.push(LegendPattern {
            id: patterns.len(),
            element_type: classification.element_type,
            category: classification.category,
            measurement_type: classification.measurement_type,
            confidence: classification.confidence,
            code: classification.code,
            source_image: swatch.image.clone(),
            descriptor: extract_features(&swatch.image),
        });
    }

    patterns
}

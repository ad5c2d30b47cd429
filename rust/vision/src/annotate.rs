// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text annotation extraction and correlation
//!
//! German architectural drawings carry a dense shorthand: dimensions
//! ("350 cm"), levels ("OK +2,50"), fire ratings ("F90"), utility
//! letters, opening specs ("F1 885 x 2010") and DIN-style
//! abbreviations. OCR words from the configured regions are matched
//! against these conventions, then each parsed annotation is attached
//! to the nearest element result within the correlation radius.

use crate::image_ops::crop_region;
use crate::ocr::{recognize_with_retry, OcrEngine, OcrWord};
use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use takeoff_core::{
    Annotation, AnnotationKind, Diagnostics, ElementResult, OcrConfig, Point2D, Rect, Stage,
};
use tracing::debug;

static SCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1\s*:\s*(\d+)$").expect("valid regex"));
static FIRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([FT]\s?\d{2,3})$").expect("valid regex"));
static LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(OK|UK)\s*([+-]?\d+(?:[.,]\d+)?)$").expect("valid regex"));
static OPENING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{1,3}\d{0,3})\s+(\d+)\s*[x×]\s*(\d+)$").expect("valid regex"));
static DIMENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:[.,]\d+)?)\s*(mm|cm|m)$").expect("valid regex"));

/// Single-letter utility markers next to riser and duct symbols
const UTILITY_LETTERS: &[&str] = &["E", "G", "W", "A", "L", "S"];

/// Common abbreviations found on German plans, DIN 1356 vintage
static ABBREVIATIONS: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    map.insert("BRH", "Brüstungshöhe");
    map.insert("STB", "Stahlbeton");
    map.insert("UZ", "Unterzug");
    map.insert("RH", "Rohbauhöhe");
    map.insert("LH", "Lichte Höhe");
    map.insert("FFB", "Fertigfußboden");
    map.insert("OKF", "Oberkante Fertigfußboden");
    map.insert("OKRF", "Oberkante Rohfußboden");
    map.insert("GK", "Gipskarton");
    map.insert("WD", "Wärmedämmung");
    map
});

// At most this many consecutive OCR words are joined when trying to
// parse a multi-word annotation ("OK +2,50", "F1 885 x 2010").
const MAX_JOINED_WORDS: usize = 4;

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse().ok()
}

/// Classify one candidate string against the annotation conventions.
/// The whole string must be a single annotation; partial matches are
/// rejected so multi-word joins cannot swallow neighboring words.
fn classify_text(text: &str) -> Option<Annotation> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let annotation = |kind, value, code: Option<String>, confidence| {
        Some(Annotation {
            kind,
            text: text.to_string(),
            value,
            code,
            confidence,
            position: Point2D::new(0.0, 0.0),
        })
    };

    if let Some(caps) = SCALE_RE.captures(text) {
        let ratio = parse_number(&caps[1])?;
        return annotation(AnnotationKind::Scale, Some(ratio), None, 0.9);
    }
    if let Some(caps) = FIRE_RE.captures(text) {
        let code = caps[1].replace(' ', "");
        return annotation(AnnotationKind::FireProtection, None, Some(code), 0.9);
    }
    if let Some(caps) = LEVEL_RE.captures(text) {
        let value = parse_number(&caps[2])?;
        return annotation(
            AnnotationKind::Level,
            Some(value),
            Some(caps[1].to_string()),
            0.8,
        );
    }
    if let Some(caps) = OPENING_RE.captures(text) {
        return annotation(
            AnnotationKind::Opening,
            None,
            Some(caps[1].to_string()),
            0.8,
        );
    }
    if let Some(caps) = DIMENSION_RE.captures(text) {
        let number = parse_number(&caps[1])?;
        let meters = match &caps[2] {
            "mm" => number / 1000.0,
            "cm" => number / 100.0,
            _ => number,
        };
        return annotation(AnnotationKind::Dimension, Some(meters), None, 0.85);
    }
    if UTILITY_LETTERS.contains(&text) {
        return annotation(AnnotationKind::Utility, None, Some(text.to_string()), 0.75);
    }
    if ABBREVIATIONS.contains_key(text) {
        return annotation(AnnotationKind::Other, None, Some(text.to_string()), 0.75);
    }
    None
}

/// Parse a region's word list into annotations. Words are joined
/// greedily, longest run first, so "OK" "+2,50" becomes one level
/// annotation rather than two unparsed words. The annotation position
/// is the center of the run's first word, shifted to plan coordinates.
fn parse_words(words: &[OcrWord], region_origin: Rect) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut i = 0;
    while i < words.len() {
        let mut consumed = 0;
        for len in (1..=MAX_JOINED_WORDS.min(words.len() - i)).rev() {
            let joined = words[i..i + len]
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(mut annotation) = classify_text(&joined) {
                let center = words[i].bbox.center();
                annotation.position = Point2D::new(
                    region_origin.x as f64 + center.x,
                    region_origin.y as f64 + center.y,
                );
                annotations.push(annotation);
                consumed = len;
                break;
            }
        }
        i += consumed.max(1);
    }
    annotations
}

/// Run OCR over the configured annotation regions and parse the
/// recognized words. Engine failures are recorded per region and do
/// not abort extraction.
pub fn extract_annotations(
    plan: &RgbaImage,
    engine: &dyn OcrEngine,
    config: &OcrConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    // Regions overlap; the same word must not yield two annotations.
    let mut seen: FxHashSet<(String, i64, i64)> = FxHashSet::default();

    for region in &config.annotation_regions {
        let (crop, origin) = crop_region(plan, region);
        if crop.width() == 0 || crop.height() == 0 {
            continue;
        }
        let output = match recognize_with_retry(engine, &crop, &config.language) {
            Ok(output) => output,
            Err(message) => {
                diagnostics.warn(
                    Stage::AnnotationExtraction,
                    format!("OCR failed in region '{}': {message}", region.name),
                );
                continue;
            }
        };
        let confident: Vec<OcrWord> = output
            .words
            .into_iter()
            .filter(|w| w.confidence >= config.min_word_confidence)
            .collect();
        for annotation in parse_words(&confident, origin) {
            let key = (
                annotation.text.clone(),
                annotation.position.x.round() as i64,
                annotation.position.y.round() as i64,
            );
            if seen.insert(key) {
                annotations.push(annotation);
            }
        }
    }
    debug!(count = annotations.len(), "annotations extracted");
    annotations
}

/// Attach annotations to element results. An annotation is attached to
/// every result that has a match within the correlation radius; each
/// result's list is ordered nearest first. Scale annotations describe
/// the drawing, not an element, and are never attached.
pub fn correlate(
    annotations: &[Annotation],
    results: &mut [ElementResult],
    max_distance: f64,
) {
    for result in results.iter_mut() {
        let mut nearby: Vec<(f64, Annotation)> = Vec::new();
        for annotation in annotations {
            if annotation.kind == AnnotationKind::Scale {
                continue;
            }
            let closest = result
                .locations
                .iter()
                .map(|m| annotation.position.distance_to(&m.center()))
                .fold(f64::INFINITY, f64::min);
            if closest <= max_distance {
                nearby.push((closest, annotation.clone()));
            }
        }
        nearby.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        result.annotations = nearby.into_iter().map(|(_, a)| a).collect();
    }
}

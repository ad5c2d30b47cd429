// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline scenarios on synthetic plans
//!
//! Each scenario builds a plan raster from scratch: a legend block in
//! the top-left corner holding one pattern swatch, plus occurrences of
//! that pattern placed on the drawing area. OCR and classifier
//! collaborators are scripted.

use image::{Rgba, RgbaImage};
use takeoff_core::{AnalysisConfig, ElementCategory, LegendCorner, MeasurementType, Stage};
use takeoff_vision::ocr::{NullOcr, OcrEngine, OcrOutput, OcrWord};
use takeoff_vision::{analyze_plan, PatternLabeler};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const DARK: Rgba<u8> = Rgba([30, 30, 30, 255]);

const PLAN_SIZE: u32 = 1000;
const SAMPLE: u32 = 50;

fn blank_plan() -> RgbaImage {
    let mut plan = RgbaImage::new(PLAN_SIZE, PLAN_SIZE);
    for pixel in plan.pixels_mut() {
        *pixel = WHITE;
    }
    plan
}

fn draw_solid(plan: &mut RgbaImage, x0: u32, y0: u32) {
    for y in y0..y0 + SAMPLE {
        for x in x0..x0 + SAMPLE {
            plan.put_pixel(x, y, DARK);
        }
    }
}

fn draw_frame(plan: &mut RgbaImage, x0: u32, y0: u32) {
    const THICKNESS: u32 = 4;
    for y in 0..SAMPLE {
        for x in 0..SAMPLE {
            let near_border = x < THICKNESS
                || y < THICKNESS
                || x >= SAMPLE - THICKNESS
                || y >= SAMPLE - THICKNESS;
            if near_border {
                plan.put_pixel(x0 + x, y0 + y, DARK);
            }
        }
    }
}

/// Legend in the top-left corner, swatch grid aligned to the plan
/// origin, window step of 25 px so pattern placements at multiples of
/// 25 are hit exactly.
fn test_config() -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.legend.corner = LegendCorner::TopLeft;
    config.legend.margin = 0;
    config.legend.grid_spacing = 25;
    config.legend.sample_size = SAMPLE;
    config.legend.probe_size = 20;
    config.matcher.sample_size = SAMPLE;
    config.matcher.step_ratio = 0.5;
    config
}

/// Reports "1:100" in the footer strip and one fire-rating word in the
/// main drawing area; silent elsewhere.
struct ScriptedOcr;

impl OcrEngine for ScriptedOcr {
    fn recognize(
        &self,
        region: &RgbaImage,
        _language: &str,
    ) -> takeoff_vision::Result<OcrOutput> {
        match (region.width(), region.height()) {
            // footer: 100% x 15% of the 1000 px plan
            (1000, 150) => Ok(OcrOutput {
                text: "M 1:100".into(),
                words: Vec::new(),
            }),
            // main drawing area: word near the pattern at (300, 300)
            (1000, 730) => Ok(OcrOutput {
                text: String::new(),
                words: vec![OcrWord {
                    text: "F90".into(),
                    bbox: takeoff_core::Rect::new(290, 170, 20, 10),
                    confidence: 0.9,
                }],
            }),
            _ => Ok(OcrOutput::default()),
        }
    }
}

struct StaticLabeler(&'static str);

impl PatternLabeler for StaticLabeler {
    fn label(&self, _swatch: &RgbaImage, _prompt: &str) -> takeoff_vision::Result<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn test_wall_area_end_to_end() {
    let mut plan = blank_plan();
    // legend swatch at the plan origin, three occurrences on the sheet
    draw_solid(&mut plan, 0, 0);
    let placements = [(300, 300), (600, 200), (200, 700)];
    for &(x, y) in &placements {
        draw_solid(&mut plan, x, y);
    }

    let labeler = StaticLabeler(
        r#"{"elementType":"Tragende Wand","category":"wall","measurementType":"area","confidence":0.9}"#,
    );
    let report = analyze_plan(&plan, &test_config(), &ScriptedOcr, &labeler).unwrap();

    assert_eq!(report.scale.notation, "1:100");
    assert!(!report.scale.fallback);

    assert_eq!(report.results.len(), 1);
    let wall = &report.results[0];
    assert_eq!(wall.element, "Tragende Wand");
    assert_eq!(wall.category, ElementCategory::Wall);
    assert_eq!(wall.match_count, 3);
    for &(x, y) in &placements {
        assert!(
            wall.locations
                .iter()
                .any(|m| m.x == x && m.y == y && m.width == SAMPLE && m.height == SAMPLE),
            "no match at ({x}, {y})"
        );
    }

    // 3 squares of 50x50 px at 118.11 px/m
    let ppm = report.scale.pixels_per_meter;
    let expected = 3.0 * (SAMPLE as f64 * SAMPLE as f64) / (ppm * ppm);
    let deviation = (wall.measurement - expected).abs() / expected;
    assert!(
        deviation < 0.05,
        "area {} deviates {:.1}% from {}",
        wall.measurement,
        deviation * 100.0,
        expected
    );
    assert!((report.summary.total_wall_area - wall.measurement).abs() < 1e-9);

    // the fire rating near (300, 300) is attached to the wall element
    assert!(wall
        .annotations
        .iter()
        .any(|a| a.code.as_deref() == Some("F90")));
}

#[test]
fn test_opening_count_end_to_end() {
    let mut plan = blank_plan();
    draw_frame(&mut plan, 0, 0);
    draw_frame(&mut plan, 400, 400);
    draw_frame(&mut plan, 700, 600);

    let labeler = StaticLabeler(
        r#"{"elementType":"Tür","category":"opening","measurementType":"count","confidence":0.85}"#,
    );
    let report = analyze_plan(&plan, &test_config(), &NullOcr, &labeler).unwrap();

    // no OCR backend: the fallback scale is used and flagged
    assert!(report.scale.fallback);
    assert_eq!(report.scale.ratio, 100);

    assert_eq!(report.results.len(), 1);
    let opening = &report.results[0];
    assert_eq!(opening.category, ElementCategory::Opening);
    assert_eq!(opening.measurement_type, MeasurementType::Count);
    assert_eq!(opening.match_count, 2);
    assert_eq!(opening.measurement, 2.0);
    assert_eq!(opening.unit, "pcs");
    assert_eq!(report.summary.total_openings, 2.0);
}

/// Fails every call. The pipeline must still deliver a complete report:
/// fallback scale, matches found, no annotations.
struct ThrowingOcr;

impl OcrEngine for ThrowingOcr {
    fn recognize(
        &self,
        _region: &RgbaImage,
        _language: &str,
    ) -> takeoff_vision::Result<OcrOutput> {
        Err(takeoff_vision::Error::Ocr("engine down".into()))
    }
}

#[test]
fn test_throwing_ocr_still_yields_full_report() {
    let mut plan = blank_plan();
    draw_solid(&mut plan, 0, 0);
    draw_solid(&mut plan, 300, 300);

    let labeler = StaticLabeler(
        r#"{"elementType":"Wand","category":"wall","measurementType":"area","confidence":0.9}"#,
    );
    let report = analyze_plan(&plan, &test_config(), &ThrowingOcr, &labeler).unwrap();

    assert!(report.scale.fallback);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].match_count, 1);
    assert!(report.results[0].annotations.is_empty());

    // every scale region plus every annotation region failed, plus the
    // fallback notice
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.stage == Stage::AnnotationExtraction));
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.stage == Stage::ScaleCalibration));
}

#[test]
fn test_blank_plan_degrades_with_diagnostics() {
    let plan = blank_plan();
    let labeler = StaticLabeler("");
    let report = analyze_plan(&plan, &test_config(), &NullOcr, &labeler).unwrap();

    assert!(report.scale.fallback);
    assert!(report.results.is_empty());
    assert_eq!(report.summary.total_matches, 0);
    assert_eq!(report.summary.total_wall_area, 0.0);

    let stages: Vec<Stage> = report.diagnostics.iter().map(|d| d.stage).collect();
    assert!(stages.contains(&Stage::ScaleCalibration));
    assert!(stages.contains(&Stage::LegendSegmentation));
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scale calibration
//!
//! Reads the drawing's 1:N scale notation via OCR over candidate regions
//! tried in priority order (footer, then header, then the legend area).
//! The first region whose text parses wins. When every region misses, a
//! flagged 1:100 fallback is substituted so downstream consumers can
//! mark the measurements as low-trust.

use crate::image_ops::crop_region;
use crate::ocr::{recognize_with_retry, OcrEngine};
use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;
use takeoff_core::{AnalysisConfig, Diagnostics, ScaleInfo, Stage};

static SCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"1\s*:\s*(\d+)").expect("Invalid scale regex"));

/// Parse a 1:N scale notation out of recognized text.
pub fn parse_scale_notation(text: &str) -> Option<u32> {
    let caps = SCALE_RE.captures(text)?;
    let ratio: u32 = caps[1].parse().ok()?;
    if ratio == 0 {
        return None;
    }
    Some(ratio)
}

/// Derive the drawing scale from the plan image.
///
/// Never fails: OCR errors on a region are recorded and treated as "no
/// match for this region".
pub fn calibrate(
    plan: &RgbaImage,
    engine: &dyn OcrEngine,
    config: &AnalysisConfig,
    diagnostics: &mut Diagnostics,
) -> ScaleInfo {
    for region in &config.ocr.scale_regions {
        let (crop, _) = crop_region(plan, region);
        if crop.width() == 0 || crop.height() == 0 {
            continue;
        }
        let output = match recognize_with_retry(engine, &crop, &config.ocr.language) {
            Ok(output) => output,
            Err(err) => {
                diagnostics.warn(
                    Stage::ScaleCalibration,
                    format!("OCR failed on {} region: {err}", region.name),
                );
                continue;
            }
        };
        if let Some(ratio) = parse_scale_notation(&output.text) {
            tracing::info!(region = %region.name, ratio, "scale notation detected");
            return ScaleInfo::detected(ratio, config.scan_dpi);
        }
    }

    diagnostics.warn(
        Stage::ScaleCalibration,
        "no scale notation recognized, assuming 1:100",
    );
    ScaleInfo::fallback(config.scan_dpi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ocr::OcrOutput;

    struct TextOcr(&'static str);

    impl OcrEngine for TextOcr {
        fn recognize(&self, _region: &RgbaImage, _language: &str) -> crate::error::Result<OcrOutput> {
            Ok(OcrOutput {
                text: self.0.into(),
                words: Vec::new(),
            })
        }
    }

    struct ThrowingOcr;

    impl OcrEngine for ThrowingOcr {
        fn recognize(&self, _region: &RgbaImage, _language: &str) -> crate::error::Result<OcrOutput> {
            Err(Error::Ocr("engine down".into()))
        }
    }

    #[test]
    fn test_parse_scale_notation() {
        assert_eq!(parse_scale_notation("M 1:50"), Some(50));
        assert_eq!(parse_scale_notation("Maßstab 1 : 200"), Some(200));
        assert_eq!(parse_scale_notation("1:100 / A1"), Some(100));
        assert_eq!(parse_scale_notation("no scale here"), None);
        assert_eq!(parse_scale_notation("1:0"), None);
    }

    #[test]
    fn test_calibrate_detects_scale() {
        let plan = RgbaImage::new(400, 400);
        let mut diags = Diagnostics::new();
        let scale = calibrate(&plan, &TextOcr("M 1:50"), &AnalysisConfig::default(), &mut diags);
        assert_eq!(scale.ratio, 50);
        assert!(!scale.fallback);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_calibrate_falls_back_when_unreadable() {
        let plan = RgbaImage::new(400, 400);
        let mut diags = Diagnostics::new();
        let scale = calibrate(&plan, &TextOcr("Grundriss EG"), &AnalysisConfig::default(), &mut diags);
        assert_eq!(scale.ratio, 100);
        assert!(scale.fallback);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_calibrate_survives_throwing_engine() {
        let plan = RgbaImage::new(400, 400);
        let mut diags = Diagnostics::new();
        let scale = calibrate(&plan, &ThrowingOcr, &AnalysisConfig::default(), &mut diags);
        assert!(scale.fallback);
        // One warning per failed region plus the fallback notice
        assert_eq!(diags.len(), 4);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OCR collaborator interface
//!
//! The pipeline does not ship an OCR engine; callers inject one through
//! [`OcrEngine`]. Engine failures are recoverable everywhere they occur:
//! the calibrator and the annotation extractor call through
//! [`recognize_with_retry`], which tries twice and downgrades failure to
//! `None` so the caller can record a diagnostic and move on.

use crate::error::Result;
use image::RgbaImage;
use takeoff_core::Rect;

/// One word recognized inside a region, with its region-local box
#[derive(Debug, Clone)]
pub struct OcrWord {
    pub text: String,
    pub bbox: Rect,
    pub confidence: f64,
}

/// Result of recognizing one image region
#[derive(Debug, Clone, Default)]
pub struct OcrOutput {
    /// Full recognized text of the region
    pub text: String,
    /// Per-word boxes and confidences
    pub words: Vec<OcrWord>,
}

/// Every OCR backend implements this.
///
/// `recognize` receives the pre-cropped region by reference; engines
/// clone internally only what they need for preprocessing.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, region: &RgbaImage, language: &str) -> Result<OcrOutput>;
}

/// Engine that recognizes nothing. Used when no OCR backend is wired
/// up; the pipeline then degrades to the fallback scale and empty
/// annotation lists.
pub struct NullOcr;

impl OcrEngine for NullOcr {
    fn recognize(&self, _region: &RgbaImage, _language: &str) -> Result<OcrOutput> {
        Ok(OcrOutput::default())
    }
}

/// Call the engine with a single retry. Returns `None` after the second
/// failure; the error text is handed back for diagnostics.
pub fn recognize_with_retry(
    engine: &dyn OcrEngine,
    region: &RgbaImage,
    language: &str,
) -> std::result::Result<OcrOutput, String> {
    match engine.recognize(region, language) {
        Ok(output) => Ok(output),
        Err(first) => {
            tracing::debug!("OCR failed, retrying once: {first}");
            engine
                .recognize(region, language)
                .map_err(|second| second.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyOcr {
        calls: AtomicU32,
    }

    impl OcrEngine for FlakyOcr {
        fn recognize(&self, _region: &RgbaImage, _language: &str) -> Result<OcrOutput> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Ocr("transient".into()))
            } else {
                Ok(OcrOutput {
                    text: "1:50".into(),
                    words: Vec::new(),
                })
            }
        }
    }

    #[test]
    fn test_retry_recovers_transient_failure() {
        let engine = FlakyOcr {
            calls: AtomicU32::new(0),
        };
        let region = RgbaImage::new(4, 4);
        let output = recognize_with_retry(&engine, &region, "deu+eng").unwrap();
        assert_eq!(output.text, "1:50");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_null_ocr_is_empty() {
        let region = RgbaImage::new(4, 4);
        let output = NullOcr.recognize(&region, "deu+eng").unwrap();
        assert!(output.text.is_empty());
        assert!(output.words.is_empty());
    }
}

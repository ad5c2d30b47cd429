// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scale arithmetic: 1:N notation to pixel calibration
//!
//! The calibration assumes the drawing was scanned at a known resolution
//! (default 300 dpi). At scan resolution `dpi`, one meter of paper spans
//! `dpi * 1000 / 25.4` pixels; dividing by the scale denominator N gives
//! pixels per real-world meter. At 300 dpi and 1:100 this is the familiar
//! 118.11 px/m. The resolution is a configuration value, not a constant,
//! because it changes the calibration quadratically for areas.

use crate::types::ScaleInfo;

/// Millimeters per inch, used to convert scan dpi to pixels per meter
pub const MM_PER_INCH: f64 = 25.4;

/// Scale denominator substituted when no notation is recognized
pub const FALLBACK_RATIO: u32 = 100;

/// Pixels per real-world meter for a 1:`ratio` drawing scanned at
/// `scan_dpi` dots per inch.
pub fn pixels_per_meter(scan_dpi: f64, ratio: u32) -> f64 {
    scan_dpi * 1000.0 / MM_PER_INCH / ratio as f64
}

impl ScaleInfo {
    /// Scale read off the drawing.
    pub fn detected(ratio: u32, scan_dpi: f64) -> Self {
        Self {
            notation: format!("1:{ratio}"),
            ratio,
            pixels_per_meter: pixels_per_meter(scan_dpi, ratio),
            fallback: false,
        }
    }

    /// Substituted default when no scale text was recognized.
    pub fn fallback(scan_dpi: f64) -> Self {
        Self {
            fallback: true,
            ..Self::detected(FALLBACK_RATIO, scan_dpi)
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Legend segmentation
//!
//! Locates the legend block with a configured corner heuristic and
//! grid-samples its left half for pattern swatches. Legend layouts put
//! the pattern chip on the left and its description text on the right,
//! which is why only the left half is probed.

use crate::image_ops::{crop, ink_ratio};
use image::RgbaImage;
use takeoff_core::{LegendConfig, LegendCorner, Rect};

/// One candidate pattern swatch with its legend-local position
#[derive(Debug, Clone)]
pub struct Swatch {
    pub image: RgbaImage,
    pub x: u32,
    pub y: u32,
}

/// Crop the legend region out of the plan per the configured corner
/// heuristic. Returns the crop and its bounds on the full plan.
pub fn locate_legend(plan: &RgbaImage, config: &LegendConfig) -> (RgbaImage, Rect) {
    let width = (config.width_ratio * plan.width() as f64) as u32;
    let height = (config.height_ratio * plan.height() as f64) as u32;

    let x = match config.corner {
        LegendCorner::TopLeft | LegendCorner::BottomLeft => config.margin,
        LegendCorner::TopRight | LegendCorner::BottomRight => {
            plan.width().saturating_sub(width + config.margin)
        }
    };
    let y = match config.corner {
        LegendCorner::TopLeft | LegendCorner::TopRight => config.margin,
        LegendCorner::BottomLeft | LegendCorner::BottomRight => {
            plan.height().saturating_sub(height + config.margin)
        }
    };

    let legend = crop(plan, x, y, width, height);
    let rect = Rect::new(x, y, legend.width(), legend.height());
    (legend, rect)
}

/// Grid-scan the left half of the legend for pattern swatches.
///
/// A grid cell is accepted when more than `min_ink_ratio` of a probe at
/// that cell is non-white; the cursor then advances by the sample size
/// so the same swatch is not sampled twice.
pub fn extract_swatches(legend: &RgbaImage, config: &LegendConfig) -> Vec<Swatch> {
    let mut swatches = Vec::new();
    if legend.width() == 0 || legend.height() == 0 {
        return swatches;
    }
    let half_width = legend.width() / 2;

    let mut y = 0u32;
    while y + config.probe_size <= legend.height() {
        let mut accepted_in_row = false;
        let mut x = 0u32;
        while x < half_width.max(1) {
            let ratio = ink_ratio(legend, x, y, config.probe_size, config.white_luminance);
            if ratio > config.min_ink_ratio {
                swatches.push(Swatch {
                    image: crop(legend, x, y, config.sample_size, config.sample_size),
                    x,
                    y,
                });
                accepted_in_row = true;
                x += config.sample_size;
            } else {
                x += config.grid_spacing;
            }
        }
        y += if accepted_in_row {
            config.sample_size
        } else {
            config.grid_spacing
        };
    }

    tracing::debug!(count = swatches.len(), "legend swatches extracted");
    swatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::filled;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([40, 40, 40, 255]);

    fn legend_with_chips(rows: &[u32]) -> RgbaImage {
        let mut img = filled(200, 400, WHITE);
        for &top in rows {
            for y in top..(top + 30).min(400) {
                for x in 0..40 {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
        img
    }

    fn test_config() -> LegendConfig {
        LegendConfig {
            grid_spacing: 10,
            sample_size: 40,
            probe_size: 20,
            ..LegendConfig::default()
        }
    }

    #[test]
    fn test_locate_legend_corners() {
        let plan = filled(1000, 800, WHITE);
        let mut config = LegendConfig {
            margin: 20,
            width_ratio: 0.25,
            height_ratio: 0.4,
            ..LegendConfig::default()
        };

        config.corner = LegendCorner::TopLeft;
        let (_, rect) = locate_legend(&plan, &config);
        assert_eq!((rect.x, rect.y), (20, 20));
        assert_eq!((rect.width, rect.height), (250, 320));

        config.corner = LegendCorner::BottomRight;
        let (_, rect) = locate_legend(&plan, &config);
        assert_eq!((rect.x, rect.y), (1000 - 250 - 20, 800 - 320 - 20));
    }

    #[test]
    fn test_extracts_one_swatch_per_chip() {
        let legend = legend_with_chips(&[20, 120, 240]);
        let swatches = extract_swatches(&legend, &test_config());
        assert_eq!(swatches.len(), 3);
        // Ordered top to bottom
        assert!(swatches[0].y < swatches[1].y);
        assert!(swatches[1].y < swatches[2].y);
    }

    #[test]
    fn test_blank_legend_yields_no_swatches() {
        let legend = filled(200, 400, WHITE);
        assert!(extract_swatches(&legend, &test_config()).is_empty());
    }

    #[test]
    fn test_cursor_advance_does_not_resample() {
        // One chip only; the cursor must jump past it instead of
        // producing a second overlapping swatch
        let legend = legend_with_chips(&[20]);
        let swatches = extract_swatches(&legend, &test_config());
        assert_eq!(swatches.len(), 1);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context validation of candidate matches
//!
//! Similarity alone accepts too much: a stray text block can share a
//! hatch's histogram. Candidates must additionally look like their
//! category. Size bounds apply to every category; walls must keep a
//! consistent thickness along their run, openings must show edge-like
//! structure on at least three sides. Categories without a specialized
//! check pass on size alone.

use crate::image_ops::to_grayscale;
use image::RgbaImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use takeoff_core::{ContextConfig, ElementCategory, SizeBounds};

const INK_LUMINANCE: f64 = 240.0;

fn bounds_for(category: ElementCategory, config: &ContextConfig) -> SizeBounds {
    match category {
        ElementCategory::Wall => config.wall_bounds,
        ElementCategory::Opening => config.opening_bounds,
        ElementCategory::Reference => config.reference_bounds,
        ElementCategory::Unknown => config.unknown_bounds,
    }
}

/// Validate a candidate match region for its element category.
pub fn is_valid(region: &RgbaImage, category: ElementCategory, config: &ContextConfig) -> bool {
    let bounds = bounds_for(category, config);
    if !bounds.contains(region.width()) || !bounds.contains(region.height()) {
        return false;
    }
    match category {
        ElementCategory::Wall => wall_thickness_consistent(region, config),
        ElementCategory::Opening => opening_has_edges(region, config),
        ElementCategory::Reference | ElementCategory::Unknown => true,
    }
}

/// Walls keep a near-constant thickness along their run. The run axis
/// is taken as the longer region axis; thickness is the ink extent
/// perpendicular to it, measured at every position with any ink.
fn wall_thickness_consistent(region: &RgbaImage, config: &ContextConfig) -> bool {
    let gray = to_grayscale(region);
    let width = gray.width();
    let height = gray.height();

    let along_x = width >= height;
    let run_length = if along_x { width } else { height };
    let depth = if along_x { height } else { width };

    let mut thicknesses = Vec::new();
    for i in 0..run_length {
        let mut ink = 0u32;
        for j in 0..depth {
            let (x, y) = if along_x { (i, j) } else { (j, i) };
            if (gray.get_pixel(x, y).0[0] as f64) < INK_LUMINANCE {
                ink += 1;
            }
        }
        if ink > 0 {
            thicknesses.push(ink);
        }
    }

    if thicknesses.len() < 3 {
        return false;
    }

    let min = thicknesses.iter().copied().min().unwrap_or(0) as f64;
    let max = thicknesses.iter().copied().max().unwrap_or(0) as f64;
    let mean = thicknesses.iter().map(|&t| t as f64).sum::<f64>() / thicknesses.len() as f64;
    (max - min) / mean < config.max_thickness_variation
}

/// Openings (door/window symbols) show frame edges on most sides.
fn opening_has_edges(region: &RgbaImage, config: &ContextConfig) -> bool {
    let gray = to_grayscale(region);
    let width = gray.width();
    let height = gray.height();
    if width < 4 || height < 4 {
        return false;
    }

    let gx = horizontal_sobel(&gray);
    let gy = vertical_sobel(&gray);
    let magnitude = |x: u32, y: u32| -> f64 {
        let dx = gx.get_pixel(x, y).0[0] as f64;
        let dy = gy.get_pixel(x, y).0[0] as f64;
        (dx * dx + dy * dy).sqrt()
    };

    let band_x = (width / 10).max(2);
    let band_y = (height / 10).max(2);

    let mean_over = |x0: u32, y0: u32, x1: u32, y1: u32| -> f64 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for y in y0..y1 {
            for x in x0..x1 {
                sum += magnitude(x, y);
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    };

    let sides = [
        mean_over(0, 0, width, band_y),                   // top
        mean_over(0, height - band_y, width, height),     // bottom
        mean_over(0, 0, band_x, height),                  // left
        mean_over(width - band_x, 0, width, height),      // right
    ];

    let edge_like = sides
        .iter()
        .filter(|&&m| m > config.edge_strength_threshold)
        .count() as u32;
    edge_like >= config.min_edge_sides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::filled;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn frame(size: u32, thickness: u32) -> RgbaImage {
        let mut img = filled(size, size, WHITE);
        for y in 0..size {
            for x in 0..size {
                let near_border = x < thickness
                    || y < thickness
                    || x >= size - thickness
                    || y >= size - thickness;
                if near_border {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
        img
    }

    #[test]
    fn test_size_bounds_reject_all_categories() {
        let config = ContextConfig::default();
        // 600 px exceeds every category's max
        let huge = filled(600, 600, BLACK);
        for category in [
            ElementCategory::Wall,
            ElementCategory::Opening,
            ElementCategory::Reference,
            ElementCategory::Unknown,
        ] {
            assert!(!is_valid(&huge, category, &config));
        }
        // 2 px falls below every category's min
        let tiny = filled(2, 2, BLACK);
        for category in [
            ElementCategory::Wall,
            ElementCategory::Opening,
            ElementCategory::Reference,
            ElementCategory::Unknown,
        ] {
            assert!(!is_valid(&tiny, category, &config));
        }
    }

    #[test]
    fn test_solid_wall_passes() {
        let config = ContextConfig::default();
        let wall = filled(60, 60, BLACK);
        assert!(is_valid(&wall, ElementCategory::Wall, &config));
    }

    #[test]
    fn test_tapering_wall_rejected() {
        let config = ContextConfig::default();
        // Triangle-ish run: thickness grows along x
        let mut img = filled(100, 60, WHITE);
        for x in 0..100u32 {
            let thickness = 10 + x / 3;
            for y in 0..thickness.min(60) {
                img.put_pixel(x, y, BLACK);
            }
        }
        assert!(!is_valid(&img, ElementCategory::Wall, &config));
    }

    #[test]
    fn test_framed_opening_passes() {
        let config = ContextConfig::default();
        assert!(is_valid(&frame(60, 4), ElementCategory::Opening, &config));
    }

    #[test]
    fn test_unframed_opening_rejected() {
        let config = ContextConfig::default();
        // Solid fill: no frame edges inside the region
        let solid = filled(60, 60, BLACK);
        assert!(!is_valid(&solid, ElementCategory::Opening, &config));
    }

    #[test]
    fn test_reference_passes_on_size_alone() {
        let config = ContextConfig::default();
        let symbol = filled(30, 30, BLACK);
        assert!(is_valid(&symbol, ElementCategory::Reference, &config));
    }
}

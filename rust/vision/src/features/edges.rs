// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge statistics: density, dominant orientation, straightness,
//! continuity

use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use takeoff_core::features::EdgeFeatures;

// Sobel magnitude above which a pixel counts as an edge
const MAGNITUDE_THRESHOLD: f64 = 120.0;

// Orientation histogram resolution over [0, π)
const ORIENTATION_BINS: usize = 18;

// Angular tolerance for the straightness count
const ALIGNMENT_TOLERANCE: f64 = std::f64::consts::PI / 12.0;

fn fold(angle: f64) -> f64 {
    let folded = angle.rem_euclid(std::f64::consts::PI);
    if folded >= std::f64::consts::PI {
        0.0
    } else {
        folded
    }
}

fn angular_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs();
    if diff > std::f64::consts::FRAC_PI_2 {
        diff = std::f64::consts::PI - diff;
    }
    diff
}

/// Compute edge statistics for a grayscale region.
pub fn extract(gray: &GrayImage) -> EdgeFeatures {
    let width = gray.width();
    let height = gray.height();
    if width < 3 || height < 3 {
        return EdgeFeatures::default();
    }

    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let mut edge_mask = vec![false; (width * height) as usize];
    let mut orientations = Vec::new();
    let mut histogram = [0u32; ORIENTATION_BINS];

    for y in 0..height {
        for x in 0..width {
            let dx = gx.get_pixel(x, y).0[0] as f64;
            let dy = gy.get_pixel(x, y).0[0] as f64;
            let magnitude = (dx * dx + dy * dy).sqrt();
            if magnitude > MAGNITUDE_THRESHOLD {
                edge_mask[(y * width + x) as usize] = true;
                let angle = fold(dy.atan2(dx));
                orientations.push(angle);
                let bin = ((angle / std::f64::consts::PI) * ORIENTATION_BINS as f64) as usize;
                histogram[bin.min(ORIENTATION_BINS - 1)] += 1;
            }
        }
    }

    let total = (width * height) as f64;
    let edge_count = orientations.len();
    let density = edge_count as f64 / total;

    if edge_count == 0 {
        return EdgeFeatures {
            density,
            ..EdgeFeatures::default()
        };
    }

    let dominant_bin = histogram
        .iter()
        .enumerate()
        .max_by_key(|(_, &count)| count)
        .map(|(bin, _)| bin)
        .unwrap_or(0);
    let dominant_orientation =
        (dominant_bin as f64 + 0.5) * std::f64::consts::PI / ORIENTATION_BINS as f64;

    let aligned = orientations
        .iter()
        .filter(|&&a| angular_difference(a, dominant_orientation) <= ALIGNMENT_TOLERANCE)
        .count();
    let straightness = aligned as f64 / edge_count as f64;

    // Continuity: edge pixels with at least two edge neighbors
    let mut continuous = 0usize;
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if !edge_mask[(y as u32 * width + x as u32) as usize] {
                continue;
            }
            let mut neighbors = 0;
            for dy in -1..=1i32 {
                for dx in -1..=1i32 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx >= 0
                        && ny >= 0
                        && nx < width as i32
                        && ny < height as i32
                        && edge_mask[(ny as u32 * width + nx as u32) as usize]
                    {
                        neighbors += 1;
                    }
                }
            }
            if neighbors >= 2 {
                continuous += 1;
            }
        }
    }
    let continuity = continuous as f64 / edge_count as f64;

    EdgeFeatures {
        density,
        dominant_orientation,
        straightness,
        continuity,
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gray-level co-occurrence statistics
//!
//! Intensities are quantized to 32 levels; co-occurrence matrices are
//! accumulated for distances {1, 2} at 0° and 90°, then reduced to the
//! four standard Haralick-style statistics.

use image::GrayImage;
use takeoff_core::features::{GlcmFeatures, GlcmStat};

/// Quantization levels for the co-occurrence matrix
pub const LEVELS: usize = 32;

/// Pair offsets evaluated per distance
pub const DISTANCES: [u32; 2] = [1, 2];

/// Offset angles in degrees (0° = along x, 90° = along y)
pub const ANGLES_DEG: [u32; 2] = [0, 90];

fn quantize(value: u8) -> usize {
    value as usize * LEVELS / 256
}

fn stats_for_offset(gray: &GrayImage, dx: u32, dy: u32) -> (f64, f64, f64, f64) {
    let width = gray.width();
    let height = gray.height();

    let mut matrix = vec![0u64; LEVELS * LEVELS];
    let mut total = 0u64;

    for y in 0..height.saturating_sub(dy) {
        for x in 0..width.saturating_sub(dx) {
            let a = quantize(gray.get_pixel(x, y).0[0]);
            let b = quantize(gray.get_pixel(x + dx, y + dy).0[0]);
            matrix[a * LEVELS + b] += 1;
            total += 1;
        }
    }

    if total == 0 {
        return (0.0, 0.0, 0.0, 0.0);
    }

    let mut contrast = 0.0;
    let mut homogeneity = 0.0;
    let mut energy = 0.0;
    let mut mean_i = 0.0;
    let mut mean_j = 0.0;

    for i in 0..LEVELS {
        for j in 0..LEVELS {
            let p = matrix[i * LEVELS + j] as f64 / total as f64;
            if p == 0.0 {
                continue;
            }
            let diff = i as f64 - j as f64;
            contrast += p * diff * diff;
            homogeneity += p / (1.0 + diff * diff);
            energy += p * p;
            mean_i += i as f64 * p;
            mean_j += j as f64 * p;
        }
    }

    let mut var_i = 0.0;
    let mut var_j = 0.0;
    let mut covariance = 0.0;
    for i in 0..LEVELS {
        for j in 0..LEVELS {
            let p = matrix[i * LEVELS + j] as f64 / total as f64;
            if p == 0.0 {
                continue;
            }
            let di = i as f64 - mean_i;
            let dj = j as f64 - mean_j;
            var_i += p * di * di;
            var_j += p * dj * dj;
            covariance += p * di * dj;
        }
    }

    // Constant-intensity region: define full correlation
    let correlation = if var_i < 1e-12 || var_j < 1e-12 {
        1.0
    } else {
        covariance / (var_i.sqrt() * var_j.sqrt())
    };

    (contrast, homogeneity, energy, correlation)
}

/// Compute co-occurrence statistics over the fixed offset set.
pub fn extract(gray: &GrayImage) -> GlcmFeatures {
    let mut stats = Vec::with_capacity(DISTANCES.len() * ANGLES_DEG.len());
    for &distance in &DISTANCES {
        for &angle_deg in &ANGLES_DEG {
            let (dx, dy) = match angle_deg {
                0 => (distance, 0),
                _ => (0, distance),
            };
            let (contrast, homogeneity, energy, correlation) = stats_for_offset(gray, dx, dy);
            stats.push(GlcmStat {
                distance,
                angle_deg,
                contrast,
                homogeneity,
                energy,
                correlation,
            });
        }
    }
    GlcmFeatures { stats }
}

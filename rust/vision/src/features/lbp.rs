// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local binary patterns (radius 1, 8 neighbors)

use image::GrayImage;
use takeoff_core::features::{LbpFeatures, LBP_BINS};

// Neighbor offsets, clockwise from the top-left; bit i of the code
// corresponds to offset i
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Compute the normalized LBP code histogram with derived uniformity
/// and entropy.
pub fn extract(gray: &GrayImage) -> LbpFeatures {
    let width = gray.width() as i32;
    let height = gray.height() as i32;

    let mut counts = [0u64; LBP_BINS];
    let mut total = 0u64;

    for y in 1..(height - 1) {
        for x in 1..(width - 1) {
            let center = gray.get_pixel(x as u32, y as u32).0[0];
            let mut code = 0u8;
            for (bit, (dx, dy)) in NEIGHBORS.iter().enumerate() {
                let neighbor = gray.get_pixel((x + dx) as u32, (y + dy) as u32).0[0];
                if neighbor >= center {
                    code |= 1 << bit;
                }
            }
            counts[code as usize] += 1;
            total += 1;
        }
    }

    let mut histogram = vec![0.0; LBP_BINS];
    if total > 0 {
        for (bin, &count) in counts.iter().enumerate() {
            histogram[bin] = count as f64 / total as f64;
        }
    }

    let uniformity = histogram.iter().map(|p| p * p).sum();
    let entropy = -histogram
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>();

    LbpFeatures {
        histogram,
        uniformity,
        entropy,
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-channel color histograms (R, G, B and BT.601 gray)

use crate::image_ops::luminance;
use image::RgbaImage;
use takeoff_core::features::{ColorFeatures, COLOR_BINS};

fn bin(value: u8) -> usize {
    value as usize * COLOR_BINS / 256
}

/// Compute normalized 32-bin histograms for each channel.
pub fn extract(region: &RgbaImage) -> ColorFeatures {
    let mut features = ColorFeatures::default();
    let total = (region.width() as u64 * region.height() as u64) as f64;
    if total == 0.0 {
        return features;
    }

    for pixel in region.pixels() {
        features.red[bin(pixel.0[0])] += 1.0;
        features.green[bin(pixel.0[1])] += 1.0;
        features.blue[bin(pixel.0[2])] += 1.0;
        features.gray[bin(luminance(pixel) as u8)] += 1.0;
    }

    for histogram in [
        &mut features.red,
        &mut features.green,
        &mut features.blue,
        &mut features.gray,
    ] {
        for value in histogram.iter_mut() {
            *value /= total;
        }
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::filled;
    use image::Rgba;

    #[test]
    fn test_solid_color_concentrates_one_bin() {
        let img = filled(10, 10, Rgba([255, 0, 0, 255]));
        let features = extract(&img);
        assert!((features.red[31] - 1.0).abs() < 1e-9);
        assert!((features.green[0] - 1.0).abs() < 1e-9);
        assert!((features.blue[0] - 1.0).abs() < 1e-9);
        // Red luma = 76 -> bin 9
        assert!((features.gray[9] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_histograms_normalized() {
        let mut img = filled(16, 16, Rgba([255, 255, 255, 255]));
        for y in 0..8 {
            for x in 0..16 {
                img.put_pixel(x, y, Rgba([10, 120, 240, 255]));
            }
        }
        let features = extract(&img);
        for histogram in [&features.red, &features.green, &features.blue, &features.gray] {
            let sum: f64 = histogram.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert!((features.red[bin(10)] - 0.5).abs() < 1e-9);
    }
}

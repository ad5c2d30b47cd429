// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodicity detection via profile autocorrelation
//!
//! Hatch fills repeat with a fixed period; solid fills and line symbols
//! do not. Intensity profiles are taken along each axis (and the main
//! diagonal), mean-centered, and autocorrelated; the first local
//! maximum above the peak threshold gives the period estimate.

use image::GrayImage;
use takeoff_core::features::RepetitionFeatures;

// Normalized autocorrelation a lag must reach to count as a peak
const PEAK_THRESHOLD: f64 = 0.5;

const MIN_PROFILE_LEN: usize = 8;

/// First prominent autocorrelation peak of a profile: (lag, strength).
fn first_peak(profile: &[f64]) -> Option<(f64, f64)> {
    let n = profile.len();
    if n < MIN_PROFILE_LEN {
        return None;
    }

    let mean = profile.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = profile.iter().map(|v| v - mean).collect();
    let variance = centered.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if variance < 1e-9 {
        // Flat profile: nothing repeats
        return None;
    }

    let max_lag = n / 2;
    let mut correlations = Vec::with_capacity(max_lag);
    for lag in 0..max_lag {
        let mut sum = 0.0;
        for i in 0..(n - lag) {
            sum += centered[i] * centered[i + lag];
        }
        correlations.push(sum / ((n - lag) as f64 * variance));
    }

    // Skip lag 0 and 1; look for the first local maximum above threshold
    for lag in 2..max_lag.saturating_sub(1) {
        let value = correlations[lag];
        if value >= PEAK_THRESHOLD
            && value >= correlations[lag - 1]
            && value >= correlations[lag + 1]
        {
            return Some((lag as f64, value.min(1.0)));
        }
    }
    None
}

fn column_means(gray: &GrayImage) -> Vec<f64> {
    let width = gray.width();
    let height = gray.height();
    (0..width)
        .map(|x| {
            (0..height).map(|y| gray.get_pixel(x, y).0[0] as f64).sum::<f64>() / height as f64
        })
        .collect()
}

fn row_means(gray: &GrayImage) -> Vec<f64> {
    let width = gray.width();
    let height = gray.height();
    (0..height)
        .map(|y| {
            (0..width).map(|x| gray.get_pixel(x, y).0[0] as f64).sum::<f64>() / width as f64
        })
        .collect()
}

fn diagonal_profile(gray: &GrayImage) -> Vec<f64> {
    let n = gray.width().min(gray.height());
    (0..n).map(|k| gray.get_pixel(k, k).0[0] as f64).collect()
}

/// Estimate per-axis repetition periods and a regularity score.
pub fn extract(gray: &GrayImage) -> RepetitionFeatures {
    if gray.width() == 0 || gray.height() == 0 {
        return RepetitionFeatures::default();
    }

    let horizontal = first_peak(&column_means(gray));
    let vertical = first_peak(&row_means(gray));
    let diagonal = first_peak(&diagonal_profile(gray));

    let strengths: Vec<f64> = [horizontal, vertical, diagonal]
        .iter()
        .flatten()
        .map(|(_, strength)| *strength)
        .collect();

    let regularity = if strengths.is_empty() {
        0.0
    } else {
        strengths.iter().sum::<f64>() / strengths.len() as f64
    };

    RepetitionFeatures {
        horizontal_period: horizontal.map(|(lag, _)| lag),
        vertical_period: vertical.map(|(lag, _)| lag),
        diagonal_period: diagonal.map(|(lag, _)| lag),
        regularity,
        has_repetition: !strengths.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn striped(size: u32, period: u32, vertical_stripes: bool) -> GrayImage {
        let mut img = GrayImage::new(size, size);
        for (x, y, p) in img.enumerate_pixels_mut() {
            let along = if vertical_stripes { x } else { y };
            *p = Luma([if along % period < period / 2 { 0 } else { 255 }]);
        }
        img
    }

    #[test]
    fn test_solid_fill_has_no_repetition() {
        let mut img = GrayImage::new(40, 40);
        for p in img.pixels_mut() {
            *p = Luma([0]);
        }
        let features = extract(&img);
        assert!(!features.has_repetition);
        assert!(features.regularity.abs() < 1e-9);
    }

    #[test]
    fn test_vertical_stripes_have_horizontal_period() {
        let features = extract(&striped(64, 8, true));
        assert!(features.has_repetition);
        let period = features.horizontal_period.expect("expected horizontal period");
        assert!((period - 8.0).abs() <= 1.0);
        // Stripes are constant along y
        assert!(features.vertical_period.is_none());
    }

    #[test]
    fn test_horizontal_stripes_have_vertical_period() {
        let features = extract(&striped(64, 16, false));
        let period = features.vertical_period.expect("expected vertical period");
        assert!((period - 16.0).abs() <= 1.0);
    }
}

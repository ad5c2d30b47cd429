// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature descriptor value types and similarity metrics
//!
//! A [`FeatureDescriptor`] is the composite texture signature extracted
//! from a raster region. Descriptors are pure values: extraction is
//! deterministic and nothing mutates them afterwards, because one legend
//! descriptor is compared against thousands of window descriptors.
//!
//! Similarity metrics: histogram intersection for the histogram-shaped
//! parts (LBP, color), normalized scalar closeness for statistic-shaped
//! parts (Gabor, GLCM, edges) and an agreement score for periodicity.
//! All metrics are bounded to [0, 1]; the weighted combination uses
//! [`SimilarityWeights`], which must sum to 1.0.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-9;

/// Number of bins in LBP histograms (one per 8-bit code)
pub const LBP_BINS: usize = 256;

/// Number of bins per color channel histogram
pub const COLOR_BINS: usize = 32;

/// Filter response statistics for one (orientation, frequency) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GaborResponse {
    /// Filter orientation in degrees (0, 45, 90, 135)
    pub orientation_deg: f64,
    /// Spatial frequency in cycles per pixel
    pub frequency: f64,
    pub mean: f64,
    pub variance: f64,
    pub energy: f64,
}

/// Oriented-texture energy over the fixed filter bank
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GaborFeatures {
    pub responses: Vec<GaborResponse>,
}

/// Local binary pattern histogram with derived statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LbpFeatures {
    /// Normalized 256-bin code histogram
    pub histogram: Vec<f64>,
    /// Sum of squared bin probabilities
    pub uniformity: f64,
    /// Shannon entropy over non-zero bins, in bits
    pub entropy: f64,
}

impl Default for LbpFeatures {
    fn default() -> Self {
        Self {
            histogram: vec![0.0; LBP_BINS],
            uniformity: 0.0,
            entropy: 0.0,
        }
    }
}

/// Co-occurrence statistics for one (distance, angle) offset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlcmStat {
    pub distance: u32,
    pub angle_deg: u32,
    pub contrast: f64,
    pub homogeneity: f64,
    pub energy: f64,
    pub correlation: f64,
}

/// Gray-level co-occurrence statistics over the fixed offset set
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlcmFeatures {
    pub stats: Vec<GlcmStat>,
}

/// Normalized 32-bin histograms per channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorFeatures {
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
    pub gray: Vec<f64>,
}

impl Default for ColorFeatures {
    fn default() -> Self {
        Self {
            red: vec![0.0; COLOR_BINS],
            green: vec![0.0; COLOR_BINS],
            blue: vec![0.0; COLOR_BINS],
            gray: vec![0.0; COLOR_BINS],
        }
    }
}

/// Edge structure statistics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct EdgeFeatures {
    /// Fraction of pixels with significant gradient magnitude
    pub density: f64,
    /// Dominant gradient orientation in radians, folded to [0, π)
    pub dominant_orientation: f64,
    /// Fraction of edge pixels aligned with the dominant orientation
    pub straightness: f64,
    /// Fraction of edge pixels with at least two edge neighbors
    pub continuity: f64,
}

/// Autocorrelation-based periodicity estimates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RepetitionFeatures {
    pub horizontal_period: Option<f64>,
    pub vertical_period: Option<f64>,
    pub diagonal_period: Option<f64>,
    /// Mean autocorrelation peak strength in [0, 1]
    pub regularity: f64,
    pub has_repetition: bool,
}

/// Composite texture signature of a raster region
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureDescriptor {
    pub gabor: GaborFeatures,
    pub lbp: LbpFeatures,
    pub glcm: GlcmFeatures,
    pub color: ColorFeatures,
    pub edges: EdgeFeatures,
    pub repetition: RepetitionFeatures,
}

/// Weights for the overall similarity combination
///
/// `texture` covers the averaged Gabor/LBP/GLCM similarity, `color` the
/// channel histograms, `context` the averaged edge and repetition
/// similarity. They must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimilarityWeights {
    pub texture: f64,
    pub color: f64,
    pub context: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            texture: 0.5,
            color: 0.2,
            context: 0.3,
        }
    }
}

impl SimilarityWeights {
    pub fn validate(&self) -> Result<()> {
        let sum = self.texture + self.color + self.context;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::InvalidWeights(format!(
                "texture + color + context must equal 1.0, got {sum}"
            )));
        }
        if self.texture < 0.0 || self.color < 0.0 || self.context < 0.0 {
            return Err(Error::InvalidWeights("weights must be non-negative".into()));
        }
        Ok(())
    }
}

/// Intersection of two normalized histograms, in [0, 1].
pub fn histogram_intersection(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x.min(*y)).sum::<f64>().clamp(0.0, 1.0)
}

/// Relative closeness of two non-negative statistics, in [0, 1].
/// Equal values (including both zero) score 1.0.
pub fn scalar_closeness(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs() / (a.abs() + b.abs() + EPS)).clamp(0.0, 1.0)
}

/// Closeness of two undirected orientations (radians), in [0, 1].
pub fn angular_closeness(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs() % std::f64::consts::PI;
    if diff > std::f64::consts::FRAC_PI_2 {
        diff = std::f64::consts::PI - diff;
    }
    1.0 - diff / std::f64::consts::FRAC_PI_2
}

/// Similarity of two Gabor banks extracted with the same filter set.
pub fn gabor_similarity(a: &GaborFeatures, b: &GaborFeatures) -> f64 {
    if a.responses.len() != b.responses.len() {
        return 0.0;
    }
    if a.responses.is_empty() {
        return 1.0;
    }
    let sum: f64 = a
        .responses
        .iter()
        .zip(&b.responses)
        .map(|(x, y)| {
            (scalar_closeness(x.mean, y.mean)
                + scalar_closeness(x.variance, y.variance)
                + scalar_closeness(x.energy, y.energy))
                / 3.0
        })
        .sum();
    sum / a.responses.len() as f64
}

/// LBP similarity: intersection of the code histograms.
pub fn lbp_similarity(a: &LbpFeatures, b: &LbpFeatures) -> f64 {
    histogram_intersection(&a.histogram, &b.histogram)
}

/// GLCM similarity: averaged statistic closeness over the offset set.
pub fn glcm_similarity(a: &GlcmFeatures, b: &GlcmFeatures) -> f64 {
    if a.stats.len() != b.stats.len() {
        return 0.0;
    }
    if a.stats.is_empty() {
        return 1.0;
    }
    let sum: f64 = a
        .stats
        .iter()
        .zip(&b.stats)
        .map(|(x, y)| {
            (scalar_closeness(x.contrast, y.contrast)
                + scalar_closeness(x.homogeneity, y.homogeneity)
                + scalar_closeness(x.energy, y.energy)
                + scalar_closeness(x.correlation.abs(), y.correlation.abs()))
                / 4.0
        })
        .sum();
    sum / a.stats.len() as f64
}

/// Color similarity: mean histogram intersection over the four channels.
pub fn color_similarity(a: &ColorFeatures, b: &ColorFeatures) -> f64 {
    (histogram_intersection(&a.red, &b.red)
        + histogram_intersection(&a.green, &b.green)
        + histogram_intersection(&a.blue, &b.blue)
        + histogram_intersection(&a.gray, &b.gray))
        / 4.0
}

/// Edge similarity: statistic closeness plus orientation agreement.
pub fn edge_similarity(a: &EdgeFeatures, b: &EdgeFeatures) -> f64 {
    (scalar_closeness(a.density, b.density)
        + angular_closeness(a.dominant_orientation, b.dominant_orientation)
        + scalar_closeness(a.straightness, b.straightness)
        + scalar_closeness(a.continuity, b.continuity))
        / 4.0
}

/// Repetition agreement score.
///
/// Two non-periodic regions agree fully; a periodic and a non-periodic
/// region mostly disagree; two periodic regions compare their shared
/// period axes and regularity.
pub fn repetition_similarity(a: &RepetitionFeatures, b: &RepetitionFeatures) -> f64 {
    match (a.has_repetition, b.has_repetition) {
        (false, false) => 1.0,
        (true, false) | (false, true) => 0.3,
        (true, true) => {
            let mut terms = vec![scalar_closeness(a.regularity, b.regularity)];
            for (pa, pb) in [
                (a.horizontal_period, b.horizontal_period),
                (a.vertical_period, b.vertical_period),
                (a.diagonal_period, b.diagonal_period),
            ] {
                if let (Some(pa), Some(pb)) = (pa, pb) {
                    terms.push(scalar_closeness(pa, pb));
                }
            }
            terms.iter().sum::<f64>() / terms.len() as f64
        }
    }
}

/// Weighted overall similarity of two descriptors, in [0, 1].
pub fn descriptor_similarity(
    a: &FeatureDescriptor,
    b: &FeatureDescriptor,
    weights: &SimilarityWeights,
) -> f64 {
    let texture = (gabor_similarity(&a.gabor, &b.gabor)
        + lbp_similarity(&a.lbp, &b.lbp)
        + glcm_similarity(&a.glcm, &b.glcm))
        / 3.0;
    let color = color_similarity(&a.color, &b.color);
    let context = (edge_similarity(&a.edges, &b.edges)
        + repetition_similarity(&a.repetition, &b.repetition))
        / 2.0;

    (weights.texture * texture + weights.color * color + weights.context * context).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_descriptor() -> FeatureDescriptor {
        let mut lbp = LbpFeatures::default();
        lbp.histogram[0] = 0.5;
        lbp.histogram[255] = 0.5;
        lbp.uniformity = 0.5;
        lbp.entropy = 1.0;

        let mut color = ColorFeatures::default();
        color.red[0] = 1.0;
        color.green[0] = 1.0;
        color.blue[0] = 1.0;
        color.gray[0] = 1.0;

        FeatureDescriptor {
            gabor: GaborFeatures {
                responses: vec![GaborResponse {
                    orientation_deg: 0.0,
                    frequency: 0.1,
                    mean: 0.2,
                    variance: 0.05,
                    energy: 0.1,
                }],
            },
            lbp,
            glcm: GlcmFeatures {
                stats: vec![GlcmStat {
                    distance: 1,
                    angle_deg: 0,
                    contrast: 12.0,
                    homogeneity: 0.4,
                    energy: 0.2,
                    correlation: 0.8,
                }],
            },
            color,
            edges: EdgeFeatures {
                density: 0.3,
                dominant_orientation: 0.0,
                straightness: 0.9,
                continuity: 0.7,
            },
            repetition: RepetitionFeatures {
                horizontal_period: Some(8.0),
                vertical_period: None,
                diagonal_period: None,
                regularity: 0.6,
                has_repetition: true,
            },
        }
    }

    #[test]
    fn test_identical_descriptors_score_one() {
        let d = sample_descriptor();
        let weights = SimilarityWeights::default();
        assert_relative_eq!(descriptor_similarity(&d, &d, &weights), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_histogram_intersection_bounds() {
        let a = vec![0.5, 0.5];
        let b = vec![0.5, 0.5];
        assert_relative_eq!(histogram_intersection(&a, &b), 1.0, epsilon = 1e-9);

        let disjoint = vec![1.0, 0.0];
        let other = vec![0.0, 1.0];
        assert_relative_eq!(histogram_intersection(&disjoint, &other), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scalar_closeness_zero_pair() {
        assert_relative_eq!(scalar_closeness(0.0, 0.0), 1.0, epsilon = 1e-6);
        assert!(scalar_closeness(1.0, 0.0) < 1e-6);
    }

    #[test]
    fn test_angular_closeness_wraps() {
        // 0 and π describe the same undirected orientation
        assert_relative_eq!(
            angular_closeness(0.0, std::f64::consts::PI),
            1.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            angular_closeness(0.0, std::f64::consts::FRAC_PI_2),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_repetition_agreement() {
        let none = RepetitionFeatures::default();
        let periodic = sample_descriptor().repetition;
        assert_relative_eq!(repetition_similarity(&none, &none), 1.0, epsilon = 1e-9);
        assert_relative_eq!(repetition_similarity(&none, &periodic), 0.3, epsilon = 1e-9);
        assert_relative_eq!(
            repetition_similarity(&periodic, &periodic),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        assert!(SimilarityWeights::default().validate().is_ok());
        let bad = SimilarityWeights {
            texture: 0.5,
            color: 0.5,
            context: 0.3,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_mismatched_banks_score_zero() {
        let d = sample_descriptor();
        let empty = FeatureDescriptor::default();
        assert_eq!(gabor_similarity(&d.gabor, &empty.gabor), 0.0);
        assert_eq!(glcm_similarity(&d.glcm, &empty.glcm), 0.0);
    }
}

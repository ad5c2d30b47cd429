// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-part texture feature extraction
//!
//! `extract_features` computes the composite descriptor a region is
//! matched by: oriented-texture energy (Gabor bank), local binary
//! pattern histogram, gray-level co-occurrence statistics, per-channel
//! color histograms, edge statistics, and autocorrelation periodicity.
//!
//! Extraction is deterministic: identical input rasters produce
//! identical descriptors, a requirement since one legend descriptor is
//! compared against thousands of scan windows.

pub mod color;
pub mod edges;
pub mod gabor;
pub mod glcm;
pub mod lbp;
pub mod repetition;

use crate::image_ops::to_grayscale;
use image::RgbaImage;
use takeoff_core::FeatureDescriptor;

/// Minimum region side length the extractors can work with. Smaller
/// regions yield the default (empty-bank) descriptor, which never
/// matches anything.
pub const MIN_REGION_SIZE: u32 = 8;

/// Extract the full feature descriptor for a raster region.
pub fn extract_features(region: &RgbaImage) -> FeatureDescriptor {
    if region.width() < MIN_REGION_SIZE || region.height() < MIN_REGION_SIZE {
        return FeatureDescriptor::default();
    }
    let gray = to_grayscale(region);
    FeatureDescriptor {
        gabor: gabor::extract(&gray),
        lbp: lbp::extract(&gray),
        glcm: glcm::extract(&gray),
        color: color::extract(region),
        edges: edges::extract(&gray),
        repetition: repetition::extract(&gray),
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raster helpers shared by the pipeline stages

use image::{GrayImage, Luma, Rgba, RgbaImage};
use takeoff_core::{NamedRegion, Rect};

/// Luminance of one pixel using the ITU-R BT.601 weights
pub fn luminance(pixel: &Rgba<u8>) -> f64 {
    0.299 * pixel.0[0] as f64 + 0.587 * pixel.0[1] as f64 + 0.114 * pixel.0[2] as f64
}

/// Convert an RGBA raster to grayscale with the BT.601 weights
pub fn to_grayscale(image: &RgbaImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        gray.put_pixel(x, y, Luma([luminance(pixel) as u8]));
    }
    gray
}

/// Copy a sub-region, clamped to the image bounds.
///
/// Out-of-range coordinates yield an empty raster rather than a panic;
/// legend heuristics can request regions that fall off small plans.
pub fn crop(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    if x >= image.width() || y >= image.height() {
        return RgbaImage::new(0, 0);
    }
    let w = width.min(image.width() - x);
    let h = height.min(image.height() - y);
    image::imageops::crop_imm(image, x, y, w, h).to_image()
}

/// Crop a region given as fractions of the image dimensions.
pub fn crop_region(image: &RgbaImage, region: &NamedRegion) -> (RgbaImage, Rect) {
    let x = (region.x * image.width() as f64) as u32;
    let y = (region.y * image.height() as f64) as u32;
    let w = (region.width * image.width() as f64) as u32;
    let h = (region.height * image.height() as f64) as u32;
    let rect = Rect::new(
        x.min(image.width()),
        y.min(image.height()),
        w.min(image.width().saturating_sub(x)),
        h.min(image.height().saturating_sub(y)),
    );
    (crop(image, x, y, w, h), rect)
}

/// Fraction of pixels in a square probe whose luminance falls below
/// `white_luminance`. Probes reaching past the border are truncated.
pub fn ink_ratio(
    image: &RgbaImage,
    x: u32,
    y: u32,
    size: u32,
    white_luminance: f64,
) -> f64 {
    let x1 = (x + size).min(image.width());
    let y1 = (y + size).min(image.height());
    if x >= x1 || y >= y1 {
        return 0.0;
    }
    let mut dark = 0u32;
    let mut total = 0u32;
    for py in y..y1 {
        for px in x..x1 {
            if luminance(image.get_pixel(px, py)) < white_luminance {
                dark += 1;
            }
            total += 1;
        }
    }
    dark as f64 / total as f64
}

/// Bounding box of non-white content inside a raster, in local
/// coordinates. `None` when the region is blank.
pub fn content_box(image: &RgbaImage, white_luminance: f64) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;
    for (x, y, pixel) in image.enumerate_pixels() {
        if luminance(pixel) < white_luminance {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            found = true;
        }
    }
    if !found {
        return None;
    }
    Some(Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Solid-color raster, used by tests and the overlay panel
pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for pixel in img.pixels_mut() {
        *pixel = color;
    }
    img
}

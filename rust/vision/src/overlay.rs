// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Annotated overlay raster
//!
//! Renders the accepted matches back onto a copy of the plan for visual
//! review: one hollow box per match, colored by element category, plus
//! a small color-key strip of filled chips in the top-left corner.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as DrawRect;
use takeoff_core::{ElementCategory, ElementResult};

const WALL_COLOR: Rgba<u8> = Rgba([220, 40, 40, 255]);
const OPENING_COLOR: Rgba<u8> = Rgba([40, 80, 220, 255]);
const REFERENCE_COLOR: Rgba<u8> = Rgba([40, 160, 60, 255]);
const UNKNOWN_COLOR: Rgba<u8> = Rgba([120, 120, 120, 255]);

const KEY_CHIP: i32 = 12;
const KEY_MARGIN: i32 = 8;
const BOX_THICKNESS: u32 = 2;

fn category_color(category: ElementCategory) -> Rgba<u8> {
    match category {
        ElementCategory::Wall => WALL_COLOR,
        ElementCategory::Opening => OPENING_COLOR,
        ElementCategory::Reference => REFERENCE_COLOR,
        ElementCategory::Unknown => UNKNOWN_COLOR,
    }
}

/// Render all match boxes onto a copy of the plan.
pub fn render_overlay(plan: &RgbaImage, results: &[ElementResult]) -> RgbaImage {
    let mut canvas = plan.clone();

    for result in results {
        let color = category_color(result.category);
        for location in &result.locations {
            for inset in 0..BOX_THICKNESS {
                let width = location.width.saturating_sub(2 * inset);
                let height = location.height.saturating_sub(2 * inset);
                if width == 0 || height == 0 {
                    break;
                }
                draw_hollow_rect_mut(
                    &mut canvas,
                    DrawRect::at(
                        location.x as i32 + inset as i32,
                        location.y as i32 + inset as i32,
                    )
                    .of_size(width, height),
                    color,
                );
            }
        }
    }

    // Color key: one filled chip per category that produced matches.
    let mut row = 0;
    for category in [
        ElementCategory::Wall,
        ElementCategory::Opening,
        ElementCategory::Reference,
        ElementCategory::Unknown,
    ] {
        let present = results
            .iter()
            .any(|r| r.category == category && !r.locations.is_empty());
        if !present {
            continue;
        }
        draw_filled_rect_mut(
            &mut canvas,
            DrawRect::at(KEY_MARGIN, KEY_MARGIN + row * (KEY_CHIP + 6))
                .of_size(KEY_CHIP as u32, KEY_CHIP as u32),
            category_color(category),
        );
        row += 1;
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_ops::filled;
    use takeoff_core::{MeasurementType, PatternMatch};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn wall_result() -> ElementResult {
        ElementResult {
            element: "Wall".into(),
            category: ElementCategory::Wall,
            measurement_type: MeasurementType::Area,
            measurement: 1.0,
            unit: "m²".into(),
            match_count: 1,
            locations: vec![PatternMatch {
                x: 100,
                y: 100,
                width: 40,
                height: 40,
                confidence: 0.9,
                element_type: "Wall".into(),
            }],
            average_confidence: 0.9,
            code: None,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn test_overlay_draws_box_and_key() {
        let plan = filled(300, 300, WHITE);
        let canvas = render_overlay(&plan, &[wall_result()]);
        // box corner in wall color
        assert_eq!(*canvas.get_pixel(100, 100), WALL_COLOR);
        // interior untouched
        assert_eq!(*canvas.get_pixel(120, 120), WHITE);
        // key chip present
        assert_eq!(
            *canvas.get_pixel(KEY_MARGIN as u32 + 2, KEY_MARGIN as u32 + 2),
            WALL_COLOR
        );
    }

    #[test]
    fn test_overlay_without_matches_is_plan() {
        let plan = filled(100, 100, WHITE);
        let canvas = render_overlay(&plan, &[]);
        assert_eq!(canvas, plan);
    }
}

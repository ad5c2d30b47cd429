// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-plan pattern search
//!
//! The plan is split into overlapping tiles that are scanned in
//! parallel. Inside each tile a window slides at a fraction of the
//! sample size; windows with enough ink are described with the full
//! feature set and compared against the legend pattern. Accepted
//! windows are shrunk to their ink content, context-validated, and
//! finally deduplicated across tile overlaps.

use crate::classify::LegendPattern;
use crate::context;
use crate::features::extract_features;
use crate::image_ops::{content_box, crop, ink_ratio};
use image::RgbaImage;
use rayon::prelude::*;
use takeoff_core::features::descriptor_similarity;
use takeoff_core::{ContextConfig, MatcherConfig, PatternMatch, Rect};
use tracing::debug;

/// One scan tile, in plan coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Positions along one axis, stepping so that consecutive tiles
/// overlap by at least the sample size. The last tile is pulled back
/// to the image edge rather than truncated.
fn axis_positions(extent: u32, tile_size: u32, step: u32) -> Vec<u32> {
    if extent <= tile_size {
        return vec![0];
    }
    let mut positions = Vec::new();
    let mut pos = 0u32;
    loop {
        if pos + tile_size >= extent {
            positions.push(extent - tile_size);
            break;
        }
        positions.push(pos);
        pos += step;
    }
    positions
}

/// Compute the tile grid covering a plan of the given dimensions.
pub fn tile_grid(plan_width: u32, plan_height: u32, config: &MatcherConfig) -> Vec<Tile> {
    // Overlap below the sample size would let matches straddling a
    // tile boundary escape every tile.
    let overlap = config.tile_overlap.max(config.sample_size);
    let step = config.tile_size.saturating_sub(overlap).max(1);

    let mut tiles = Vec::new();
    for &y in &axis_positions(plan_height, config.tile_size, step) {
        for &x in &axis_positions(plan_width, config.tile_size, step) {
            tiles.push(Tile {
                x,
                y,
                width: config.tile_size.min(plan_width),
                height: config.tile_size.min(plan_height),
            });
        }
    }
    tiles
}

fn scan_tile(
    plan: &RgbaImage,
    tile: Tile,
    pattern: &LegendPattern,
    config: &MatcherConfig,
    context_config: &ContextConfig,
    exclude: Option<Rect>,
) -> Vec<PatternMatch> {
    let sample = config.sample_size;
    let step = ((sample as f64 * config.step_ratio) as u32).max(1);
    let mut found = Vec::new();

    if tile.width < sample || tile.height < sample {
        return found;
    }

    let mut wy = tile.y;
    while wy + sample <= tile.y + tile.height {
        let mut wx = tile.x;
        while wx + sample <= tile.x + tile.width {
            let window_rect = Rect {
                x: wx,
                y: wy,
                width: sample,
                height: sample,
            };
            if let Some(excluded) = exclude {
                if window_rect.intersects(&excluded) {
                    wx += step;
                    continue;
                }
            }
            // Blank paper produces deceptively uniform features and
            // would score high against any pattern. Skip early.
            if ink_ratio(plan, wx, wy, sample, config.white_luminance) < config.min_ink_ratio {
                wx += step;
                continue;
            }

            let window = crop(plan, wx, wy, sample, sample);
            let descriptor = extract_features(&window);
            let similarity = descriptor_similarity(&pattern.descriptor, &descriptor, &config.weights);
            if similarity >= config.min_similarity {
                // Shrink the match to its ink content so reported
                // geometry reflects the element, not the window.
                if let Some(content) = content_box(&window, config.white_luminance) {
                    let region = crop(&window, content.x, content.y, content.width, content.height);
                    if context::is_valid(&region, pattern.category, context_config) {
                        found.push(PatternMatch {
                            x: wx + content.x,
                            y: wy + content.y,
                            width: content.width,
                            height: content.height,
                            confidence: similarity,
                            element_type: pattern.element_type.clone(),
                        });
                    }
                }
            }
            wx += step;
        }
        wy += step;
    }
    found
}

/// Search the whole plan for occurrences of one legend pattern.
///
/// `exclude` masks a region (typically the legend itself) from the
/// scan so swatches do not match themselves.
pub fn find_pattern(
    plan: &RgbaImage,
    pattern: &LegendPattern,
    config: &MatcherConfig,
    context_config: &ContextConfig,
    exclude: Option<Rect>,
) -> Vec<PatternMatch> {
    let tiles = tile_grid(plan.width(), plan.height(), config);
    let mut matches: Vec<PatternMatch> = tiles
        .par_iter()
        .flat_map_iter(|&tile| scan_tile(plan, tile, pattern, config, context_config, exclude))
        .collect();
    debug!(
        pattern = %pattern.element_type,
        raw = matches.len(),
        "pattern scan complete"
    );
    matches = deduplicate_matches(matches, config.overlap_threshold);
    debug!(
        pattern = %pattern.element_type,
        kept = matches.len(),
        "matches deduplicated"
    );
    matches
}

/// Greedy non-maximum suppression. Matches are visited in descending
/// confidence order (ties broken by position for determinism) and a
/// match is kept only if it does not overlap any already-kept match
/// beyond the threshold. Applying this twice yields the same set.
pub fn deduplicate_matches(mut matches: Vec<PatternMatch>, overlap_threshold: f64) -> Vec<PatternMatch> {
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.x, a.y).cmp(&(b.x, b.y)))
    });

    let mut kept: Vec<PatternMatch> = Vec::new();
    for candidate in matches {
        let candidate_rect = candidate.rect();
        let overlaps = kept
            .iter()
            .any(|k| k.rect().overlap_ratio(&candidate_rect) > overlap_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

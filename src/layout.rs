//! Scatter a handful of sprites over a 100x100 canvas without collisions.
//!
//! Placement is rejection sampling: candidates are drawn uniformly so the
//! sprite stays inside the canvas, and rejected if its bounding circle comes
//! within `gap` of an already placed sprite. Repeated rejections shrink the
//! working size (never below `min_size`) and retry the same sprite.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::random::RandomSource;

pub const CANVAS_SIZE: f64 = 100.0;

/// One sprite, in percent of its container. `left`/`top` are the centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl ItemPlacement {
    fn clearance(&self, other: &ItemPlacement, gap: f64) -> f64 {
        let min_distance = (self.size + other.size) / 2.0 + gap;
        let distance = (self.left - other.left).hypot(self.top - other.top);
        distance - min_distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Initial size is `size_scale / sqrt(n)`, clamped to
    /// `[initial_min_size, max_size]`.
    pub size_scale: f64,
    pub initial_min_size: f64,
    pub max_size: f64,
    /// Floor for the shrinking working size.
    pub min_size: f64,
    pub shrink_factor: f64,
    pub gap: f64,
    pub max_attempts_per_item: usize,
    pub max_consecutive_overlaps: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            size_scale: 72.0,
            initial_min_size: 16.0,
            max_size: 30.0,
            min_size: 11.0,
            shrink_factor: 0.9,
            gap: 0.8,
            max_attempts_per_item: 400,
            max_consecutive_overlaps: 5,
        }
    }
}

impl LayoutParams {
    pub fn initial_size(&self, count: usize) -> f64 {
        let raw = self.size_scale / (count.max(1) as f64).sqrt();
        raw.clamp(self.initial_min_size, self.max_size)
    }
}

/// `count` non-overlapping placements with the default parameters.
pub fn place_items<R: RandomSource + ?Sized>(count: usize, rng: &mut R) -> Vec<ItemPlacement> {
    place_items_with(count, &LayoutParams::default(), rng)
}

pub fn place_items_with<R: RandomSource + ?Sized>(
    count: usize,
    params: &LayoutParams,
    rng: &mut R,
) -> Vec<ItemPlacement> {
    let mut current_size = params.initial_size(count);
    let mut consecutive_overlaps = 0;
    let mut placements: Vec<ItemPlacement> = Vec::with_capacity(count);

    while placements.len() < count {
        let mut placed = false;
        // Best rejected candidate of this pass, by clearance.
        let mut fallback: Option<(f64, ItemPlacement)> = None;

        for _ in 0..params.max_attempts_per_item.max(1) {
            let candidate = sample_candidate(current_size, rng);
            let clearance = placements
                .iter()
                .map(|placed| placed.clearance(&candidate, params.gap))
                .fold(f64::INFINITY, f64::min);

            if clearance >= 0.0 {
                placements.push(candidate);
                consecutive_overlaps = 0;
                placed = true;
                break;
            }

            if fallback.map_or(true, |(best, _)| clearance > best) {
                fallback = Some((clearance, candidate));
            }

            consecutive_overlaps += 1;
            if consecutive_overlaps >= params.max_consecutive_overlaps {
                current_size = (current_size * params.shrink_factor).max(params.min_size);
                consecutive_overlaps = 0;
            }
        }

        if placed {
            continue;
        }

        let at_floor = current_size <= params.min_size;
        current_size = (current_size * params.shrink_factor).max(params.min_size);
        if at_floor {
            // Only reachable far beyond the supported item counts; degrade
            // to the least-overlapping candidate rather than loop forever.
            if let Some((clearance, candidate)) = fallback {
                warn!(count, clearance, "layout saturated, accepting overlapping sprite");
                placements.push(candidate);
            }
        }
    }

    placements
}

fn sample_candidate<R: RandomSource + ?Sized>(size: f64, rng: &mut R) -> ItemPlacement {
    let half = size / 2.0;
    let left = half + rng.next_unit() * (CANVAS_SIZE - size);
    let top = half + rng.next_unit() * (CANVAS_SIZE - size);
    ItemPlacement { left, top, size }
}

/// Height of the bands used to read placements in rows.
pub const HINT_ROW_BAND: f64 = 20.0;

/// Indices of `placements` in reading order: top to bottom by row band,
/// then left to right.
pub fn hint_order(placements: &[ItemPlacement]) -> Vec<usize> {
    placements
        .iter()
        .enumerate()
        .sorted_by(|(_, a), (_, b)| {
            let band_a = (a.top / HINT_ROW_BAND).floor();
            let band_b = (b.top / HINT_ROW_BAND).floor();
            band_a
                .total_cmp(&band_b)
                .then(a.left.total_cmp(&b.left))
        })
        .map(|(index, _)| index)
        .collect()
}

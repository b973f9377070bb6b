//! Injected randomness for round generation and layout.
//!
//! Everything random in the core goes through [`RandomSource`], a uniform
//! `[0, 1)` sampler. Any `rand` generator is a source; tests can script exact
//! values with [`ScriptedSource`].

use rand::Rng;
use rand::RngCore;

/// Uniform sampler over `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[min, max]`. Returns `min` when `max < min`.
    fn int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = f64::from(max - min) + 1.0;
        let offset = (self.next_unit() * span).floor() as u32;
        (min + offset).min(max)
    }

    /// Uniform index into a collection of `len` elements (`len > 0`).
    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let offset = (self.next_unit() * len as f64).floor() as usize;
        offset.min(len - 1)
    }

    /// Uniform float in `[low, high)`.
    fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R: RandomSource + ?Sized>(values: &mut [T], rng: &mut R) {
    for index in (1..values.len()).rev() {
        let swap_index = rng.index(index + 1);
        values.swap(index, swap_index);
    }
}

/// Returns a shuffled copy of `values`.
pub fn shuffled<T: Clone, R: RandomSource + ?Sized>(values: &[T], rng: &mut R) -> Vec<T> {
    let mut next = values.to_vec();
    shuffle(&mut next, rng);
    next
}

/// Replays a fixed list of unit samples, cycling once exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Values are clamped into `[0, 1)`; an empty script always yields `0.0`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|value| value.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Unit sample that makes `int_inclusive(min, max)` return `value`,
    /// clamped into `[min, max]`. Any sample works for an empty range.
    pub fn unit_for(value: u32, min: u32, max: u32) -> f64 {
        if max <= min {
            return 0.0;
        }
        let value = value.clamp(min, max);
        let span = f64::from(max - min) + 1.0;
        (f64::from(value - min) + 0.5) / span
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

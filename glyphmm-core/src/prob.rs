//! Probability-vector helpers shared by the model crates.
//!
//! [`sample_index`] is the categorical sampling primitive used for every
//! stochastic step of generation. The remaining helpers operate on rows of
//! probabilities stored as plain `f64` slices.

use rand::Rng;

use crate::{GlyphError, Result};

/// Draw an index from a categorical distribution given by `weights`.
///
/// A uniform `x` in `[0, 1)` is drawn and the smallest index whose cumulative
/// weight exceeds `x` is returned. Weights are expected to sum to roughly 1;
/// when floating-point drift leaves the total below `x`, the result is clamped
/// to the last index carrying positive weight instead of running off the end.
///
/// # Errors
///
/// Returns an error if `weights` is empty.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Result<usize> {
    if weights.is_empty() {
        return Err(GlyphError::InvalidInput(
            "cannot sample from an empty distribution".into(),
        ));
    }
    let x = rng.gen::<f64>();
    Ok(select_index(weights, x))
}

/// Deterministic half of [`sample_index`]: pick the index for a fixed draw `x`.
fn select_index(weights: &[f64], x: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > x {
            return i;
        }
    }
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or(weights.len() - 1)
}

/// Sum of a probability row.
pub fn row_sum(row: &[f64]) -> f64 {
    row.iter().sum()
}

/// Rescale `row` in place so it sums to 1. Rows summing to zero are left as is.
pub fn normalize(row: &mut [f64]) {
    let sum = row_sum(row);
    if sum > 0.0 {
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
}

/// Move `current` a fraction `rate` of the way toward `target`:
/// `v <- v + rate * (v* - v)`.
#[inline]
pub fn relax(current: f64, target: f64, rate: f64) -> f64 {
    (1.0 - rate) * current + rate * target
}

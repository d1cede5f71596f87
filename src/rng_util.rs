/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Pick an index according to a normalized weight vector.
///
/// Weights are assumed non-negative and to sum to 1; the last index is the
/// fallback against floating-point shortfall in the cumulative sum.
pub(crate) fn weighted_index(rng: &mut fastrand::Rng, weights: &[f64]) -> usize {
    let threshold = rng.f64();
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative >= threshold {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

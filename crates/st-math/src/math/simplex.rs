//! Probability-simplex helpers for stochastic vectors and matrices.
//!
//! HMM parameters are rows on the probability simplex: entries are
//! non-negative and each row sums to 1. These helpers normalize raw
//! expected counts into such rows and check the invariant afterwards.

/// Default tolerance used when checking that a row sums to 1.
pub const STOCHASTIC_TOLERANCE: f64 = 1e-6;

/// Normalize `row` in place so that it sums to 1.
///
/// Returns the pre-normalization sum, or `None` (leaving `row` untouched)
/// when the sum is zero, negative, or not finite.
pub fn normalize_in_place(row: &mut [f64]) -> Option<f64> {
    let sum: f64 = row.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return None;
    }
    for v in row.iter_mut() {
        *v /= sum;
    }
    Some(sum)
}

/// A row of `n` equal probabilities.
pub fn uniform_row(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// True when every entry is finite and non-negative and the row sums to 1
/// within `tol`.
pub fn is_stochastic(row: &[f64], tol: f64) -> bool {
    if row.is_empty() {
        return false;
    }
    if row.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return false;
    }
    let sum: f64 = row.iter().sum();
    (sum - 1.0).abs() <= tol
}

/// Index of the first row of `matrix` that is not stochastic, if any.
pub fn first_non_stochastic_row(matrix: &[Vec<f64>], tol: f64) -> Option<usize> {
    matrix.iter().position(|row| !is_stochastic(row, tol))
}

/// Index of the largest value; ties resolve to the lowest index.
///
/// NaN entries never win; an all-NaN slice falls back to index 0.
/// Returns `None` for an empty slice.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i).or(if values.is_empty() { None } else { Some(0) })
}

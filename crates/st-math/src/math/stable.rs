//! Numerically stable primitives for log-domain HMM math.

/// Stable log(sum(exp(values))).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let sum: f64 = values.iter().map(|v| (*v - max).exp()).sum();
    max + sum.ln()
}

/// Stable log(exp(a) + exp(b)).
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    if a == f64::INFINITY || b == f64::INFINITY {
        return f64::INFINITY;
    }
    let m = a.max(b);
    let diff = (a - b).abs();
    m + (-diff).exp().ln_1p()
}

/// Natural log that maps zero (and negative underflow noise) to NEG_INFINITY.
///
/// Probability tables may legitimately contain exact zeros after EM; this
/// keeps them as impossible transitions instead of producing NaN.
#[inline]
pub fn safe_ln(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        f64::NEG_INFINITY
    } else {
        p.ln()
    }
}

/// Convert log-scores into probabilities that sum to 1.
///
/// All -inf (or empty) input degrades to a uniform distribution, since no
/// candidate is distinguishable from another.
pub fn softmax_from_log(log_scores: &[f64]) -> Vec<f64> {
    if log_scores.is_empty() {
        return Vec::new();
    }
    let norm = log_sum_exp(log_scores);
    if !norm.is_finite() {
        let uniform = 1.0 / log_scores.len() as f64;
        return vec![uniform; log_scores.len()];
    }
    log_scores.iter().map(|s| (s - norm).exp()).collect()
}

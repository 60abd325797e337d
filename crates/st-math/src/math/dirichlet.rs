//! Dirichlet-Multinomial smoothing for categorical symptom counts.
//!
//! Each disease's token distribution is treated as a categorical over the
//! symptom vocabulary with a Dirichlet prior:
//! - Prior: `p = (p_1..p_V) ~ Dirichlet(α_1..α_V)`
//! - Likelihood: token counts `n | p ~ Multinomial(N, p)`
//! - Posterior: `p | n ~ Dirichlet(α_i + η·n_i)`
//!
//! A symmetric prior with `α = 1` is Laplace smoothing; `η ∈ (0,1]` tempers
//! counts from small or correlated corpora.

use serde::{Deserialize, Serialize};

/// Parameters for a Dirichlet distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirichletParams {
    /// Concentration parameters (all must be > 0)
    pub alpha: Vec<f64>,
}

impl DirichletParams {
    /// Create new Dirichlet parameters with validation.
    ///
    /// Returns None if any parameter is non-positive, NaN, or if the vector is empty.
    pub fn new(alpha: Vec<f64>) -> Option<Self> {
        if alpha.is_empty() {
            return None;
        }
        if alpha.iter().any(|a| a.is_nan() || *a <= 0.0) {
            return None;
        }
        Some(Self { alpha })
    }

    /// Create a symmetric Dirichlet with all α_i = value.
    pub fn symmetric(k: usize, value: f64) -> Option<Self> {
        if k == 0 || value.is_nan() || value <= 0.0 {
            return None;
        }
        Some(Self {
            alpha: vec![value; k],
        })
    }

    /// Laplace prior (all α_i = 1).
    pub fn laplace(k: usize) -> Option<Self> {
        Self::symmetric(k, 1.0)
    }

    /// Number of categories.
    pub fn k(&self) -> usize {
        self.alpha.len()
    }

    /// α_0 = Σ_i α_i.
    pub fn concentration(&self) -> f64 {
        self.alpha.iter().sum()
    }

    /// E[p_i] = α_i / α_0.
    pub fn mean(&self) -> Vec<f64> {
        let sum = self.concentration();
        self.alpha.iter().map(|a| a / sum).collect()
    }
}

/// Posterior parameters after observing `counts`: `α_i + η·n_i`.
///
/// Returns None on length mismatch, `eta` outside (0, 1], or negative/NaN counts.
pub fn posterior_params(
    prior: &DirichletParams,
    counts: &[f64],
    eta: f64,
) -> Option<DirichletParams> {
    if counts.len() != prior.k() {
        return None;
    }
    if eta.is_nan() || eta <= 0.0 || eta > 1.0 {
        return None;
    }
    if counts.iter().any(|c| c.is_nan() || *c < 0.0) {
        return None;
    }

    let alpha = prior
        .alpha
        .iter()
        .zip(counts)
        .map(|(&a, &n)| a + eta * n)
        .collect();
    DirichletParams::new(alpha)
}

/// Log posterior-predictive probabilities for every category:
/// `ln(α'_i / Σ_j α'_j)`.
pub fn log_predictive_all(posterior: &DirichletParams) -> Vec<f64> {
    let log_sum = posterior.concentration().ln();
    posterior.alpha.iter().map(|a| a.ln() - log_sum).collect()
}

/// Log posterior-predictive probability of category `i` (NaN when out of range).
pub fn log_predictive(posterior: &DirichletParams, i: usize) -> f64 {
    match posterior.alpha.get(i) {
        Some(a) => a.ln() - posterior.concentration().ln(),
        None => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_alpha() {
        assert!(DirichletParams::new(vec![]).is_none());
        assert!(DirichletParams::new(vec![1.0, 0.0]).is_none());
        assert!(DirichletParams::new(vec![1.0, f64::NAN]).is_none());
        assert!(DirichletParams::symmetric(0, 1.0).is_none());
    }

    #[test]
    fn laplace_posterior_matches_hand_computation() {
        let prior = DirichletParams::laplace(3).unwrap();
        let post = posterior_params(&prior, &[2.0, 0.0, 1.0], 1.0).unwrap();
        assert_eq!(post.alpha, vec![3.0, 1.0, 2.0]);
        let lp = log_predictive(&post, 0);
        assert!((lp - (3.0f64 / 6.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn tempering_shrinks_counts() {
        let prior = DirichletParams::laplace(2).unwrap();
        let post = posterior_params(&prior, &[4.0, 0.0], 0.5).unwrap();
        assert_eq!(post.alpha, vec![3.0, 1.0]);
        assert!(posterior_params(&prior, &[1.0, 1.0], 0.0).is_none());
        assert!(posterior_params(&prior, &[1.0], 1.0).is_none());
        assert!(posterior_params(&prior, &[-1.0, 1.0], 1.0).is_none());
    }

    #[test]
    fn predictive_all_is_normalized() {
        let post = DirichletParams::new(vec![1.0, 2.0, 5.0]).unwrap();
        let total: f64 = log_predictive_all(&post).iter().map(|l| l.exp()).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(log_predictive(&post, 9).is_nan());
    }
}

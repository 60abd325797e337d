//! Multinomial naive Bayes over the symptom vocabulary.
//!
//! Supervised counterpart to the HMM: class priors and per-class token
//! distributions are Dirichlet posterior means, so unseen tokens never zero
//! out a class. Scores are exact posteriors under the model and predictions
//! are marked calibrated.

use serde::{Deserialize, Serialize};
use st_common::{Error, Result};
use st_math::dirichlet::{log_predictive_all, posterior_params, DirichletParams};
use st_math::softmax_from_log;

use super::backend::{DiagnosisBackend, Prediction};
use crate::vocab::{IndexedCorpus, Vocabulary};

/// Default symmetric pseudo-count (Laplace smoothing).
pub const DEFAULT_SMOOTHING: f64 = 1.0;

/// Fitted log-probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesParams {
    /// Pseudo-count used when fitting.
    pub smoothing: f64,
    /// `ln P(disease)` per state.
    pub log_prior: Vec<f64>,
    /// `ln P(token | disease)`, K×V.
    pub log_likelihood: Vec<Vec<f64>>,
}

impl NaiveBayesParams {
    /// Fit from an indexed corpus using its sequence labels.
    pub fn fit(corpus: &IndexedCorpus, smoothing: f64) -> Result<Self> {
        let k = corpus.vocabulary.n_states();
        let v = corpus.vocabulary.n_observations();

        let mut class_counts = vec![0.0; k];
        let mut token_counts = vec![vec![0.0; v]; k];
        for (segment, &label) in corpus.segments().zip(&corpus.sequence_labels) {
            class_counts[label] += 1.0;
            for &o in segment {
                token_counts[label][o] += 1.0;
            }
        }

        let smoothed = |n: usize, counts: &[f64]| -> Result<Vec<f64>> {
            DirichletParams::symmetric(n, smoothing)
                .and_then(|prior| posterior_params(&prior, counts, 1.0))
                .map(|posterior| log_predictive_all(&posterior))
                .ok_or_else(|| {
                    Error::InvalidModel(format!(
                        "cannot smooth counts with pseudo-count {}",
                        smoothing
                    ))
                })
        };

        let log_prior = smoothed(k, &class_counts)?;
        let log_likelihood = token_counts
            .iter()
            .map(|counts| smoothed(v, counts))
            .collect::<Result<Vec<_>>>()?;

        Ok(NaiveBayesParams {
            smoothing,
            log_prior,
            log_likelihood,
        })
    }

    pub fn n_states(&self) -> usize {
        self.log_prior.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.log_likelihood.first().map_or(0, Vec::len)
    }

    /// Unnormalized log posterior per state.
    pub fn joint_log_scores(&self, obs: &[usize]) -> Vec<f64> {
        self.log_prior
            .iter()
            .zip(&self.log_likelihood)
            .map(|(&prior, row)| prior + obs.iter().map(|&o| row[o]).sum::<f64>())
            .collect()
    }
}

/// Naive Bayes as a [`DiagnosisBackend`].
#[derive(Debug, Clone)]
pub struct NaiveBayesBackend {
    vocabulary: Vocabulary,
    params: NaiveBayesParams,
}

impl NaiveBayesBackend {
    pub fn new(vocabulary: Vocabulary, params: NaiveBayesParams) -> Result<Self> {
        if params.n_states() != vocabulary.n_states()
            || params.log_likelihood.iter().any(|r| r.len() != vocabulary.n_observations())
        {
            return Err(Error::InvalidModel(format!(
                "classifier is {}x{} but the vocabulary has {} states and {} observations",
                params.n_states(),
                params.n_symbols(),
                vocabulary.n_states(),
                vocabulary.n_observations()
            )));
        }
        Ok(NaiveBayesBackend { vocabulary, params })
    }
}

impl DiagnosisBackend for NaiveBayesBackend {
    fn name(&self) -> &'static str {
        "naive_bayes"
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn predict(&self, evidence: &[String]) -> Result<Prediction> {
        let obs = self.vocabulary.encode(evidence);
        if obs.is_empty() {
            return Err(Error::EmptySequence);
        }
        let posterior = softmax_from_log(&self.params.joint_log_scores(&obs));
        Ok(Prediction::from_probabilities(
            self.vocabulary.states(),
            &posterior,
            true,
        ))
    }
}

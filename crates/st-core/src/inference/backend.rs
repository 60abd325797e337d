//! Interchangeable disease predictors.
//!
//! The dialog controller only sees [`DiagnosisBackend`]. The HMM and the
//! naive Bayes classifier implement it here; an external text classifier can
//! implement it the same way.

use serde::{Deserialize, Serialize};
use st_common::{Error, Result};
use st_math::softmax_from_log;

use super::hmm::{decode, HmmParams};
use crate::vocab::Vocabulary;

/// One disease candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub label: String,
    pub confidence: f64,
}

/// Ranked candidates, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub ranked: Vec<RankedLabel>,
    /// Whether confidences are probabilities the backend stands behind.
    /// The confidence gate only applies to calibrated predictions.
    pub calibrated: bool,
}

impl Prediction {
    /// Rank `labels` by `probabilities`, highest first. Equal probabilities
    /// keep label order.
    pub fn from_probabilities(labels: &[String], probabilities: &[f64], calibrated: bool) -> Self {
        let mut ranked: Vec<RankedLabel> = labels
            .iter()
            .zip(probabilities)
            .map(|(label, &confidence)| RankedLabel {
                label: label.clone(),
                confidence,
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Prediction { ranked, calibrated }
    }

    pub fn top(&self) -> Option<&RankedLabel> {
        self.ranked.first()
    }

    /// The first `k` candidates.
    pub fn top_k(&self, k: usize) -> &[RankedLabel] {
        &self.ranked[..k.min(self.ranked.len())]
    }
}

/// Maps collected symptom tokens to ranked diseases.
pub trait DiagnosisBackend: Send + Sync {
    /// Short identifier for logs and output.
    fn name(&self) -> &'static str;

    /// Token vocabulary the backend recognizes.
    fn vocabulary(&self) -> &Vocabulary;

    /// Rank diseases for `evidence`. Unknown tokens are ignored; if none are
    /// left the call fails with `EmptySequence`.
    fn predict(&self, evidence: &[String]) -> Result<Prediction>;
}

/// HMM backend: the diagnosis is the terminal state of the Viterbi path.
///
/// Confidence is a softmax over the terminal Viterbi scores. It ranks the
/// states consistently with the decoded diagnosis but is not a posterior,
/// so predictions are marked uncalibrated.
#[derive(Debug, Clone)]
pub struct HmmBackend {
    vocabulary: Vocabulary,
    params: HmmParams,
}

impl HmmBackend {
    pub fn new(vocabulary: Vocabulary, params: HmmParams) -> Result<Self> {
        params.validate()?;
        if params.n_states() != vocabulary.n_states()
            || params.n_symbols() != vocabulary.n_observations()
        {
            return Err(Error::InvalidModel(format!(
                "HMM is {}x{} but the vocabulary has {} states and {} observations",
                params.n_states(),
                params.n_symbols(),
                vocabulary.n_states(),
                vocabulary.n_observations()
            )));
        }
        Ok(HmmBackend { vocabulary, params })
    }

    pub fn params(&self) -> &HmmParams {
        &self.params
    }
}

impl DiagnosisBackend for HmmBackend {
    fn name(&self) -> &'static str {
        "hmm"
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn predict(&self, evidence: &[String]) -> Result<Prediction> {
        let obs = self.vocabulary.encode(evidence);
        let path = decode(&obs, &self.params)?;
        let probabilities = softmax_from_log(&path.terminal_scores);
        let mut prediction =
            Prediction::from_probabilities(self.vocabulary.states(), &probabilities, false);

        // Keep the decoded terminal state first even if rounding reorders it.
        let terminal = path.terminal_state();
        if let Some(label) = self.vocabulary.state_label(terminal) {
            if let Some(pos) = prediction.ranked.iter().position(|r| r.label == label) {
                let entry = prediction.ranked.remove(pos);
                prediction.ranked.insert(0, entry);
            }
        }
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HmmBackend {
        let vocab = Vocabulary::from_parts(
            vec!["Flu".into(), "Cold".into()],
            vec!["fever".into(), "sneeze".into()],
        );
        // States sort to [Cold, Flu].
        let params = HmmParams {
            start: vec![0.5, 0.5],
            transition: vec![vec![0.9, 0.1], vec![0.1, 0.9]],
            emission: vec![vec![0.1, 0.9], vec![0.9, 0.1]],
        };
        HmmBackend::new(vocab, params).unwrap()
    }

    #[test]
    fn ranks_terminal_state_first() {
        let p = backend()
            .predict(&["fever".to_string(), "fever".to_string()])
            .unwrap();
        assert!(!p.calibrated);
        assert_eq!(p.top().unwrap().label, "Flu");
        let total: f64 = p.ranked.iter().map(|r| r.confidence).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(p.ranked[0].confidence > p.ranked[1].confidence);
    }

    #[test]
    fn unknown_only_evidence_is_empty_sequence() {
        let err = backend().predict(&["headache".to_string()]).unwrap_err();
        assert!(matches!(err, Error::EmptySequence));
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let vocab = Vocabulary::from_parts(vec!["A".into()], vec!["x".into(), "y".into()]);
        let params = HmmParams::uniform(1, 3);
        assert!(matches!(
            HmmBackend::new(vocab, params),
            Err(Error::InvalidModel(_))
        ));
    }

    #[test]
    fn top_k_is_bounded() {
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let p = Prediction::from_probabilities(&labels, &[0.2, 0.5, 0.3], true);
        assert_eq!(p.top_k(2).len(), 2);
        assert_eq!(p.top_k(10).len(), 3);
        assert_eq!(p.top_k(2)[0].label, "b");
        assert_eq!(p.top_k(2)[1].label, "c");
    }
}

//! Trained model persistence.
//!
//! A [`TrainedModel`] bundles everything needed to serve predictions: the
//! vocabulary, HMM parameters, the naive Bayes classifier, and provenance
//! (training settings, corpus hash, convergence report). It is written as a
//! single JSON document and re-validated on load.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use st_common::{Error, Result, TrainingConfig};
use tracing::info;

use crate::corpus::corpus_sha256;
use crate::inference::naive_bayes::DEFAULT_SMOOTHING;
use crate::inference::{
    train, DiagnosisBackend, HmmBackend, HmmParams, NaiveBayesBackend, NaiveBayesParams,
    TrainingInput, TrainingReport,
};
use crate::logging::event_names;
use crate::tokenize::Tokenizer;
use crate::vocab::{self, CorpusRecord, Vocabulary};

/// Schema version for model files.
pub const MODEL_SCHEMA_VERSION: &str = "1.0.0";

/// Which backend serves predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Viterbi terminal state of the unsupervised HMM
    #[default]
    Hmm,
    /// Supervised multinomial naive Bayes
    NaiveBayes,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Hmm => write!(f, "hmm"),
            BackendKind::NaiveBayes => write!(f, "naive_bayes"),
        }
    }
}

/// A trained, serializable model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub schema_version: String,
    pub trained_at: DateTime<Utc>,
    /// SHA-256 of the training records.
    pub corpus_sha256: String,
    /// Number of corpus records read (including skipped ones).
    pub corpus_records: usize,
    /// Settings the HMM was trained with.
    pub training: TrainingConfig,
    pub report: TrainingReport,
    pub vocabulary: Vocabulary,
    pub hmm: HmmParams,
    pub naive_bayes: NaiveBayesParams,
}

impl TrainedModel {
    /// Index `records`, train the HMM and fit the classifier.
    pub fn fit(
        records: &[CorpusRecord],
        tokenizer: &dyn Tokenizer,
        training: &TrainingConfig,
    ) -> Result<Self> {
        let indexed = vocab::build(records, tokenizer)?;
        info!(
            event = event_names::CORPUS_INDEXED,
            records = records.len(),
            sequences = indexed.n_sequences(),
            states = indexed.vocabulary.n_states(),
            observations = indexed.vocabulary.n_observations(),
            "Corpus indexed"
        );

        let outcome = train(&TrainingInput::from(&indexed), training)?;
        let naive_bayes = NaiveBayesParams::fit(&indexed, DEFAULT_SMOOTHING)?;

        Ok(TrainedModel {
            schema_version: MODEL_SCHEMA_VERSION.to_string(),
            trained_at: Utc::now(),
            corpus_sha256: corpus_sha256(records),
            corpus_records: records.len(),
            training: training.clone(),
            report: outcome.report,
            vocabulary: indexed.vocabulary,
            hmm: outcome.params,
            naive_bayes,
        })
    }

    /// Re-check the schema version and every stochastic invariant.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != MODEL_SCHEMA_VERSION {
            return Err(Error::InvalidModel(format!(
                "schema version mismatch: expected {}, got {}",
                MODEL_SCHEMA_VERSION, self.schema_version
            )));
        }
        self.hmm_backend()?;
        self.naive_bayes_backend()?;
        for (state, row) in self.naive_bayes.log_likelihood.iter().enumerate() {
            let mass: f64 = row.iter().map(|l| l.exp()).sum();
            if (mass - 1.0).abs() > st_math::STOCHASTIC_TOLERANCE {
                return Err(Error::InvalidModel(format!(
                    "classifier row {} does not sum to 1",
                    state
                )));
            }
        }
        Ok(())
    }

    pub fn hmm_backend(&self) -> Result<HmmBackend> {
        HmmBackend::new(self.vocabulary.clone(), self.hmm.clone())
    }

    pub fn naive_bayes_backend(&self) -> Result<NaiveBayesBackend> {
        NaiveBayesBackend::new(self.vocabulary.clone(), self.naive_bayes.clone())
    }

    /// Shared, read-only backend of the requested kind.
    pub fn backend(&self, kind: BackendKind) -> Result<Arc<dyn DiagnosisBackend>> {
        let backend: Arc<dyn DiagnosisBackend> = match kind {
            BackendKind::Hmm => Arc::new(self.hmm_backend()?),
            BackendKind::NaiveBayes => Arc::new(self.naive_bayes_backend()?),
        };
        Ok(backend)
    }

    /// Write the model as pretty JSON, atomically via a temp file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(self)?;
        if let Err(e) = write_then_rename(&tmp_path, path, &json) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        info!(
            event = event_names::MODEL_SAVED,
            path = %path.display(),
            bytes = json.len(),
            "Model saved"
        );
        Ok(())
    }

    /// Read and validate a model file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let model: TrainedModel = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidModel(format!("{}: {}", path.display(), e)))?;
        model.validate()?;
        info!(
            event = event_names::MODEL_LOADED,
            path = %path.display(),
            states = model.vocabulary.n_states(),
            observations = model.vocabulary.n_observations(),
            "Model loaded"
        );
        Ok(model)
    }
}

fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp_path)?;
    file.write_all(bytes)?;
    file.flush()?;
    drop(file);
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::WordTokenizer;
    use tempfile::TempDir;

    fn records() -> Vec<CorpusRecord> {
        vec![
            CorpusRecord::new("fever chills aches", "Flu"),
            CorpusRecord::new("chills fever", "Flu"),
            CorpusRecord::new("sneeze cough", "Cold"),
            CorpusRecord::new("runny nose sneeze", "Cold"),
        ]
    }

    fn fitted() -> TrainedModel {
        TrainedModel::fit(&records(), &WordTokenizer::new(), &TrainingConfig::default()).unwrap()
    }

    #[test]
    fn fit_produces_valid_model() {
        let model = fitted();
        model.validate().unwrap();
        assert_eq!(model.vocabulary.states(), &["Cold", "Flu"]);
        assert_eq!(model.corpus_records, 4);
        assert!(model.report.iterations >= 1);
    }

    #[test]
    fn save_then_load_preserves_parameters() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("models").join("triage.json");
        let model = fitted();
        model.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = TrainedModel::load(&path).unwrap();
        assert_eq!(loaded.hmm, model.hmm);
        assert_eq!(loaded.corpus_sha256, model.corpus_sha256);
        assert_eq!(loaded.vocabulary.observations(), model.vocabulary.observations());
    }

    #[test]
    fn failed_save_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A directory in the way makes the final rename fail.
        let path = tmp.path().join("triage.json");
        fs::create_dir(&path).unwrap();
        assert!(fitted().save(&path).is_err());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn load_rejects_tampered_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("triage.json");
        let mut model = fitted();
        model.hmm.transition[0][0] += 0.5;
        model.save(&path).unwrap();
        assert!(matches!(
            TrainedModel::load(&path),
            Err(Error::InvalidModel(_))
        ));
    }

    #[test]
    fn load_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("triage.json");
        fs::write(&path, "{\"schema_version\": 1}").unwrap();
        assert!(matches!(
            TrainedModel::load(&path),
            Err(Error::InvalidModel(_))
        ));
    }

    #[test]
    fn backends_share_vocabulary() {
        let model = fitted();
        for kind in [BackendKind::Hmm, BackendKind::NaiveBayes] {
            let backend = model.backend(kind).unwrap();
            assert_eq!(backend.vocabulary().n_states(), 2);
            assert_eq!(backend.name(), kind.to_string());
        }
    }
}

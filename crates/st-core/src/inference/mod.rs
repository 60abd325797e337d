//! Diagnostic inference: the discrete HMM and the backends built on it.

pub mod backend;
pub mod hmm;
pub mod naive_bayes;

pub use backend::{DiagnosisBackend, HmmBackend, Prediction, RankedLabel};
pub use hmm::{
    decode, path_log_probability, train, HmmParams, TrainingInput, TrainingOutcome,
    TrainingReport, ViterbiPath,
};
pub use naive_bayes::{NaiveBayesBackend, NaiveBayesParams};

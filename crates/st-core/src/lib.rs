//! Symptom Triage Core Library
//!
//! This library provides the triage engine and the dialog built on it:
//! - Tokenization and vocabulary indexing of the labeled corpus
//! - Discrete HMM training (Baum–Welch) and decoding (Viterbi)
//! - Interchangeable diagnosis backends (HMM, naive Bayes)
//! - The multi-turn dialog controller and its session store
//! - Model persistence, exit codes, and structured logging
//!
//! The binary entry point is in `main.rs`.

pub mod corpus;
pub mod dialog;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod model;
pub mod tokenize;
pub mod vocab;

pub use dialog::{DialogController, DialogState, Reply, Session, SessionStore};
pub use inference::{DiagnosisBackend, Prediction, RankedLabel};
pub use model::{BackendKind, TrainedModel};
pub use tokenize::{Tokenizer, WordTokenizer};
pub use vocab::{CorpusRecord, Vocabulary};

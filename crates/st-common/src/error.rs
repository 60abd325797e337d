//! Error types for Symptom Triage.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! Training-time failures (`EmptyCorpus`, `DegenerateModel`) are fatal to the
//! training pipeline and are never retried automatically. `EmptySequence` is
//! recoverable: the dialog layer turns it into a request for more detail.
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 31,
//!   "category": "inference",
//!   "message": "degenerate model: state 4 has no emission support after iteration 7",
//!   "recoverable": false,
//!   "context": { "state": 4, "iteration": 7 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Symptom Triage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors (policy, training, symptom table).
    Config,
    /// Training corpus errors.
    Corpus,
    /// HMM training/decoding and numerical errors.
    Inference,
    /// Conversation session errors.
    Session,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Corpus => write!(f, "corpus"),
            ErrorCategory::Inference => write!(f, "inference"),
            ErrorCategory::Session => write!(f, "session"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Symptom Triage.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid dialog policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid training config: {0}")]
    InvalidTraining(String),

    #[error("invalid symptom table: {0}")]
    InvalidSymptomTable(String),

    // Corpus errors (20-29)
    #[error("corpus produced no usable symptom sequences")]
    EmptyCorpus,

    #[error("malformed corpus record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    // Inference errors (30-39)
    #[error("no recognizable symptoms to decode")]
    EmptySequence,

    #[error(
        "degenerate model: state {state} has no emission support after iteration {iteration} \
         (mass {mass:e})"
    )]
    DegenerateModel {
        state: usize,
        iteration: usize,
        mass: f64,
    },

    #[error("observation symbol {symbol} is outside the vocabulary of {vocab_size} symbols")]
    UnknownSymbol { symbol: usize, vocab_size: usize },

    #[error("invalid model parameters: {0}")]
    InvalidModel(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // Session errors (50-59)
    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Corpus errors
    /// - 30-39: Inference errors
    /// - 50-59: Session errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidPolicy(_) => 11,
            Error::InvalidTraining(_) => 12,
            Error::InvalidSymptomTable(_) => 13,
            Error::EmptyCorpus => 20,
            Error::MalformedRecord { .. } => 21,
            Error::EmptySequence => 30,
            Error::DegenerateModel { .. } => 31,
            Error::UnknownSymbol { .. } => 32,
            Error::InvalidModel(_) => 33,
            Error::NumericalInstability(_) => 34,
            Error::SessionNotFound { .. } => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::InvalidPolicy(_)
            | Error::InvalidTraining(_)
            | Error::InvalidSymptomTable(_) => ErrorCategory::Config,

            Error::EmptyCorpus | Error::MalformedRecord { .. } => ErrorCategory::Corpus,

            Error::EmptySequence
            | Error::DegenerateModel { .. }
            | Error::UnknownSymbol { .. }
            | Error::InvalidModel(_)
            | Error::NumericalInstability(_) => ErrorCategory::Inference,

            Error::SessionNotFound { .. } => ErrorCategory::Session,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Training failures are not: a model trained over them must not be put
    /// into service.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidPolicy(_) => true,
            Error::InvalidTraining(_) => true,
            Error::InvalidSymptomTable(_) => true,

            Error::EmptyCorpus => false,
            Error::MalformedRecord { .. } => true,

            // The user can simply describe more symptoms.
            Error::EmptySequence => true,
            Error::DegenerateModel { .. } => false,
            Error::UnknownSymbol { .. } => false,
            Error::InvalidModel(_) => false,
            Error::NumericalInstability(_) => false,

            Error::SessionNotFound { .. } => false,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'st-core config validate' to check configuration files."
            }
            Error::InvalidPolicy(_) => {
                "Fix policy.json or remove it to fall back to the built-in dialog policy."
            }
            Error::InvalidTraining(_) => {
                "Fix training.json or remove it to fall back to the built-in training settings."
            }
            Error::InvalidSymptomTable(_) => {
                "Every disease in symptoms.json needs at least one non-empty symptom phrase."
            }

            Error::EmptyCorpus => {
                "The corpus has no rows with recognizable text. Check the text and label fields."
            }
            Error::MalformedRecord { .. } => {
                "Each corpus line must be a JSON object with string 'text' and 'label' fields."
            }

            Error::EmptySequence => "Describe at least one symptom the model recognizes.",
            Error::DegenerateModel { .. } => {
                "A hidden state lost all support. Use a larger corpus or a different seed; \
                 the model was not saved."
            }
            Error::UnknownSymbol { .. } => {
                "Observation indices must come from the vocabulary the model was trained with."
            }
            Error::InvalidModel(_) => "Retrain the model with 'st-core train'.",
            Error::NumericalInstability(_) => {
                "Internal numerical issue. Retrain with a different seed and report if persistent."
            }

            Error::SessionNotFound { .. } => "Start a new conversation session.",

            Error::Io(_) => "Check that the path exists and is readable, then retry.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq .' or regenerate the file.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidPolicy(_) => "Invalid Dialog Policy",
            Error::InvalidTraining(_) => "Invalid Training Configuration",
            Error::InvalidSymptomTable(_) => "Invalid Symptom Table",
            Error::EmptyCorpus => "Empty Corpus",
            Error::MalformedRecord { .. } => "Malformed Corpus Record",
            Error::EmptySequence => "No Recognized Symptoms",
            Error::DegenerateModel { .. } => "Degenerate Model",
            Error::UnknownSymbol { .. } => "Unknown Observation Symbol",
            Error::InvalidModel(_) => "Invalid Model",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::SessionNotFound { .. } => "Session Not Found",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (e.g., state index, line number).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MalformedRecord { line, .. } => {
                context.insert("line".to_string(), serde_json::json!(line));
            }
            Error::DegenerateModel {
                state, iteration, ..
            } => {
                context.insert("state".to_string(), serde_json::json!(state));
                context.insert("iteration".to_string(), serde_json::json!(iteration));
            }
            Error::UnknownSymbol { symbol, vocab_size } => {
                context.insert("symbol".to_string(), serde_json::json!(symbol));
                context.insert("vocab_size".to_string(), serde_json::json!(vocab_size));
            }
            Error::SessionNotFound { session_id } => {
                context.insert("session_id".to_string(), serde_json::json!(session_id));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Format for a human reader: headline, reason, fix.
    pub fn to_human(&self, headline: &str) -> String {
        format!(
            "✗ {}\n  Reason: {}\n  Fix: {}",
            headline, self.message, self.remediation
        )
    }
}

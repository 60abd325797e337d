//! Exit codes for the st-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

use st_common::{Error, ErrorCategory};

/// Exit codes for st-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Configuration file invalid or unreadable
    ConfigError = 11,

    /// Training corpus unusable (empty or malformed)
    CorpusError = 12,

    /// Model file invalid or incompatible
    ModelError = 13,

    /// Session not found or invalid
    SessionError = 15,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,

    /// Training failed on a degenerate or numerically unstable model
    TrainingFailed = 22,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// User/environment error (codes 10-19), resolvable by user action.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::CorpusError => "ERR_CORPUS",
            ExitCode::ModelError => "ERR_MODEL",
            ExitCode::SessionError => "ERR_SESSION",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
            ExitCode::TrainingFailed => "ERR_TRAINING",
        }
    }

    /// Exit code for a failed operation.
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::DegenerateModel { .. } | Error::NumericalInstability(_) => {
                ExitCode::TrainingFailed
            }
            Error::InvalidModel(_) | Error::UnknownSymbol { .. } => ExitCode::ModelError,
            Error::EmptySequence => ExitCode::ArgsError,
            _ => match error.category() {
                ErrorCategory::Config => ExitCode::ConfigError,
                ErrorCategory::Corpus => ExitCode::CorpusError,
                ErrorCategory::Inference => ExitCode::InternalError,
                ErrorCategory::Session => ExitCode::SessionError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

//! Symptom Triage common types, IDs, errors, and configuration.
//!
//! This crate provides foundational types shared across st-core modules:
//! - Conversation session identity
//! - Common error types with stable codes
//! - Output format specifications
//! - Configuration loading and validation

pub mod config;
pub mod error;
pub mod id;
pub mod output;

/// Schema version of CLI JSON payloads.
pub const SCHEMA_VERSION: &str = "1.0.0";

pub use config::{
    Config, ConfigPaths, ConfigResolver, ConfigSnapshot, DialogPolicy, InitScheme, SymptomMatching,
    SymptomTable, TrainingConfig, TriggerPolicy,
};
pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::SessionId;
pub use output::OutputFormat;

//! Configuration loading and validation for Symptom Triage.
//!
//! This module provides:
//! - Typed configuration structures for policy.json, training.json and symptoms.json
//! - Deterministic config resolution (CLI > env > XDG > defaults)
//! - Semantic validation
//! - Config snapshots for model provenance

pub mod policy;
pub mod resolve;
pub mod snapshot;
pub mod symptoms;
pub mod training;

pub use policy::{DialogPolicy, SymptomMatching, TriggerPolicy};
pub use resolve::{ConfigPaths, ConfigResolver};
pub use snapshot::{ConfigSnapshot, ConfigSources};
pub use symptoms::SymptomTable;
pub use training::{InitScheme, TrainingConfig};

use crate::error::Result;

/// The complete loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dialog controller policy
    pub policy: DialogPolicy,
    /// Baum–Welch training settings
    pub training: TrainingConfig,
    /// Disease → expected symptoms
    pub symptoms: SymptomTable,
    /// Metadata about how this config was loaded
    pub snapshot: ConfigSnapshot,
}

impl Config {
    /// Load configuration with resolution from CLI, env, or defaults.
    pub fn load(resolver: &ConfigResolver) -> Result<Self> {
        let (policy, policy_source) = resolver.load_policy()?;
        let (training, training_source) = resolver.load_training()?;
        let (symptoms, symptoms_source) = resolver.load_symptoms()?;

        let snapshot = ConfigSnapshot::new(
            &policy,
            &training,
            &symptoms,
            ConfigSources {
                policy: policy_source,
                training: training_source,
                symptoms: symptoms_source,
            },
        )?;

        Ok(Config {
            policy,
            training,
            symptoms,
            snapshot,
        })
    }

    /// Load configuration with built-in defaults only.
    pub fn load_defaults() -> Result<Self> {
        let policy = DialogPolicy::default();
        let training = TrainingConfig::default();
        let symptoms = SymptomTable::default();
        let snapshot = ConfigSnapshot::from_defaults(&policy, &training, &symptoms)?;

        Ok(Config {
            policy,
            training,
            symptoms,
            snapshot,
        })
    }

    /// Validate configuration semantically.
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        self.training.validate()?;
        self.symptoms.validate()?;
        Ok(())
    }
}

/// Configuration source for a file.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file, or None if using defaults
    pub path: Option<String>,
    /// SHA-256 hash of file contents, or None if defaults
    pub hash: Option<String>,
    /// How this source was resolved
    pub resolution: ConfigResolution,
}

/// How a config file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigResolution {
    /// From explicit CLI flag
    CliFlag,
    /// From environment variable
    EnvVar,
    /// From the config directory
    XdgConfig,
    /// Using built-in defaults
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::CliFlag => write!(f, "cli"),
            ConfigResolution::EnvVar => write!(f, "env"),
            ConfigResolution::XdgConfig => write!(f, "xdg"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}

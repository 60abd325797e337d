//! Configuration snapshots for audit and model provenance.
//!
//! A snapshot records where each config file came from, its content hash,
//! and the schema versions in force, so a trained model or a chat transcript
//! can be traced back to the exact configuration that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ConfigResolution, ConfigSource, DialogPolicy, SymptomTable, TrainingConfig};
use crate::error::Result;

/// Complete configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Timestamp when snapshot was created
    pub snapshot_at: DateTime<Utc>,

    /// Combined hash of the effective (serialized) configuration
    pub combined_hash: String,

    pub policy_source: SourceInfo,
    pub training_source: SourceInfo,
    pub symptoms_source: SourceInfo,

    /// Active schema versions
    pub schema_versions: SchemaVersions,
}

/// Loaded sources for the three config files.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub policy: ConfigSource,
    pub training: ConfigSource,
    pub symptoms: ConfigSource,
}

impl ConfigSources {
    /// All three from built-in defaults.
    pub fn defaults() -> Self {
        let default = || ConfigSource {
            path: None,
            hash: None,
            resolution: ConfigResolution::Default,
        };
        ConfigSources {
            policy: default(),
            training: default(),
            symptoms: default(),
        }
    }
}

impl ConfigSnapshot {
    /// Create a new snapshot from loaded configs.
    pub fn new(
        policy: &DialogPolicy,
        training: &TrainingConfig,
        symptoms: &SymptomTable,
        sources: ConfigSources,
    ) -> Result<Self> {
        let policy_json = serde_json::to_string(policy)?;
        let training_json = serde_json::to_string(training)?;
        let symptoms_json = serde_json::to_string(symptoms)?;

        let combined_hash = compute_combined_hash(&[
            ("policy", &policy_json),
            ("training", &training_json),
            ("symptoms", &symptoms_json),
        ]);

        Ok(ConfigSnapshot {
            snapshot_at: Utc::now(),
            combined_hash,
            policy_source: SourceInfo::from_config_source(sources.policy),
            training_source: SourceInfo::from_config_source(sources.training),
            symptoms_source: SourceInfo::from_config_source(sources.symptoms),
            schema_versions: SchemaVersions {
                policy: policy.schema_version.clone(),
                training: training.schema_version.clone(),
                symptoms: symptoms.schema_version.clone(),
            },
        })
    }

    /// Create a snapshot for built-in defaults.
    pub fn from_defaults(
        policy: &DialogPolicy,
        training: &TrainingConfig,
        symptoms: &SymptomTable,
    ) -> Result<Self> {
        ConfigSnapshot::new(policy, training, symptoms, ConfigSources::defaults())
    }

    /// Return true if every config is from defaults.
    pub fn is_default(&self) -> bool {
        [
            &self.policy_source,
            &self.training_source,
            &self.symptoms_source,
        ]
        .iter()
        .all(|s| s.resolution == "default")
    }
}

/// Source information for a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Path to the file (None if defaults)
    pub path: Option<String>,

    /// SHA-256 hash of file content (None if defaults)
    pub hash: Option<String>,

    /// How the config was resolved
    pub resolution: String,
}

impl SourceInfo {
    fn from_config_source(source: ConfigSource) -> Self {
        SourceInfo {
            path: source.path,
            hash: source.hash,
            resolution: source.resolution.to_string(),
        }
    }
}

/// Schema versions for loaded configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaVersions {
    pub policy: String,
    pub training: String,
    pub symptoms: String,
}

fn compute_combined_hash(parts: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();
    for (name, content) in parts {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(content.as_bytes());
        hasher.update(b":");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::super::policy::POLICY_SCHEMA_VERSION;
    use super::*;

    #[test]
    fn test_snapshot_from_defaults() {
        let snapshot = ConfigSnapshot::from_defaults(
            &DialogPolicy::default(),
            &TrainingConfig::default(),
            &SymptomTable::default(),
        )
        .unwrap();

        assert!(snapshot.is_default());
        assert_eq!(snapshot.combined_hash.len(), 64);
        assert_eq!(snapshot.schema_versions.policy, POLICY_SCHEMA_VERSION);
    }

    #[test]
    fn test_hash_changes_with_effective_values() {
        let training = TrainingConfig::default();
        let symptoms = SymptomTable::default();
        let a = ConfigSnapshot::from_defaults(&DialogPolicy::default(), &training, &symptoms)
            .unwrap();
        let strict = DialogPolicy {
            confidence_threshold: 0.9,
            ..Default::default()
        };
        let b = ConfigSnapshot::from_defaults(&strict, &training, &symptoms).unwrap();
        assert_ne!(a.combined_hash, b.combined_hash);
    }
}

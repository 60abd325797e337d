//! Configuration resolution for Symptom Triage.
//!
//! Implements deterministic config resolution order, per file:
//! 1. Explicit CLI flags (--config-dir, --policy, --training, --symptoms)
//! 2. Environment variables (SYMPTOM_TRIAGE_POLICY, ...)
//! 3. Config directory (SYMPTOM_TRIAGE_CONFIG, XDG_CONFIG_HOME, ~/.config)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use super::{ConfigResolution, ConfigSource, DialogPolicy, SymptomTable, TrainingConfig};
use crate::error::{Error, Result};

/// Directory name under the XDG config root.
pub const CONFIG_DIR_NAME: &str = "symptom_triage";

/// Configuration file paths.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Directory containing config files
    pub config_dir: Option<PathBuf>,
    /// Explicit path to policy.json
    pub policy_path: Option<PathBuf>,
    /// Explicit path to training.json
    pub training_path: Option<PathBuf>,
    /// Explicit path to symptoms.json
    pub symptoms_path: Option<PathBuf>,
}

/// A configuration file kind: where it lives and how it validates.
trait ConfigFile: DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    const ENV_VAR: &'static str;

    fn validate(&self) -> Result<()>;
    fn invalid(message: String) -> Error;
}

impl ConfigFile for DialogPolicy {
    const FILE_NAME: &'static str = "policy.json";
    const ENV_VAR: &'static str = "SYMPTOM_TRIAGE_POLICY";

    fn validate(&self) -> Result<()> {
        DialogPolicy::validate(self)
    }

    fn invalid(message: String) -> Error {
        Error::InvalidPolicy(message)
    }
}

impl ConfigFile for TrainingConfig {
    const FILE_NAME: &'static str = "training.json";
    const ENV_VAR: &'static str = "SYMPTOM_TRIAGE_TRAINING";

    fn validate(&self) -> Result<()> {
        TrainingConfig::validate(self)
    }

    fn invalid(message: String) -> Error {
        Error::InvalidTraining(message)
    }
}

impl ConfigFile for SymptomTable {
    const FILE_NAME: &'static str = "symptoms.json";
    const ENV_VAR: &'static str = "SYMPTOM_TRIAGE_SYMPTOMS";

    fn validate(&self) -> Result<()> {
        SymptomTable::validate(self)
    }

    fn invalid(message: String) -> Error {
        Error::InvalidSymptomTable(message)
    }
}

/// Configuration resolver with deterministic resolution order.
#[derive(Debug)]
pub struct ConfigResolver {
    /// Paths from CLI flags
    cli_paths: ConfigPaths,
}

impl ConfigResolver {
    /// Create a new resolver with CLI paths.
    pub fn new(paths: ConfigPaths) -> Self {
        ConfigResolver { cli_paths: paths }
    }

    /// Create a resolver with no CLI overrides.
    pub fn with_defaults() -> Self {
        ConfigResolver {
            cli_paths: ConfigPaths::default(),
        }
    }

    /// Resolve the config directory path.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        // 1. CLI flag
        if let Some(ref dir) = self.cli_paths.config_dir {
            return Some(dir.clone());
        }

        // 2. SYMPTOM_TRIAGE_CONFIG env var
        if let Ok(dir) = env::var("SYMPTOM_TRIAGE_CONFIG") {
            return Some(PathBuf::from(dir));
        }

        // 3. XDG_CONFIG_HOME/symptom_triage
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(CONFIG_DIR_NAME));
        }

        // 4. ~/.config/symptom_triage (XDG default)
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
    }

    fn resolve_path<T: ConfigFile>(
        &self,
        explicit: Option<&PathBuf>,
    ) -> (Option<PathBuf>, ConfigResolution) {
        if let Some(path) = explicit {
            return (Some(path.clone()), ConfigResolution::CliFlag);
        }

        if let Ok(path) = env::var(T::ENV_VAR) {
            return (Some(PathBuf::from(path)), ConfigResolution::EnvVar);
        }

        if let Some(config_dir) = self.resolve_config_dir() {
            let path = config_dir.join(T::FILE_NAME);
            if path.exists() {
                return (Some(path), ConfigResolution::XdgConfig);
            }
        }

        (None, ConfigResolution::Default)
    }

    /// Resolve the policy.json path.
    pub fn resolve_policy_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        self.resolve_path::<DialogPolicy>(self.cli_paths.policy_path.as_ref())
    }

    /// Resolve the training.json path.
    pub fn resolve_training_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        self.resolve_path::<TrainingConfig>(self.cli_paths.training_path.as_ref())
    }

    /// Resolve the symptoms.json path.
    pub fn resolve_symptoms_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        self.resolve_path::<SymptomTable>(self.cli_paths.symptoms_path.as_ref())
    }

    /// Load the dialog policy from its resolved path or defaults.
    pub fn load_policy(&self) -> Result<(DialogPolicy, ConfigSource)> {
        let (path, resolution) = self.resolve_policy_path();
        load_file(path, resolution)
    }

    /// Load the training config from its resolved path or defaults.
    pub fn load_training(&self) -> Result<(TrainingConfig, ConfigSource)> {
        let (path, resolution) = self.resolve_training_path();
        load_file(path, resolution)
    }

    /// Load the symptom table from its resolved path or defaults.
    pub fn load_symptoms(&self) -> Result<(SymptomTable, ConfigSource)> {
        let (path, resolution) = self.resolve_symptoms_path();
        load_file(path, resolution)
    }
}

fn load_file<T: ConfigFile>(
    path: Option<PathBuf>,
    resolution: ConfigResolution,
) -> Result<(T, ConfigSource)> {
    match path {
        Some(p) => {
            let (value, hash) = read_config::<T>(&p)?;
            Ok((
                value,
                ConfigSource {
                    path: Some(p.to_string_lossy().to_string()),
                    hash: Some(hash),
                    resolution,
                },
            ))
        }
        None => Ok((
            T::default(),
            ConfigSource {
                path: None,
                hash: None,
                resolution: ConfigResolution::Default,
            },
        )),
    }
}

fn read_config<T: ConfigFile>(path: &Path) -> Result<(T, String)> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read {} from {}: {}",
            T::FILE_NAME,
            path.display(),
            e
        ))
    })?;

    let hash = compute_sha256(&content);

    let value: T = serde_json::from_str(&content)
        .map_err(|e| T::invalid(format!("failed to parse {}: {}", path.display(), e)))?;

    value.validate()?;

    Ok((value, hash))
}

/// Compute SHA-256 hash of content.
pub fn compute_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_path_takes_precedence() {
        let tmp = TempDir::new().unwrap();
        let policy = tmp.path().join("custom_policy.json");
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(tmp.path().to_path_buf()),
            policy_path: Some(policy.clone()),
            ..Default::default()
        });
        let (path, resolution) = resolver.resolve_policy_path();
        assert_eq!(path, Some(policy));
        assert_eq!(resolution, ConfigResolution::CliFlag);
    }

    #[test]
    fn test_config_dir_file_is_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("training.json"),
            r#"{"schema_version":"1.0.0","max_iterations":5}"#,
        )
        .unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        });
        let (training, source) = resolver.load_training().unwrap();
        assert_eq!(training.max_iterations, 5);
        assert_eq!(source.resolution, ConfigResolution::XdgConfig);
        assert_eq!(source.hash.as_deref().map(str::len), Some(64));
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            config_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        });
        let (table, source) = resolver.load_symptoms().unwrap();
        assert_eq!(table.len(), SymptomTable::default().len());
        assert_eq!(source.resolution, ConfigResolution::Default);
        assert!(source.path.is_none());
    }

    #[test]
    fn test_invalid_file_is_typed_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("policy.json");
        fs::write(&path, "{ not json").unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            policy_path: Some(path),
            ..Default::default()
        });
        assert!(matches!(resolver.load_policy(), Err(Error::InvalidPolicy(_))));
    }

    #[test]
    fn test_semantic_validation_runs_on_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("policy.json");
        fs::write(
            &path,
            r#"{"schema_version":"1.0.0","confidence_threshold":2.0}"#,
        )
        .unwrap();
        let resolver = ConfigResolver::new(ConfigPaths {
            policy_path: Some(path),
            ..Default::default()
        });
        assert!(matches!(resolver.load_policy(), Err(Error::InvalidPolicy(_))));
    }

    #[test]
    fn test_sha256_is_stable() {
        assert_eq!(
            compute_sha256("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

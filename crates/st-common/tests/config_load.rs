//! End-to-end configuration loading through the public API.

use st_common::config::ConfigResolution;
use st_common::{Config, ConfigPaths, ConfigResolver, SymptomMatching};
use std::fs;
use tempfile::TempDir;

#[test]
fn defaults_load_and_validate() {
    let config = Config::load_defaults().expect("defaults load");
    config.validate().expect("defaults validate");
    assert!(config.snapshot.is_default());
}

#[test]
fn config_dir_overrides_single_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("policy.json"),
        r#"{"schema_version":"1.0.0","matching":"exact","min_evidence":2}"#,
    )
    .unwrap();

    let resolver = ConfigResolver::new(ConfigPaths {
        config_dir: Some(tmp.path().to_path_buf()),
        ..Default::default()
    });
    let config = Config::load(&resolver).expect("load");

    assert_eq!(config.policy.matching, SymptomMatching::Exact);
    assert_eq!(config.policy.min_evidence, 2);
    assert!(!config.snapshot.is_default());
    assert_eq!(config.snapshot.training_source.resolution, ConfigResolution::Default.to_string());
    assert_eq!(config.snapshot.policy_source.resolution, "xdg");
}

#[test]
fn broken_symptom_table_fails_whole_load() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("symptoms.json"),
        r#"{"schema_version":"1.0.0","diseases":{"Flu":[]}}"#,
    )
    .unwrap();

    let resolver = ConfigResolver::new(ConfigPaths {
        config_dir: Some(tmp.path().to_path_buf()),
        ..Default::default()
    });
    let err = Config::load(&resolver).unwrap_err();
    assert_eq!(err.code(), 13);
}

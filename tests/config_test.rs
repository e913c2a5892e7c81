//! Integration tests for configuration file loading.

mod common;

use std::path::PathBuf;

use scriba::config::{load_config, GeneratorKind, Preset};

use common::temp_test_dir;

fn write_config(json: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir();
    let path = dir.path().join("config.json");
    std::fs::write(&path, json).unwrap();
    (dir, path)
}

#[test]
fn test_full_config_file_is_applied() {
    let (_dir, path) = write_config(
        r#"{
            "preset": "light",
            "cache_dir": "/tmp/scriba-it-cache",
            "auto_add": true,
            "auto_push": true
        }"#,
    );

    let config = load_config(Some(&path));
    assert_eq!(config.preset, Preset::Light);
    assert_eq!(config.settings.model, "tinyllama");
    assert_eq!(config.cache_dir, PathBuf::from("/tmp/scriba-it-cache"));
    assert!(config.auto_add);
    assert!(config.auto_push);
}

#[test]
fn test_partial_config_keeps_defaults_for_the_rest() {
    let (_dir, path) = write_config(r#"{"auto_push": true}"#);

    let config = load_config(Some(&path));
    assert_eq!(config.preset, Preset::default());
    assert_eq!(config.settings.generator, GeneratorKind::Rules);
    assert!(!config.auto_add);
    assert!(config.auto_push);
}

#[test]
fn test_generation_overrides_from_file() {
    let (_dir, path) = write_config(
        r#"{
            "preset": "ultra-light",
            "model": "phi3:mini",
            "max_tokens": 48,
            "prompt_template": "Describe: {diff}"
        }"#,
    );

    let config = load_config(Some(&path));
    assert_eq!(config.settings.model, "phi3:mini");
    assert_eq!(config.settings.max_tokens, 48);
    assert_eq!(config.settings.prompt_template, "Describe: {diff}");
    assert_eq!(config.settings.generator, GeneratorKind::Model);
}

#[test]
fn test_invalid_json_falls_back_to_defaults() {
    let (_dir, path) = write_config("{ this is not json");

    let config = load_config(Some(&path));
    assert_eq!(config.preset, Preset::default());
    assert_eq!(config.settings.generator, GeneratorKind::Rules);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = temp_test_dir();
    let config = load_config(Some(&dir.path().join("nope.json")));
    assert_eq!(config.preset, Preset::default());
}

#[test]
fn test_unrecognized_keys_are_ignored() {
    let (_dir, path) = write_config(r#"{"preset": "balanced", "verbosity": 11}"#);

    let config = load_config(Some(&path));
    assert_eq!(config.preset, Preset::Balanced);
}

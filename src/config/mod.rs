//! Configuration loading and resolution.
//!
//! Settings come from three layers, weakest first: the preset's built-in
//! defaults, an optional JSON config file, and CLI overrides applied by the
//! caller. A missing or unparseable config file falls back to defaults with a
//! logged warning rather than aborting.

pub mod presets;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

pub use presets::{GenerationSettings, GeneratorKind, Preset};

/// Recognized keys of the JSON config file. All optional; unrecognized keys
/// are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub preset: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub auto_add: Option<bool>,
    pub auto_push: Option<bool>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub prompt_template: Option<String>,
}

/// Fully resolved configuration handed to the driver.
#[derive(Debug, Clone)]
pub struct Config {
    pub preset: Preset,
    pub settings: GenerationSettings,
    pub cache_dir: PathBuf,
    pub auto_add: bool,
    pub auto_push: bool,
}

impl Default for Config {
    fn default() -> Self {
        let preset = Preset::default();
        Config {
            settings: preset.settings(),
            preset,
            cache_dir: default_cache_dir(),
            auto_add: false,
            auto_push: false,
        }
    }
}

/// Default cache directory: `~/.cache/scriba` (platform equivalent).
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("scriba")
}

/// Config file locations probed when no explicit path is given.
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".scriba").join("config.json"));
    }
    paths.push(PathBuf::from(".scriba.json"));
    paths
}

/// Load configuration, merging the config file over preset defaults.
///
/// `explicit` is the `--config` path if the user passed one. An explicit path
/// that cannot be read still degrades to defaults; the user sees a warning,
/// not a failure, matching the missing-config contract.
pub fn load_config(explicit: Option<&Path>) -> Config {
    let file = match explicit {
        Some(path) => read_config_file(path),
        None => default_config_paths()
            .iter()
            .find_map(|p| read_config_file(p)),
    }
    .unwrap_or_default();

    resolve(file)
}

/// Read and parse a single config file, returning None when absent or invalid.
fn read_config_file(path: &Path) -> Option<ConfigFile> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Could not read config file {}: {e}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(file) => {
            debug!("Loaded config from {}", path.display());
            Some(file)
        }
        Err(e) => {
            warn!(
                "Config file {} is not valid JSON ({e}), using defaults",
                path.display()
            );
            None
        }
    }
}

/// Merge a parsed config file over the preset defaults.
fn resolve(file: ConfigFile) -> Config {
    let preset = match file.preset.as_deref() {
        Some(name) => match name.parse::<Preset>() {
            Ok(p) => p,
            Err(e) => {
                warn!("{e}, using '{}'", Preset::default());
                Preset::default()
            }
        },
        None => Preset::default(),
    };

    let mut settings = preset.settings();
    if let Some(model) = file.model {
        settings.model = model;
        // An explicit model implies the model path even on a rules preset.
        settings.generator = GeneratorKind::Model;
    }
    if let Some(max_tokens) = file.max_tokens {
        settings.max_tokens = max_tokens;
    }
    if let Some(template) = file.prompt_template {
        settings.prompt_template = template;
    }

    Config {
        preset,
        settings,
        cache_dir: file.cache_dir.unwrap_or_else(default_cache_dir),
        auto_add: file.auto_add.unwrap_or(false),
        auto_push: file.auto_push.unwrap_or(false),
    }
}

//! Named generation presets trading speed for quality.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Which implementation produces the commit message.
///
/// A closed set: the rule-based heuristic or the local model runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Rules,
    Model,
}

/// A resolved bundle of generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub generator: GeneratorKind,
    /// Model tag passed to the runtime (unused on the rules path).
    pub model: String,
    /// Upper bound on the length of the kept model output, in words.
    pub max_tokens: u32,
    /// Prompt template with a `{diff}` placeholder.
    pub prompt_template: String,
}

impl GenerationSettings {
    /// Identifier folded into the cache fingerprint.
    ///
    /// Two invocations with the same identifier and diff prefix are
    /// interchangeable, so the rules path collapses to a single id while
    /// model settings key on the model tag.
    pub fn settings_id(&self) -> String {
        match self.generator {
            GeneratorKind::Rules => "rules".to_string(),
            GeneratorKind::Model => format!("model:{}", self.model),
        }
    }
}

const DEFAULT_TEMPLATE: &str =
    "Generate a concise git commit message for these changes:\n{diff}\n\nCommit message:";

const LIGHT_TEMPLATE: &str = "Write a clear git commit message for:\n{diff}\n\nCommit:";

/// Named preset selecting a generation settings bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Rule-based heuristic, no model involved.
    UltraFast,
    /// Smallest usable model.
    UltraLight,
    /// Small model with noticeably better messages.
    Light,
    /// Mid-size model.
    Balanced,
    /// Largest of the supported small models.
    Standard,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::UltraFast => "ultra-fast",
            Preset::UltraLight => "ultra-light",
            Preset::Light => "light",
            Preset::Balanced => "balanced",
            Preset::Standard => "standard",
        }
    }

    /// The settings bundle this preset names.
    pub fn settings(&self) -> GenerationSettings {
        match self {
            Preset::UltraFast => GenerationSettings {
                generator: GeneratorKind::Rules,
                model: String::new(),
                max_tokens: 10,
                prompt_template: DEFAULT_TEMPLATE.to_string(),
            },
            Preset::UltraLight => GenerationSettings {
                generator: GeneratorKind::Model,
                model: "smollm:135m".to_string(),
                max_tokens: 20,
                prompt_template: DEFAULT_TEMPLATE.to_string(),
            },
            Preset::Light => GenerationSettings {
                generator: GeneratorKind::Model,
                model: "tinyllama".to_string(),
                max_tokens: 25,
                prompt_template: LIGHT_TEMPLATE.to_string(),
            },
            Preset::Balanced => GenerationSettings {
                generator: GeneratorKind::Model,
                model: "qwen2.5:0.5b".to_string(),
                max_tokens: 25,
                prompt_template: DEFAULT_TEMPLATE.to_string(),
            },
            Preset::Standard => GenerationSettings {
                generator: GeneratorKind::Model,
                model: "llama3.2:1b".to_string(),
                max_tokens: 30,
                prompt_template: DEFAULT_TEMPLATE.to_string(),
            },
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Preset::UltraFast
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ultra-fast" => Ok(Preset::UltraFast),
            "ultra-light" => Ok(Preset::UltraLight),
            "light" => Ok(Preset::Light),
            "balanced" => Ok(Preset::Balanced),
            "standard" => Ok(Preset::Standard),
            other => Err(format!("unknown preset '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_roundtrip_through_str() {
        for preset in [
            Preset::UltraFast,
            Preset::UltraLight,
            Preset::Light,
            Preset::Balanced,
            Preset::Standard,
        ] {
            assert_eq!(preset.as_str().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        assert!("warp-speed".parse::<Preset>().is_err());
    }

    #[test]
    fn test_ultra_fast_uses_rules_generator() {
        assert_eq!(
            Preset::UltraFast.settings().generator,
            GeneratorKind::Rules
        );
    }

    #[test]
    fn test_model_presets_have_distinct_ids() {
        let ids: Vec<String> = [Preset::UltraLight, Preset::Light, Preset::Balanced, Preset::Standard]
            .iter()
            .map(|p| p.settings().settings_id())
            .collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
    }

    #[test]
    fn test_rules_settings_id_ignores_model_field() {
        let mut settings = Preset::UltraFast.settings();
        settings.model = "whatever".to_string();
        assert_eq!(settings.settings_id(), "rules");
    }

    #[test]
    fn test_templates_contain_diff_placeholder() {
        for preset in [Preset::UltraLight, Preset::Light, Preset::Balanced, Preset::Standard] {
            assert!(preset.settings().prompt_template.contains("{diff}"));
        }
    }
}

//! Model-backed generation via the local ollama runtime.
//!
//! The runtime is an external collaborator: we spawn `ollama run <model>`
//! with the rendered prompt, bound the wait with a timeout, and retry
//! transient failures with exponential backoff.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::config::GenerationSettings;
use crate::error::ModelError;
use crate::generator::prompt::build_prompt;
use crate::generator::retry::retry_with_backoff;
use crate::generator::Generator;
use crate::git::DiffSummary;

/// Default timeout for a single model invocation (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "SCRIBA_MODEL_TIMEOUT";

/// Get the configured timeout duration.
///
/// Reads from SCRIBA_MODEL_TIMEOUT if set, otherwise uses the default.
/// Logs a warning if the variable is set but not a positive integer.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Check that the ollama runtime is installed and responds.
///
/// Uses the `which` crate for cross-platform executable detection.
pub async fn check_ollama_installed() -> Result<(), ModelError> {
    if which::which("ollama").is_err() {
        return Err(ModelError::NotInstalled);
    }

    let version_check = Command::new("ollama")
        .arg("--version")
        .output()
        .await
        .map_err(ModelError::SpawnFailed)?;

    if !version_check.status.success() {
        return Err(ModelError::NotInstalled);
    }

    Ok(())
}

/// Run `ollama run <model> <prompt>` once and return stdout.
async fn run_ollama(model: &str, prompt: &str) -> Result<String, ModelError> {
    let timeout_duration = get_timeout();
    let timeout_secs = timeout_duration.as_secs();

    let mut cmd = Command::new("ollama");
    cmd.arg("run")
        .arg(model)
        .arg(prompt)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = timeout(timeout_duration, cmd.output())
        .await
        .map_err(|_| ModelError::Timeout(timeout_secs))?
        .map_err(ModelError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(ModelError::NonZeroExit { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Trait for executing the model runtime.
///
/// This abstraction allows mocking the subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelExecutor: Send + Sync {
    /// Run the model with the given prompt and return the raw response.
    async fn run(&self, model: &str, prompt: &str) -> Result<String, ModelError>;
}

/// Default executor that calls the real ollama binary.
pub struct OllamaExecutor;

#[async_trait]
impl ModelExecutor for OllamaExecutor {
    async fn run(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        run_ollama(model, prompt).await
    }
}

/// Generator that delegates to the model runtime.
pub struct ModelGenerator {
    settings: GenerationSettings,
}

impl ModelGenerator {
    pub fn new(settings: GenerationSettings) -> Self {
        ModelGenerator { settings }
    }
}

#[async_trait]
impl Generator for ModelGenerator {
    async fn generate(&self, diff: &DiffSummary) -> Result<String, ModelError> {
        generate_with_retry_impl(&self.settings, diff, &OllamaExecutor).await
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Internal implementation that accepts any executor (for testing).
pub(crate) async fn generate_with_retry_impl<E: ModelExecutor>(
    settings: &GenerationSettings,
    diff: &DiffSummary,
    executor: &E,
) -> Result<String, ModelError> {
    let prompt = build_prompt(&settings.prompt_template, &diff.diff_text);
    let max_words = settings.max_tokens as usize;

    retry_with_backoff(
        || async {
            let raw = executor.run(&settings.model, &prompt).await?;
            let message = clean_message(&raw, max_words);
            if message.is_empty() {
                return Err(ModelError::EmptyOutput);
            }
            Ok(message)
        },
        |e| ModelError::RetriesExhausted(Box::new(e)),
    )
    .await
}

/// Normalize raw model output into a commit message.
///
/// Takes the first non-empty line, strips wrapping quotes and markdown
/// fences, and bounds the length to `max_words`.
pub fn clean_message(raw: &str, max_words: usize) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("```"))
        .unwrap_or("");

    let line = line
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();

    let words: Vec<&str> = line.split_whitespace().collect();
    if max_words > 0 && words.len() > max_words {
        words[..max_words].join(" ")
    } else {
        words.join(" ")
    }
}

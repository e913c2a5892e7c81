//! Error types for scriba modules using thiserror.

use thiserror::Error;

/// Errors from git subprocess operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository. Run scriba from within a git repository.")]
    NotARepository,

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("No staged changes found. Stage files with 'git add' or run with --add-all/-a.")]
    NothingStaged,

    #[error("No changes found. Working tree is clean.")]
    NoChanges,

    #[error("Push rejected: {stderr}. You may need to pull first or use --force-push.")]
    PushRejected { stderr: String },

    #[error("No remote repository configured.")]
    NoRemote,
}

/// Errors from the model-backed generator.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error(
        "Ollama runtime not found. Install from https://ollama.com and pull a model with: ollama pull <model>"
    )]
    NotInstalled,

    #[error("Failed to spawn ollama process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Model process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Ollama exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Model returned an empty message")]
    EmptyOutput,

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ModelError>),
}

/// Errors from cache maintenance operations.
///
/// Only surfaced by the explicit `cache` subcommands; during the commit flow
/// cache failures degrade to a miss or a skipped store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete cache entry {path}: {source}")]
    DeleteEntry {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

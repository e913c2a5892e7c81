//! Orchestration of the commit flow.
//!
//! The driver owns no state: the git interface, the generator, and the cache
//! handle are all injected, which keeps every side effect mockable. The flow
//! itself is a straight line from diff extraction through cache lookup to the
//! commit and push side effects.

use anyhow::Result;
use tracing::{debug, warn};

use crate::cache::{Fingerprint, MessageCache};
use crate::config::Config;
use crate::generator::{rules, Generator};
use crate::git::{parse_diff, GitCli};
use crate::error::GitError;

/// Flags controlling a single run, resolved from the CLI.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub add_all: bool,
    pub push: bool,
    pub force_push: bool,
    pub no_verify: bool,
    pub dry_run: bool,
    pub quiet: bool,
}

/// What a run produced, for reporting and tests.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub message: String,
    pub from_cache: bool,
    pub committed: bool,
    pub pushed: bool,
}

/// Run the full flow: stage, generate (or recall) a message, commit, push.
///
/// `cache` is `None` when caching is disabled; the cache handle otherwise
/// travels with the call rather than living in ambient state.
pub async fn run_commit_flow(
    config: &Config,
    opts: &RunOptions,
    git: &dyn GitCli,
    generator: &dyn Generator,
    cache: Option<&MessageCache>,
) -> Result<Outcome> {
    let status = |line: &str| {
        if !opts.quiet {
            println!("{line}");
        }
    };

    if !git.is_repository() {
        return Err(GitError::NotARepository.into());
    }

    if opts.add_all || config.auto_add {
        status("Staging all files...");
        git.add_all()?;
    }

    let diff_text = resolve_diff(git, opts.add_all || config.auto_add)?;
    let summary = parse_diff(&diff_text);
    debug!(
        "Diff: {} files, {} additions, {} deletions",
        summary.changed_files.len(),
        summary.additions,
        summary.deletions
    );

    let fingerprint = Fingerprint::compute(&config.settings.settings_id(), &diff_text);

    let mut from_cache = false;
    let message = match cache.and_then(|c| c.lookup(&fingerprint)) {
        Some(cached) => {
            status("Using cached commit message");
            from_cache = true;
            cached
        }
        None => {
            status(&format!(
                "Generating commit message ({})...",
                generator.name()
            ));
            let message = match generator.generate(&summary).await {
                Ok(m) => m,
                Err(e) if generator.name() != "rules" => {
                    warn!("Model generation failed: {e}");
                    status("Model generation failed; using rule-based message");
                    rules::generate_message(&summary)
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(cache) = cache {
                cache.store(
                    &fingerprint,
                    &message,
                    config.preset.as_str(),
                    diff_text.len(),
                );
            }
            message
        }
    };

    if opts.dry_run {
        status("Dry run - no commit created");
        return Ok(Outcome {
            message,
            from_cache,
            committed: false,
            pushed: false,
        });
    }

    git.commit(&message, opts.no_verify)?;
    status(&format!("Committed: {message}"));

    let mut pushed = false;
    if opts.push || opts.force_push || config.auto_push {
        status("Pushing to remote...");
        git.push(opts.force_push)?;
        status("Pushed to remote");
        pushed = true;
    }

    Ok(Outcome {
        message,
        from_cache,
        committed: true,
        pushed,
    })
}

/// Pick the diff that feeds generation.
///
/// The staging area wins. When it is empty but unstaged changes exist and the
/// user did not ask for auto-staging, that is a usage error; a clean tree is
/// a no-op error; otherwise the unstaged diff is used.
fn resolve_diff(git: &dyn GitCli, auto_staged: bool) -> Result<String, GitError> {
    let staged = git.staged_diff()?;
    if !staged.is_empty() {
        return Ok(staged);
    }

    let unstaged = git.unstaged_diff()?;
    if unstaged.is_empty() {
        return Err(GitError::NoChanges);
    }
    if !auto_staged {
        return Err(GitError::NothingStaged);
    }
    Ok(unstaged)
}

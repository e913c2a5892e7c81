//! Git side effects via the system `git` binary.
//!
//! All operations shell out to `git`, inheriting the user's existing git
//! config, hooks, SSH agent, and credential store.

use std::process::{Command, Output};

use tracing::debug;

use crate::error::GitError;

/// Interface over the git operations the driver performs.
///
/// This abstraction allows mocking the git subprocess in tests.
#[cfg_attr(test, mockall::automock)]
pub trait GitCli {
    /// Whether the current directory is inside a git repository.
    fn is_repository(&self) -> bool;

    /// Unified diff of the staging area (`git diff --cached`). Empty string
    /// when nothing is staged.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Unified diff of unstaged changes (`git diff`).
    fn unstaged_diff(&self) -> Result<String, GitError>;

    /// Stage all modified, new, and deleted files (`git add -A`).
    fn add_all(&self) -> Result<(), GitError>;

    /// Create a commit with the given message.
    fn commit(&self, message: &str, no_verify: bool) -> Result<(), GitError>;

    /// Push the current branch to `origin`, setting the upstream on first push.
    fn push(&self, force: bool) -> Result<(), GitError>;
}

/// Default implementation that calls the real `git` binary.
///
/// Operates on the current directory unless constructed with [`SystemGit::in_dir`].
#[derive(Default)]
pub struct SystemGit {
    workdir: Option<std::path::PathBuf>,
}

impl SystemGit {
    /// Run git against an explicit repository directory (`git -C <dir>`).
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        SystemGit {
            workdir: Some(dir.into()),
        }
    }

    fn run(&self, args: &[&str], operation: &str) -> Result<Output, GitError> {
        debug!("git {}", args.join(" "));
        let mut cmd = Command::new("git");
        if let Some(ref dir) = self.workdir {
            cmd.arg("-C").arg(dir);
        }
        cmd.args(args)
            .output()
            .map_err(|e| GitError::SpawnFailed {
                operation: operation.to_string(),
                source: e,
            })
    }

    /// Run a git command, mapping non-zero exit to `CommandFailed`.
    fn run_checked(&self, args: &[&str], operation: &str) -> Result<Output, GitError> {
        let output = self.run(args, operation)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                stderr,
            });
        }
        Ok(output)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        let output = self.run_checked(&["branch", "--show-current"], "branch")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitCli for SystemGit {
    fn is_repository(&self) -> bool {
        self.run(&["rev-parse", "--git-dir"], "rev-parse")
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn staged_diff(&self) -> Result<String, GitError> {
        let output = self.run_checked(&["diff", "--cached"], "diff --cached")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn unstaged_diff(&self) -> Result<String, GitError> {
        let output = self.run_checked(&["diff"], "diff")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn add_all(&self) -> Result<(), GitError> {
        self.run_checked(&["add", "-A"], "add")?;
        Ok(())
    }

    fn commit(&self, message: &str, no_verify: bool) -> Result<(), GitError> {
        let mut args = vec!["commit", "-m", message];
        if no_verify {
            args.push("--no-verify");
        }
        self.run_checked(&args, "commit")?;
        Ok(())
    }

    fn push(&self, force: bool) -> Result<(), GitError> {
        let remotes = self.run_checked(&["remote"], "remote")?;
        if String::from_utf8_lossy(&remotes.stdout).trim().is_empty() {
            return Err(GitError::NoRemote);
        }

        let branch = self.current_branch()?;

        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend(["origin", branch.as_str()]);

        let output = self.run(&args, "push")?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        // First push of a new branch: retry once with --set-upstream.
        if stderr.contains("no upstream branch") {
            let mut retry_args = vec!["push", "--set-upstream"];
            if force {
                retry_args.push("--force");
            }
            retry_args.extend(["origin", branch.as_str()]);

            let retry = self.run(&retry_args, "push")?;
            if retry.status.success() {
                return Ok(());
            }
            let stderr = String::from_utf8_lossy(&retry.stderr).trim().to_string();
            return Err(GitError::PushRejected { stderr });
        }

        Err(GitError::PushRejected { stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_git_version_succeeds() {
        // git --version should always succeed
        let git = SystemGit::default();
        assert!(git.run_checked(&["--version"], "version check").is_ok());
    }

    #[test]
    fn test_run_git_invalid_command_fails() {
        let git = SystemGit::default();
        let result = git.run_checked(&["not-a-real-command"], "invalid");
        assert!(matches!(result, Err(GitError::CommandFailed { .. })));
    }
}

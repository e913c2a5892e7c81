//! Rule-based commit message synthesis.
//!
//! A deterministic, zero-dependency fallback and the default fast path:
//! classify the change from file paths and diff shape, then render a short
//! message from a fixed template set.

use async_trait::async_trait;

use crate::error::ModelError;
use crate::generator::Generator;
use crate::git::{ChangedFile, DiffSummary, FileStatus};

/// File-path markers checked in order; the first match wins.
const TEST_MARKERS: &[&str] = &["test", "spec", "__tests__"];
const DEPS_FILES: &[&str] = &[
    "cargo.toml",
    "cargo.lock",
    "package.json",
    "package-lock.json",
    "requirements.txt",
    "go.mod",
];
const DOCS_MARKERS: &[&str] = &["readme", ".md", "docs/", "changelog"];
const CONFIG_MARKERS: &[&str] = &[
    ".json",
    ".yaml",
    ".yml",
    ".toml",
    ".env",
    "config",
    "settings",
    "dockerfile",
    "makefile",
];

/// Diff-content words suggesting a bug fix.
const FIX_WORDS: &[&str] = &["fix", "bug", "error", "issue"];

/// Preferred extensions when picking the file to name in the message.
const SOURCE_EXTENSIONS: &[&str] = &[".rs", ".py", ".ts", ".tsx", ".js", ".go", ".java", ".c", ".cpp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeType {
    Tests,
    Dependencies,
    Docs,
    Config,
    Fix,
    Feature,
    Removal,
    Update,
}

/// The rule-based generator. Stateless; never fails.
pub struct RulesGenerator;

#[async_trait]
impl Generator for RulesGenerator {
    async fn generate(&self, diff: &DiffSummary) -> Result<String, ModelError> {
        Ok(generate_message(diff))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

/// Synthesize a commit message from the diff summary.
pub fn generate_message(diff: &DiffSummary) -> String {
    let files = &diff.changed_files;

    if files.is_empty() {
        return size_fallback(diff);
    }

    match detect_change_type(diff) {
        ChangeType::Tests => tests_message(files),
        ChangeType::Dependencies => "Update dependencies".to_string(),
        ChangeType::Docs => "Update documentation".to_string(),
        ChangeType::Config => "Update configuration".to_string(),
        ChangeType::Fix => {
            if files.len() == 1 {
                format!("Fix issue in {}", files[0].path)
            } else {
                "Fix multiple issues".to_string()
            }
        }
        ChangeType::Feature => {
            if files.len() == 1 {
                format!("Add feature to {}", primary_file(files))
            } else {
                format!("Add new features ({} files)", files.len())
            }
        }
        ChangeType::Removal => removal_message(files),
        ChangeType::Update => update_message(files),
    }
}

/// Classify the change, file paths first, then diff content, then shape.
fn detect_change_type(diff: &DiffSummary) -> ChangeType {
    let files = &diff.changed_files;
    let joined = files
        .iter()
        .map(|f| f.path.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    if TEST_MARKERS.iter().any(|m| joined.contains(m)) {
        return ChangeType::Tests;
    }
    if files.iter().any(|f| {
        let name = f.path.rsplit('/').next().unwrap_or(&f.path).to_lowercase();
        DEPS_FILES.contains(&name.as_str())
    }) {
        return ChangeType::Dependencies;
    }
    if DOCS_MARKERS.iter().any(|m| joined.contains(m)) {
        return ChangeType::Docs;
    }
    if CONFIG_MARKERS.iter().any(|m| joined.contains(m)) {
        return ChangeType::Config;
    }

    let content = diff.diff_text.to_lowercase();
    if FIX_WORDS.iter().any(|w| content.contains(w)) {
        return ChangeType::Fix;
    }

    if diff.additions > diff.deletions * 2 {
        ChangeType::Feature
    } else if diff.deletions > diff.additions * 2 {
        ChangeType::Removal
    } else {
        ChangeType::Update
    }
}

/// Fallback for diffs with no recognizable file headers.
fn size_fallback(diff: &DiffSummary) -> String {
    match diff.additions + diff.deletions {
        0 => "Minor changes".to_string(),
        1..=9 => "Small updates".to_string(),
        10..=49 => "Medium updates".to_string(),
        _ => "Major changes".to_string(),
    }
}

fn all_have_status(files: &[ChangedFile], status: FileStatus) -> bool {
    files.iter().all(|f| f.status == status)
}

fn tests_message(files: &[ChangedFile]) -> String {
    if all_have_status(files, FileStatus::Deleted) {
        return if files.len() == 1 {
            format!("Remove tests for {}", test_subject(&files[0].path))
        } else {
            format!("Remove {} test files", files.len())
        };
    }

    if files.len() == 1 {
        let verb = if files[0].status == FileStatus::Added {
            "Add"
        } else {
            "Update"
        };
        format!("{verb} tests for {}", test_subject(&files[0].path))
    } else {
        format!("Update tests for {} modules", files.len())
    }
}

/// Strip test decorations from a path to name what is being tested.
fn test_subject(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.rsplit_once('.').map_or(name, |(s, _)| s);
    stem.trim_start_matches("test_")
        .trim_end_matches("_test")
        .trim_end_matches(".test")
        .to_string()
}

fn removal_message(files: &[ChangedFile]) -> String {
    if files.len() == 1 {
        if files[0].status == FileStatus::Deleted {
            format!("Remove {}", files[0].path)
        } else {
            format!("Remove content from {}", files[0].path)
        }
    } else {
        format!("Remove content from {} files", files.len())
    }
}

fn update_message(files: &[ChangedFile]) -> String {
    match files.len() {
        1 => format!("Update {}", files[0].path),
        2..=3 => {
            let names: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
            format!("Update {}", names.join(", "))
        }
        n => format!("Update {n} files"),
    }
}

/// Pick the most salient file to name in the message.
fn primary_file(files: &[ChangedFile]) -> &str {
    for ext in SOURCE_EXTENSIONS {
        if let Some(f) = files.iter().find(|f| f.path.ends_with(ext)) {
            return &f.path;
        }
    }
    &files[0].path
}

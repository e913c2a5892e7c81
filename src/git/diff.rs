//! Parsing of unified diff text into a structured summary.

use std::fmt;

use regex_lite::Regex;

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A file that appears in the diff.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedFile {
    pub path: String,
    pub status: FileStatus,
}

/// Structured view over a unified diff.
#[derive(Debug, Clone)]
pub struct DiffSummary {
    pub diff_text: String,
    pub changed_files: Vec<ChangedFile>,
    pub additions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn is_empty(&self) -> bool {
        self.diff_text.trim().is_empty()
    }
}

/// Parse `git diff` output into a [`DiffSummary`].
///
/// File paths come from the `diff --git a/X b/Y` headers; the status of each
/// file is refined by the mode lines that follow (`new file mode`,
/// `deleted file mode`, `rename from`). Content lines starting with a single
/// `+`/`-` are counted as additions/deletions.
pub fn parse_diff(diff_text: &str) -> DiffSummary {
    let header = Regex::new(r"^diff --git a/(.*?) b/(.*)$").expect("valid regex");

    let mut changed_files: Vec<ChangedFile> = Vec::new();
    let mut additions = 0usize;
    let mut deletions = 0usize;

    for line in diff_text.lines() {
        if let Some(caps) = header.captures(line) {
            // The b/ side names the file as it exists after the change.
            let path = caps.get(2).map_or("", |m| m.as_str()).to_string();
            changed_files.push(ChangedFile {
                path,
                status: FileStatus::Modified,
            });
            continue;
        }

        if let Some(current) = changed_files.last_mut() {
            if line.starts_with("new file mode") {
                current.status = FileStatus::Added;
                continue;
            }
            if line.starts_with("deleted file mode") {
                current.status = FileStatus::Deleted;
                continue;
            }
            if line.starts_with("rename from ") {
                current.status = FileStatus::Renamed;
                continue;
            }
        }

        if line.starts_with('+') && !line.starts_with("+++") {
            additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            deletions += 1;
        }
    }

    DiffSummary {
        diff_text: diff_text.to_string(),
        changed_files,
        additions,
        deletions,
    }
}

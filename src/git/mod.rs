//! Git integration: subprocess operations and diff extraction.

pub mod cli;
pub mod diff;

pub use cli::{GitCli, SystemGit};
pub use diff::{parse_diff, ChangedFile, DiffSummary, FileStatus};

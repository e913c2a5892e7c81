//! Commit message generation.
//!
//! Two implementations behind one trait: a pure rule-based heuristic and a
//! local model runtime invoked as a subprocess. Selection is by the closed
//! [`GeneratorKind`](crate::config::GeneratorKind) carried in the resolved
//! settings.

pub mod model;
pub mod prompt;
pub mod retry;
pub mod rules;

use async_trait::async_trait;

use crate::config::{GenerationSettings, GeneratorKind};
use crate::error::ModelError;
use crate::git::DiffSummary;

pub use model::ModelGenerator;
pub use rules::RulesGenerator;

/// Interface over commit message generation.
///
/// This abstraction allows mocking generation in driver tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a commit message for the given changes.
    async fn generate(&self, diff: &DiffSummary) -> Result<String, ModelError>;

    /// Human-readable name for status output.
    fn name(&self) -> &'static str;
}

/// Select the generator the settings ask for.
pub fn select(settings: &GenerationSettings) -> Box<dyn Generator> {
    match settings.generator {
        GeneratorKind::Rules => Box::new(RulesGenerator),
        GeneratorKind::Model => Box::new(ModelGenerator::new(settings.clone())),
    }
}

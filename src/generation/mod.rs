//! Text-generation collaborators
//!
//! Two collaborators feed the graph:
//! - an entity generator that lists sub-entities for a seed label
//!   (consumed by node expansion)
//! - a graph extractor that turns a whole document into nodes and links
//!   (consumed by regeneration)
//!
//! Implementations:
//! - `CommandClient`: spawns a configured command and talks over stdin/stdout (production)
//! - `MockGenerator` / `MockExtractor`: return preconfigured responses (testing)
//! - `Unconfigured`: fails every call (no backend configured)

mod command;
mod mock;
pub mod prompts;

pub use command::{extract_graph_json, CommandClient};
pub use mock::{MockExtractor, MockGenerator};

use async_trait::async_trait;

/// Errors from generation collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("generator not available: {0}")]
    Unavailable(String),
    #[error("generation failed: {0}")]
    InvocationFailed(String),
    #[error("generation timed out after {0}s")]
    Timeout(u64),
    #[error("response parse error: {0}")]
    ParseError(String),
}

/// Produces a newline-delimited `"Label (Type)"` list for a seed label.
///
/// The output carries no schema guarantee; callers run it through
/// [`crate::parser::parse_entities`].
#[async_trait]
pub trait EntityGenerator: Send + Sync {
    async fn generate(&self, seed_label: &str) -> Result<String, GenerationError>;
}

/// Extracts a full graph from document text.
///
/// The result is expected to look like `{nodes: [...], links: [...]}` but
/// is not guaranteed to be referentially consistent; callers run it
/// through [`crate::Graph::validate`].
#[async_trait]
pub trait GraphExtractor: Send + Sync {
    async fn extract(&self, document: &str) -> Result<serde_json::Value, GenerationError>;
}

/// Stand-in used when no generation backend is configured; every call
/// fails as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl EntityGenerator for Unconfigured {
    async fn generate(&self, _seed_label: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(
            "no generation command configured".to_string(),
        ))
    }
}

#[async_trait]
impl GraphExtractor for Unconfigured {
    async fn extract(&self, _document: &str) -> Result<serde_json::Value, GenerationError> {
        Err(GenerationError::Unavailable(
            "no generation command configured".to_string(),
        ))
    }
}

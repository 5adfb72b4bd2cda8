//! Storage trait definitions

use super::record::{NewProject, ProjectId, ProjectRecord, ProjectUpdate};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for project document stores
///
/// A project record holds the mirrored (possibly stale) knowledge graph of
/// a research session alongside the session's document and transcript.
/// Implementations must be thread-safe (Send + Sync): mirroring runs on
/// background tasks.
pub trait ProjectStore: Send + Sync {
    /// Insert a new project, assigning its id and timestamps
    fn create_project(&self, project: NewProject) -> StorageResult<ProjectRecord>;

    /// Load a project by id
    fn get_project(&self, id: &ProjectId) -> StorageResult<Option<ProjectRecord>>;

    /// List an owner's projects, newest first
    fn list_projects(&self, owner_id: &str) -> StorageResult<Vec<ProjectRecord>>;

    /// Apply the fields present in `update`; errors with `ProjectNotFound`
    /// when the project does not exist
    fn update_project(
        &self,
        id: &ProjectId,
        update: &ProjectUpdate,
    ) -> StorageResult<ProjectRecord>;

    /// Delete a project, returning whether it existed
    fn delete_project(&self, id: &ProjectId) -> StorageResult<bool>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: ProjectStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}

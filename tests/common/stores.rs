//! Store doubles

use kgraph::{
    NewProject, ProjectId, ProjectRecord, ProjectStore, ProjectUpdate, StorageError, StorageResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store that fails every call and counts attempted writes
#[derive(Debug, Default)]
pub struct FailingStore {
    updates: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_attempts(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn down<T>() -> StorageResult<T> {
        Err(StorageError::Unavailable("store is down".to_string()))
    }
}

impl ProjectStore for FailingStore {
    fn create_project(&self, _project: NewProject) -> StorageResult<ProjectRecord> {
        Self::down()
    }

    fn get_project(&self, _id: &ProjectId) -> StorageResult<Option<ProjectRecord>> {
        Self::down()
    }

    fn list_projects(&self, _owner_id: &str) -> StorageResult<Vec<ProjectRecord>> {
        Self::down()
    }

    fn update_project(
        &self,
        _id: &ProjectId,
        _update: &ProjectUpdate,
    ) -> StorageResult<ProjectRecord> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Self::down()
    }

    fn delete_project(&self, _id: &ProjectId) -> StorageResult<bool> {
        Self::down()
    }
}

//! In-memory project store

use super::record::{generate_thread_id, NewProject, ProjectId, ProjectRecord, ProjectUpdate};
use super::traits::{ProjectStore, StorageError, StorageResult};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// DashMap-backed store for tests and store-less sessions. Records carry
/// an insertion sequence so listing order is stable within a timestamp.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: DashMap<ProjectId, (u64, ProjectRecord)>,
    sequence: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectStore for MemoryStore {
    fn create_project(&self, project: NewProject) -> StorageResult<ProjectRecord> {
        let now = Utc::now();
        let knowledge_graph = match &project.knowledge_graph {
            Some(graph) => Some(serde_json::to_value(graph)?),
            None => None,
        };
        let record = ProjectRecord {
            id: ProjectId::new(),
            owner_id: project.owner_id,
            thread_id: project.thread_id.unwrap_or_else(generate_thread_id),
            title: project.title,
            generated_document: project.generated_document,
            chat_history: project.chat_history,
            knowledge_graph,
            created_at: now,
            updated_at: now,
        };

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.projects.insert(record.id.clone(), (seq, record.clone()));
        Ok(record)
    }

    fn get_project(&self, id: &ProjectId) -> StorageResult<Option<ProjectRecord>> {
        Ok(self.projects.get(id).map(|entry| entry.value().1.clone()))
    }

    fn list_projects(&self, owner_id: &str) -> StorageResult<Vec<ProjectRecord>> {
        let mut owned: Vec<(u64, ProjectRecord)> = self
            .projects
            .iter()
            .filter(|entry| entry.value().1.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        owned.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(owned.into_iter().map(|(_, record)| record).collect())
    }

    fn update_project(
        &self,
        id: &ProjectId,
        update: &ProjectUpdate,
    ) -> StorageResult<ProjectRecord> {
        let mut entry = self
            .projects
            .get_mut(id)
            .ok_or_else(|| StorageError::ProjectNotFound(id.to_string()))?;
        update.apply_to(&mut entry.1)?;
        Ok(entry.1.clone())
    }

    fn delete_project(&self, id: &ProjectId) -> StorageResult<bool> {
        Ok(self.projects.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, Group, Node};

    #[test]
    fn list_is_newest_first_and_scoped_to_owner() {
        let store = MemoryStore::new();
        let a = store.create_project(NewProject::new("u1", "a")).unwrap();
        let b = store.create_project(NewProject::new("u1", "b")).unwrap();
        store.create_project(NewProject::new("u2", "c")).unwrap();

        let titles: Vec<String> = store
            .list_projects("u1")
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["b", "a"]);
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn update_and_delete() {
        let store = MemoryStore::new();
        let created = store.create_project(NewProject::new("u1", "t")).unwrap();
        let graph = Graph {
            nodes: vec![Node::new("x", "X", Group::Disease)],
            links: Vec::new(),
        };

        let updated = store
            .update_project(&created.id, &ProjectUpdate::knowledge_graph(graph.clone()))
            .unwrap();
        assert_eq!(updated.graph(), graph);

        assert!(store.delete_project(&created.id).unwrap());
        assert!(matches!(
            store.update_project(&created.id, &ProjectUpdate::default()),
            Err(StorageError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn thread_id_is_kept_when_supplied() {
        let store = MemoryStore::new();
        let created = store
            .create_project(NewProject::new("u1", "t").with_thread_id("thread-9"))
            .unwrap();
        assert_eq!(created.thread_id, "thread-9");
    }
}

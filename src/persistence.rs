//! Best-effort mirroring of the live graph to the project store
//!
//! Mirroring is a capability: it happens only when a store is configured
//! and a project is bound to the session. A write failure is logged and
//! dropped; the in-memory graph stays authoritative.

use crate::graph::Graph;
use crate::storage::{ProjectId, ProjectStore, ProjectUpdate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Capability gate between a session and its optional store
///
/// Jobs are numbered as they are issued. A job only writes if no later job
/// for the same project has written first, so snapshots that finish out
/// of order never overwrite a newer one. Jobs for different projects never
/// skip each other.
pub struct PersistenceBridge {
    store: Option<Arc<dyn ProjectStore>>,
    binding: Mutex<Option<ProjectId>>,
    issued: AtomicU64,
    written: Arc<Mutex<HashMap<ProjectId, u64>>>,
}

impl PersistenceBridge {
    /// A bridge with no store; every mirror request is skipped
    pub fn disabled() -> Self {
        Self {
            store: None,
            binding: Mutex::new(None),
            issued: AtomicU64::new(0),
            written: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self {
            store: Some(store),
            binding: Mutex::new(None),
            issued: AtomicU64::new(0),
            written: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> Option<&Arc<dyn ProjectStore>> {
        self.store.as_ref()
    }

    /// Bind the session to a project, returning the previous binding
    pub fn bind(&self, project_id: ProjectId) -> Option<ProjectId> {
        self.binding.lock().unwrap().replace(project_id)
    }

    pub fn unbind(&self) -> Option<ProjectId> {
        self.binding.lock().unwrap().take()
    }

    pub fn bound_project(&self) -> Option<ProjectId> {
        self.binding.lock().unwrap().clone()
    }

    /// Whether mirror requests currently produce writes
    pub fn is_active(&self) -> bool {
        self.store.is_some() && self.binding.lock().unwrap().is_some()
    }

    /// Snapshot `graph` into a write job, or `None` when mirroring is off
    pub fn mirror_job(&self, graph: &Graph) -> Option<MirrorJob> {
        let Some(store) = &self.store else {
            debug!("no project store, skipping mirror");
            return None;
        };
        let Some(project_id) = self.bound_project() else {
            debug!("no project bound, skipping mirror");
            return None;
        };
        Some(MirrorJob {
            store: Arc::clone(store),
            project_id,
            graph: graph.clone(),
            sequence: self.issued.fetch_add(1, Ordering::SeqCst) + 1,
            written: Arc::clone(&self.written),
        })
    }
}

impl Default for PersistenceBridge {
    fn default() -> Self {
        Self::disabled()
    }
}

/// One pending write of a graph snapshot
pub struct MirrorJob {
    store: Arc<dyn ProjectStore>,
    project_id: ProjectId,
    graph: Graph,
    sequence: u64,
    written: Arc<Mutex<HashMap<ProjectId, u64>>>,
}

impl MirrorJob {
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Perform the write. Returns whether it wrote; failures are logged
    /// here and go no further.
    pub fn run(self) -> bool {
        let mut written = self.written.lock().unwrap();
        if written.get(&self.project_id).is_some_and(|&last| last >= self.sequence) {
            debug!(
                project_id = %self.project_id,
                sequence = self.sequence,
                "newer snapshot already mirrored"
            );
            return false;
        }

        let nodes = self.graph.node_count();
        let links = self.graph.link_count();
        match self
            .store
            .update_project(&self.project_id, &ProjectUpdate::knowledge_graph(self.graph))
        {
            Ok(_) => {
                written.insert(self.project_id.clone(), self.sequence);
                debug!(project_id = %self.project_id, nodes, links, "mirrored graph");
                true
            }
            Err(e) => {
                warn!(project_id = %self.project_id, error = %e, "failed to mirror graph");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Group, Node};
    use crate::storage::{MemoryStore, NewProject};

    fn graph() -> Graph {
        Graph {
            nodes: vec![Node::new("a", "DrugX", Group::Product)],
            links: Vec::new(),
        }
    }

    #[test]
    fn disabled_bridge_never_mirrors() {
        let bridge = PersistenceBridge::disabled();
        bridge.bind(ProjectId::from("p1"));
        assert!(!bridge.is_active());
        assert!(bridge.mirror_job(&graph()).is_none());
    }

    #[test]
    fn unbound_bridge_skips() {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        assert!(!bridge.is_active());
        assert!(bridge.mirror_job(&graph()).is_none());
    }

    #[test]
    fn bound_bridge_writes_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let project = store.create_project(NewProject::new("u1", "t")).unwrap();
        let bridge = PersistenceBridge::new(store.clone());
        assert!(bridge.bind(project.id.clone()).is_none());

        let job = bridge.mirror_job(&graph()).unwrap();
        assert_eq!(job.project_id(), &project.id);
        assert!(job.run());

        let stored = store.get_project(&project.id).unwrap().unwrap();
        assert_eq!(stored.graph(), graph());
    }

    #[test]
    fn failed_write_is_swallowed() {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        bridge.bind(ProjectId::from("missing"));

        let job = bridge.mirror_job(&graph()).unwrap();
        assert!(!job.run());
    }

    #[test]
    fn stale_snapshot_does_not_overwrite_newer() {
        let store = Arc::new(MemoryStore::new());
        let project = store.create_project(NewProject::new("u1", "t")).unwrap();
        let bridge = PersistenceBridge::new(store.clone());
        bridge.bind(project.id.clone());

        let older = bridge.mirror_job(&graph()).unwrap();
        let newer = bridge.mirror_job(&Graph::default()).unwrap();
        assert!(newer.run());
        assert!(!older.run());

        let stored = store.get_project(&project.id).unwrap().unwrap();
        assert!(stored.graph().is_empty());
    }

    #[test]
    fn pending_write_survives_project_switch() {
        let store = Arc::new(MemoryStore::new());
        let first = store.create_project(NewProject::new("u1", "first")).unwrap();
        let second = store.create_project(NewProject::new("u1", "second")).unwrap();
        let bridge = PersistenceBridge::new(store.clone());

        bridge.bind(first.id.clone());
        let pending = bridge.mirror_job(&graph()).unwrap();
        bridge.bind(second.id.clone());
        assert!(bridge.mirror_job(&Graph::default()).unwrap().run());
        assert!(pending.run());

        assert_eq!(store.get_project(&first.id).unwrap().unwrap().graph(), graph());
        assert!(store.get_project(&second.id).unwrap().unwrap().graph().is_empty());
    }

    #[test]
    fn unbind_returns_previous_binding() {
        let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
        bridge.bind(ProjectId::from("p1"));
        assert_eq!(bridge.bind(ProjectId::from("p2")), Some(ProjectId::from("p1")));
        assert_eq!(bridge.unbind(), Some(ProjectId::from("p2")));
        assert!(bridge.bound_project().is_none());
    }
}

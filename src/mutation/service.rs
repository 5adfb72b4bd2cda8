//! The session's single authoritative graph and the operations on it

use super::epoch::SessionEpoch;
use super::guard::{ExpansionGuard, RegenerationGuard};
use super::{MutationError, MutationResult, MutationState};
use crate::chat::{ChatMessage, ChatNotifier};
use crate::generation::{EntityGenerator, GraphExtractor};
use crate::graph::{Graph, NodeId};
use crate::parser::parse_entities;
use crate::persistence::PersistenceBridge;
use crate::storage::{ProjectId, StorageError, StorageResult};
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Owns the live graph of one research session.
///
/// Every operation reads and writes the graph held here, never a copy
/// taken before an await. Side effects of a successful mutation (chat
/// note, store mirror) run as background tasks; `settle` waits for them.
pub struct MutationService {
    graph: Mutex<Graph>,
    epoch: SessionEpoch,
    in_flight: DashMap<NodeId, ()>,
    regenerating: AtomicBool,
    generator: Arc<dyn EntityGenerator>,
    extractor: Arc<dyn GraphExtractor>,
    notifier: Option<Arc<dyn ChatNotifier>>,
    persistence: PersistenceBridge,
    background: Mutex<JoinSet<()>>,
}

impl MutationService {
    pub fn new(generator: Arc<dyn EntityGenerator>, extractor: Arc<dyn GraphExtractor>) -> Self {
        Self {
            graph: Mutex::new(Graph::default()),
            epoch: SessionEpoch::new(),
            in_flight: DashMap::new(),
            regenerating: AtomicBool::new(false),
            generator,
            extractor,
            notifier: None,
            persistence: PersistenceBridge::disabled(),
            background: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_graph(self, graph: Graph) -> Self {
        *self.graph.lock().unwrap() = graph.validated();
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChatNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceBridge) -> Self {
        self.persistence = persistence;
        self
    }

    /// Snapshot of the current graph
    pub fn graph(&self) -> Graph {
        self.graph.lock().unwrap().clone()
    }

    pub fn persistence(&self) -> &PersistenceBridge {
        &self.persistence
    }

    pub fn state(&self) -> MutationState {
        if self.regenerating.load(Ordering::SeqCst) {
            MutationState::Regenerating
        } else if !self.in_flight.is_empty() {
            MutationState::Expanding
        } else {
            MutationState::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    pub fn is_expanding(&self, node_id: &NodeId) -> bool {
        self.in_flight.contains_key(node_id)
    }

    /// Expand `node_id` with sub-entities generated for `label`.
    ///
    /// The node must exist both when the call starts and when the result
    /// arrives. A second expansion of the same node while one is running
    /// is rejected. On any error the graph is left unchanged.
    pub async fn expand(&self, node_id: &NodeId, label: &str) -> MutationResult<Graph> {
        let ticket = self.epoch.ticket()?;
        let _guard = ExpansionGuard::acquire(&self.in_flight, node_id)
            .ok_or_else(|| MutationError::ExpansionInFlight(node_id.clone()))?;
        if !self.graph.lock().unwrap().contains_node(node_id) {
            return Err(MutationError::NodeNotFound(node_id.clone()));
        }

        info!(node_id = %node_id, label, "expanding node");
        let text = self.generator.generate(label).await.map_err(|e| {
            warn!(node_id = %node_id, error = %e, "expansion failed");
            MutationError::from(e)
        })?;
        let delta = parse_entities(node_id, &text);
        let added = delta.nodes.len();

        let updated = {
            let mut graph = self.graph.lock().unwrap();
            if let Err(e) = self.epoch.check(ticket) {
                info!(node_id = %node_id, reason = %e, "discarding expansion result");
                return Err(e);
            }
            if !graph.contains_node(node_id) {
                info!(node_id = %node_id, "node removed during expansion, discarding result");
                return Err(MutationError::NodeNotFound(node_id.clone()));
            }
            let merged = std::mem::take(&mut *graph).merge(delta);
            *graph = merged.clone();
            merged
        };
        info!(node_id = %node_id, added, nodes = updated.node_count(), "expanded node");

        if let Some(notifier) = &self.notifier {
            let notifier = Arc::clone(notifier);
            let note = ChatMessage::expansion_note(label);
            self.spawn_background(async move { notifier.notify(note).await });
        }
        self.request_mirror(&updated);
        Ok(updated)
    }

    /// Remove a node and every link touching it. Idempotent.
    pub fn delete(&self, node_id: &NodeId) -> Graph {
        let updated = {
            let mut graph = self.graph.lock().unwrap();
            let removed = std::mem::take(&mut *graph).remove_node(node_id);
            *graph = removed.clone();
            removed
        };
        info!(node_id = %node_id, nodes = updated.node_count(), "deleted node");
        self.request_mirror(&updated);
        updated
    }

    /// Replace the graph with one extracted from `document`.
    pub async fn regenerate(&self, document: &str) -> MutationResult<Graph> {
        let ticket = self.epoch.ticket()?;
        let _guard = RegenerationGuard::acquire(&self.regenerating)
            .ok_or(MutationError::RegenerationInFlight)?;

        info!(document_len = document.len(), "regenerating graph");
        let raw = self.extractor.extract(document).await.map_err(|e| {
            warn!(error = %e, "regeneration failed");
            MutationError::from(e)
        })?;
        let fresh = Graph::validate(&raw);

        {
            let mut graph = self.graph.lock().unwrap();
            if let Err(e) = self.epoch.check(ticket) {
                info!(reason = %e, "discarding regeneration result");
                return Err(e);
            }
            self.epoch.advance();
            *graph = fresh.clone();
        }
        info!(nodes = fresh.node_count(), links = fresh.link_count(), "regenerated graph");

        self.request_mirror(&fresh);
        Ok(fresh)
    }

    /// Install `graph` as the live graph without mirroring it.
    /// Results of mutations still in flight are discarded.
    pub fn replace_graph(&self, graph: Graph) -> Graph {
        let graph = graph.validated();
        let mut current = self.graph.lock().unwrap();
        self.epoch.advance();
        *current = graph.clone();
        graph
    }

    /// Load a project's mirrored graph, make it live and bind the session
    /// to the project.
    pub fn open_project(&self, project_id: &ProjectId) -> StorageResult<Graph> {
        let store = self
            .persistence
            .store()
            .ok_or_else(|| StorageError::Unavailable("no project store configured".to_string()))?;
        let record = store
            .get_project(project_id)?
            .ok_or_else(|| StorageError::ProjectNotFound(project_id.to_string()))?;

        let graph = self.replace_graph(record.graph());
        self.persistence.bind(project_id.clone());
        info!(project_id = %project_id, nodes = graph.node_count(), "opened project");
        Ok(graph)
    }

    /// Bind the session to a project; later mutations are mirrored to it
    pub fn bind_project(&self, project_id: ProjectId) {
        debug!(project_id = %project_id, "binding project");
        self.persistence.bind(project_id);
    }

    pub fn unbind_project(&self) -> Option<ProjectId> {
        self.persistence.unbind()
    }

    /// Close the session: in-flight results are discarded and nothing
    /// further is mirrored.
    pub fn teardown(&self) {
        self.epoch.close();
        self.persistence.unbind();
        info!("session closed");
    }

    /// Wait for background side effects spawned so far
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *self.background.lock().unwrap());
            if tasks.is_empty() {
                break;
            }
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "background task failed");
                }
            }
        }
    }

    fn spawn_background<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.background.lock().unwrap();
        Self::reap(&mut tasks);
        tasks.spawn(task);
    }

    fn request_mirror(&self, graph: &Graph) {
        let Some(job) = self.persistence.mirror_job(graph) else {
            return;
        };
        if Handle::try_current().is_ok() {
            let mut tasks = self.background.lock().unwrap();
            Self::reap(&mut tasks);
            tasks.spawn_blocking(move || {
                job.run();
            });
        } else {
            job.run();
        }
    }

    /// Drop finished tasks so the set does not grow over a long session
    fn reap(tasks: &mut JoinSet<()>) {
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "background task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationError, MockExtractor, MockGenerator};
    use crate::graph::{Group, Node};

    fn seed_graph() -> Graph {
        Graph {
            nodes: vec![Node::new("a", "DrugX", Group::Product)],
            links: Vec::new(),
        }
    }

    fn service(generator: MockGenerator) -> MutationService {
        MutationService::new(Arc::new(generator), Arc::new(MockExtractor::new()))
            .with_graph(seed_graph())
    }

    #[tokio::test]
    async fn expand_unknown_node_is_rejected_before_generation() {
        let generator = Arc::new(MockGenerator::repeating("- X (Drug)"));
        let service = MutationService::new(generator.clone(), Arc::new(MockExtractor::new()));

        let err = service.expand(&NodeId::from("ghost"), "Ghost").await.unwrap_err();
        assert!(matches!(err, MutationError::NodeNotFound(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_generation_leaves_state_idle() {
        let service = service(
            MockGenerator::new().with_failure(GenerationError::Timeout(30)),
        );

        let err = service.expand(&NodeId::from("a"), "DrugX").await.unwrap_err();
        assert!(matches!(err, MutationError::Generation(GenerationError::Timeout(30))));
        assert_eq!(service.graph(), seed_graph());
        assert_eq!(service.state(), MutationState::Idle);
    }

    #[tokio::test]
    async fn empty_generation_is_a_successful_no_op() {
        let service = service(MockGenerator::repeating("\n\n"));
        let graph = service.expand(&NodeId::from("a"), "DrugX").await.unwrap();
        assert_eq!(graph, seed_graph());
    }

    #[test]
    fn delete_works_without_a_runtime() {
        let service = service(MockGenerator::new());
        let graph = service.delete(&NodeId::from("a"));
        assert!(graph.is_empty());
        assert_eq!(service.delete(&NodeId::from("a")), graph);
    }

    #[test]
    fn replace_graph_validates() {
        let service = service(MockGenerator::new());
        let mut graph = seed_graph();
        graph.links.push(crate::graph::Link::new("a", "gone", "x"));

        let installed = service.replace_graph(graph);
        assert!(installed.links.is_empty());
        assert_eq!(service.graph(), installed);
    }

    #[test]
    fn open_project_without_store_is_unavailable() {
        let service = service(MockGenerator::new());
        let err = service.open_project(&ProjectId::from("p1")).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn closed_session_rejects_mutations() {
        let service = service(MockGenerator::repeating("- X (Drug)"));
        service.teardown();

        assert!(matches!(
            service.expand(&NodeId::from("a"), "DrugX").await,
            Err(MutationError::SessionClosed)
        ));
        assert!(matches!(
            service.regenerate("doc").await,
            Err(MutationError::SessionClosed)
        ));
    }
}

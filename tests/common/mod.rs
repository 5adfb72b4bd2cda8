//! Shared helpers for kgraph integration tests
//!
//! Graph fixtures, store doubles and service builders.

#![allow(dead_code)]

pub mod fixtures;
pub mod stores;

pub use fixtures::{drug_graph, treats_graph, ExpansionScenario};
pub use stores::FailingStore;

use kgraph::generation::{MockExtractor, MockGenerator};
use kgraph::{ChatLog, MutationService, PersistenceBridge, ProjectStore};
use std::sync::Arc;

/// Service over `graph` with the given collaborators and no persistence
pub fn service_with(
    graph: kgraph::Graph,
    generator: MockGenerator,
    extractor: MockExtractor,
) -> MutationService {
    MutationService::new(Arc::new(generator), Arc::new(extractor)).with_graph(graph)
}

/// Service that records chat notes and mirrors to `store`
pub fn persistent_service(
    graph: kgraph::Graph,
    generator: MockGenerator,
    store: Arc<dyn ProjectStore>,
) -> (MutationService, Arc<ChatLog>) {
    let notes = Arc::new(ChatLog::new());
    let service = MutationService::new(Arc::new(generator), Arc::new(MockExtractor::new()))
        .with_graph(graph)
        .with_notifier(notes.clone())
        .with_persistence(PersistenceBridge::new(store));
    (service, notes)
}

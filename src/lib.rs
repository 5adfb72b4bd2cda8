//! kgraph: knowledge-graph engine for a research assistant
//!
//! A research report is turned into a graph of entities (drugs, companies,
//! diseases, patents and trials) that the user then grows and prunes
//! interactively.
//!
//! # Core Concepts
//!
//! - **Graph**: ordered nodes plus links; every link references existing nodes
//! - **Mutations**: expand a node with generated sub-entities, delete a node
//!   with its links, or regenerate the whole graph from the report
//! - **Layout**: a stepped force simulation with drag-to-pin and pan/zoom
//! - **Persistence**: best-effort mirroring to a project store when a
//!   project is bound
//!
//! # Example
//!
//! ```
//! use kgraph::{parse_entities, Graph, Group, Node, NodeId};
//!
//! let graph = Graph {
//!     nodes: vec![Node::new("n1", "Aspirin", Group::Product)],
//!     links: vec![],
//! };
//! let delta = parse_entities(&NodeId::from("n1"), "- Bayer (Company)");
//! let graph = graph.merge(delta);
//! assert_eq!(graph.node_count(), 2);
//! ```

pub mod chat;
pub mod config;
pub mod generation;
mod graph;
pub mod layout;
pub mod mutation;
pub mod parser;
pub mod persistence;
pub mod storage;

pub use chat::{ChatLog, ChatMessage, ChatNotifier, ChatRole};
pub use config::{Config, ConfigError, ConfigResult};
pub use generation::{EntityGenerator, GenerationError, GraphExtractor};
pub use graph::{EntityType, Graph, GraphDelta, Group, Link, Node, NodeId, RELATED_TO};
pub use layout::{LayoutEngine, LayoutParams, NodePosition};
pub use mutation::{MutationError, MutationResult, MutationService, MutationState};
pub use parser::parse_entities;
pub use persistence::PersistenceBridge;
pub use storage::{
    MemoryStore, NewProject, OpenStore, ProjectId, ProjectRecord, ProjectStore, ProjectUpdate,
    SqliteStore, StorageError, StorageResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Core graph data structures

mod edge;
mod model;
mod node;

#[cfg(test)]
mod tests;

pub use edge::{Link, RELATED_TO};
pub use model::{Graph, GraphDelta};
pub use node::{EntityType, Group, Node, NodeId};

//! Link (edge) representation

use super::node::NodeId;
use serde::{Deserialize, Serialize};

/// Relation used for every parent → sub-node link created by expansion
pub const RELATED_TO: &str = "related_to";

/// A directed, labeled relation between two node ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Free-text relation label (e.g. "treats", "develops")
    #[serde(default)]
    pub relation: String,
}

impl Link {
    /// Create a new link
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
        }
    }

    /// Link from an expanded parent to one of its sub-nodes
    pub fn related_to(parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Self {
        Self::new(parent, child, RELATED_TO)
    }

    /// True when either endpoint is `id`
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}

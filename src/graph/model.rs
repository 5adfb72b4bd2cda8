//! Graph: the ordered node list plus link list owned by a research session

use super::edge::Link;
use super::node::{Group, Node, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// A knowledge graph
///
/// Serializes as `{"nodes": [...], "links": [...]}`, the shape mirrored to
/// the project store under `knowledge_graph`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in insertion order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Links in insertion order
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Nodes and links produced by parsing, not yet merged into a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDelta {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl GraphDelta {
    /// True when the delta adds nothing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from loosely-structured JSON, dropping every link whose
    /// endpoints are not both present.
    ///
    /// Never fails: a missing or non-array `nodes`/`links` is treated as
    /// empty. Nodes without a usable `id` cannot be referenced and are
    /// skipped; a missing `label` becomes empty and an unknown `group`
    /// becomes group 1. Numeric ids are accepted and stringified.
    pub fn validate(raw: &Value) -> Graph {
        let nodes: Vec<Node> = raw
            .get("nodes")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(node_from_value).collect())
            .unwrap_or_default();

        let links: Vec<Link> = raw
            .get("links")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(link_from_value).collect())
            .unwrap_or_default();

        Graph { nodes, links }.validated()
    }

    /// Filter links so that every endpoint references an existing node.
    /// Nodes are returned unchanged.
    pub fn validated(self) -> Graph {
        let Graph { nodes, links } = self;
        let total = links.len();

        let ids: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
        let links: Vec<Link> = links
            .into_iter()
            .filter(|l| ids.contains(&l.source) && ids.contains(&l.target))
            .collect();

        let dropped = total - links.len();
        if dropped > 0 {
            debug!(dropped, kept = links.len(), "dropped links with unknown endpoints");
        }

        Graph { nodes, links }
    }

    /// Append a delta's nodes and links.
    ///
    /// Node ids are not deduplicated: merging the same delta twice yields
    /// two nodes per id.
    pub fn merge(mut self, delta: GraphDelta) -> Graph {
        self.nodes.extend(delta.nodes);
        self.links.extend(delta.links);
        self
    }

    /// Remove every node with `id` together with every link touching it.
    ///
    /// Absent ids leave the graph unchanged.
    pub fn remove_node(mut self, id: &NodeId) -> Graph {
        self.nodes.retain(|n| &n.id != id);
        self.links.retain(|l| !l.touches(id));
        self
    }

    /// Find the first node with the given id
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Check if a node with the given id exists
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// True when the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Read an id-like JSON value: strings as-is, numbers stringified
fn id_from_value(value: Option<&Value>) -> Option<NodeId> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(NodeId::from_string(s.clone())),
        Value::Number(n) => Some(NodeId::from_string(n.to_string())),
        _ => None,
    }
}

fn node_from_value(value: &Value) -> Option<Node> {
    let Some(id) = id_from_value(value.get("id")) else {
        debug!("skipping node without a usable id");
        return None;
    };
    let label = value
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let group = value
        .get("group")
        .and_then(Value::as_i64)
        .map(Group::from)
        .unwrap_or_default();
    Some(Node { id, label, group })
}

fn link_from_value(value: &Value) -> Option<Link> {
    let source = id_from_value(value.get("source"))?;
    let target = id_from_value(value.get("target"))?;
    let relation = value
        .get("relation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(Link {
        source,
        target,
        relation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_node_graph() -> Graph {
        Graph {
            nodes: vec![
                Node::new("a", "DrugX", Group::Product),
                Node::new("b", "DiseaseY", Group::Disease),
            ],
            links: vec![Link::new("a", "b", "treats")],
        }
    }

    #[test]
    fn validate_drops_links_with_unknown_endpoints() {
        let raw = json!({
            "nodes": [{"id": "x", "label": "X", "group": 1}, {"id": "y", "label": "Y", "group": 2}],
            "links": [
                {"source": "x", "target": "y", "relation": "develops"},
                {"source": "x", "target": "ghost", "relation": "treats"},
                {"source": "ghost", "target": "y", "relation": "treats"}
            ]
        });

        let graph = Graph::validate(&raw);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.links, vec![Link::new("x", "y", "develops")]);
    }

    #[test]
    fn validate_treats_missing_or_malformed_collections_as_empty() {
        assert_eq!(Graph::validate(&json!({})), Graph::new());
        assert_eq!(Graph::validate(&json!(null)), Graph::new());
        assert_eq!(Graph::validate(&json!({"nodes": "oops", "links": 3})), Graph::new());

        let only_links = json!({"links": [{"source": "a", "target": "b"}]});
        assert!(Graph::validate(&only_links).links.is_empty());
    }

    #[test]
    fn validate_is_lenient_on_node_fields() {
        let raw = json!({
            "nodes": [
                {"id": 7, "label": "Numeric"},
                {"label": "no id"},
                {"id": "z", "group": 42},
                {"id": "w", "label": "W", "group": 3}
            ],
            "links": [{"source": 7, "target": "z"}]
        });

        let graph = Graph::validate(&raw);

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "z", "w"]);
        assert_eq!(graph.nodes[1].label, "");
        assert_eq!(graph.nodes[1].group, Group::Product);
        assert_eq!(graph.nodes[2].group, Group::Disease);
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].relation, "");
    }

    #[test]
    fn nodes_without_usable_id_are_dropped_and_siblings_keep_links() {
        let raw = json!({
            "nodes": [
                {"id": "x", "label": "Semaglutide", "group": 1},
                {"label": "orphan", "group": 2},
                {"id": "", "label": "blank id"},
                {"id": null, "label": "null id"},
                {"id": "y", "label": "Obesity", "group": 3}
            ],
            "links": [
                {"source": "x", "target": "y", "relation": "treats"},
                {"source": "x", "target": "", "relation": "dangling"}
            ]
        });

        let graph = Graph::validate(&raw);

        let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Semaglutide", "Obesity"]);
        assert_eq!(graph.links, vec![Link::new("x", "y", "treats")]);
    }

    #[test]
    fn validated_keeps_nodes_unchanged() {
        let mut graph = two_node_graph();
        graph.links.push(Link::new("b", "missing", "x"));
        let nodes_before = graph.nodes.clone();

        let graph = graph.validated();

        assert_eq!(graph.nodes, nodes_before);
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn merge_appends_without_deduplication() {
        let delta = GraphDelta {
            nodes: vec![Node::new("a-sub-0", "T", Group::Product)],
            links: vec![Link::related_to("a", "a-sub-0")],
        };

        let graph = two_node_graph().merge(delta.clone()).merge(delta);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.link_count(), 3);
        assert_eq!(graph.nodes[2].id, graph.nodes[3].id);
    }

    #[test]
    fn remove_node_cascades_links() {
        let graph = two_node_graph().remove_node(&NodeId::from("a"));

        assert_eq!(graph.nodes, vec![Node::new("b", "DiseaseY", Group::Disease)]);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn remove_absent_node_is_identity() {
        let graph = two_node_graph();
        assert_eq!(graph.clone().remove_node(&NodeId::from("nope")), graph);
    }

    #[test]
    fn remove_node_invariants_hold_for_every_node() {
        let mut graph = two_node_graph();
        graph.nodes.push(Node::new("c", "C", Group::Filing));
        graph.links.push(Link::new("c", "a", "cites"));
        graph.links.push(Link::new("b", "c", "studied_in"));

        for node in graph.nodes.clone() {
            let result = graph.clone().remove_node(&node.id);
            assert!(!result.contains_node(&node.id));
            assert!(result.links.iter().all(|l| !l.touches(&node.id)));
            assert_eq!(result.node_count(), graph.node_count() - 1);
        }
    }
}

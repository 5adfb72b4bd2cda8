//! Serialization tests with stored-record fixtures

use serde_json::{json, Value};

/// Fixture: a `knowledge_graph` value as mirrored to the project store
fn stored_graph_fixture() -> Value {
    json!({
        "nodes": [
            {"id": "semaglutide", "label": "Semaglutide", "group": 1},
            {"id": "novo", "label": "Novo Nordisk", "group": 2},
            {"id": "t2d", "label": "Type 2 Diabetes", "group": 3},
            {"id": "step1", "label": "STEP-1", "group": 4}
        ],
        "links": [
            {"source": "novo", "target": "semaglutide", "relation": "develops"},
            {"source": "semaglutide", "target": "t2d", "relation": "treats"},
            {"source": "step1", "target": "semaglutide", "relation": "evaluates"}
        ]
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{Graph, Group, Link, Node, NodeId};

    #[test]
    fn node_id_serializes_as_string() {
        let id = NodeId::from_string("aspirin-sub-0");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"aspirin-sub-0\"");
    }

    #[test]
    fn group_serializes_as_integer_code() {
        assert_eq!(serde_json::to_value(Group::Company).unwrap(), json!(2));
        assert_eq!(serde_json::to_value(Group::Filing).unwrap(), json!(4));
    }

    #[test]
    fn group_deserialization_is_total() {
        let group: Group = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(group, Group::Disease);

        let group: Group = serde_json::from_value(json!(99)).unwrap();
        assert_eq!(group, Group::Product);
    }

    #[test]
    fn node_defaults_missing_label_and_group() {
        let node: Node = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert_eq!(node, Node::new("a", "", Group::Product));
    }

    #[test]
    fn serialized_graph_has_store_structure() {
        let graph = Graph {
            nodes: vec![Node::new("a", "Aspirin", Group::Product)],
            links: vec![Link::new("a", "a", "self")],
        };

        let json = serde_json::to_value(&graph).unwrap();

        assert!(json["nodes"].is_array());
        assert!(json["links"].is_array());
        assert_eq!(json["nodes"][0]["id"], "a");
        assert_eq!(json["nodes"][0]["label"], "Aspirin");
        assert_eq!(json["nodes"][0]["group"], 1);
        assert_eq!(json["links"][0]["source"], "a");
        assert_eq!(json["links"][0]["relation"], "self");
        assert!(json["nodes"][0].get("x").is_none(), "physical state is never serialized");
    }

    #[test]
    fn can_deserialize_stored_graph_fixture() {
        let result: Result<Graph, _> = serde_json::from_value(stored_graph_fixture());
        assert!(result.is_ok(), "Failed to deserialize stored graph: {:?}", result.err());

        let graph = result.unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.link_count(), 3);
        assert_eq!(graph.nodes[3].group, Group::Filing);
    }

    #[test]
    fn validate_and_deserialize_agree_on_clean_input() {
        let fixture = stored_graph_fixture();
        let typed: Graph = serde_json::from_value(fixture.clone()).unwrap();
        assert_eq!(Graph::validate(&fixture), typed);
    }

    #[test]
    fn empty_object_deserializes_to_empty_graph() {
        let graph: Graph = serde_json::from_value(json!({})).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.link_count(), 0);
    }
}

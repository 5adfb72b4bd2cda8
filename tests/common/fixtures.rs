//! Graph fixtures

use kgraph::{Graph, Group, Link, Node};

/// `{a: DrugX}` with no links
pub fn drug_graph() -> Graph {
    Graph {
        nodes: vec![Node::new("a", "DrugX", Group::Product)],
        links: Vec::new(),
    }
}

/// `a --treats--> b`
pub fn treats_graph() -> Graph {
    Graph {
        nodes: vec![
            Node::new("a", "", Group::Product),
            Node::new("b", "", Group::Product),
        ],
        links: vec![Link::new("a", "b", "treats")],
    }
}

/// Generator output for expanding `a` and the graph it should produce
pub struct ExpansionScenario;

impl ExpansionScenario {
    pub const RESPONSE: &'static str = "- TargetY (Gene)\n- CompanyZ (Company)";

    pub fn expected() -> Graph {
        Graph {
            nodes: vec![
                Node::new("a", "DrugX", Group::Product),
                Node::new("a-sub-0", "TargetY", Group::Product),
                Node::new("a-sub-1", "CompanyZ", Group::Company),
            ],
            links: vec![
                Link::related_to("a", "a-sub-0"),
                Link::related_to("a", "a-sub-1"),
            ],
        }
    }
}

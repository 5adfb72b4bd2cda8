//! Node representation in the knowledge graph

use serde::{Deserialize, Serialize};

/// Identifier of a node within a graph
///
/// Serializes as a plain string (e.g. `"aspirin"` or `"aspirin-sub-0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the `ordinal`-th sub-node produced by expanding `parent`
    pub fn sub_node(parent: &NodeId, ordinal: usize) -> Self {
        Self(format!("{}-sub-{}", parent.0, ordinal))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entity category code (1–4) used for rendering and classification.
///
/// Serializes as its integer code. Decoding is total: codes outside 1–4
/// fall back to [`Group::Product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum Group {
    /// Drug, product, technology, protein, gene, pathway, or generic topic
    #[default]
    Product,
    /// Company or sponsor
    Company,
    /// Disease or indication
    Disease,
    /// Patent, regulation, or trial
    Filing,
}

impl Group {
    /// All groups in code order
    pub const ALL: [Group; 4] = [Group::Product, Group::Company, Group::Disease, Group::Filing];

    /// Decode an integer code, `None` when outside 1–4
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Product),
            2 => Some(Self::Company),
            3 => Some(Self::Disease),
            4 => Some(Self::Filing),
            _ => None,
        }
    }

    /// The integer code
    pub fn code(self) -> u8 {
        match self {
            Self::Product => 1,
            Self::Company => 2,
            Self::Disease => 3,
            Self::Filing => 4,
        }
    }

    /// Fill color used by the graph view
    pub fn color(self) -> &'static str {
        match self {
            Self::Product => "#0d9488",
            Self::Company => "#6366f1",
            Self::Disease => "#ef4444",
            Self::Filing => "#f59e0b",
        }
    }

    /// Legend caption
    pub fn legend(self) -> &'static str {
        match self {
            Self::Product => "Drug/Product",
            Self::Company => "Company/Sponsor",
            Self::Disease => "Disease/Indication",
            Self::Filing => "Patent/Trial",
        }
    }
}

impl From<i64> for Group {
    fn from(code: i64) -> Self {
        Self::from_code(code).unwrap_or_default()
    }
}

impl From<Group> for u8 {
    fn from(group: Group) -> Self {
        group.code()
    }
}

/// Entity type as written by the generation collaborator, e.g. the `Gene`
/// in `"- TP53 (Gene)"`.
///
/// Matching is case-sensitive; anything unrecognized is kept verbatim as
/// [`EntityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EntityType {
    Drug,
    Product,
    Technology,
    Protein,
    Gene,
    Pathway,
    #[default]
    Topic,
    Company,
    Sponsor,
    Disease,
    Indication,
    Patent,
    Trial,
    Other(String),
}

impl EntityType {
    /// Parse a type name
    pub fn parse(name: &str) -> Self {
        match name {
            "Drug" => Self::Drug,
            "Product" => Self::Product,
            "Technology" => Self::Technology,
            "Protein" => Self::Protein,
            "Gene" => Self::Gene,
            "Pathway" => Self::Pathway,
            "Topic" => Self::Topic,
            "Company" => Self::Company,
            "Sponsor" => Self::Sponsor,
            "Disease" => Self::Disease,
            "Indication" => Self::Indication,
            "Patent" => Self::Patent,
            "Trial" => Self::Trial,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map to the group code; unrecognized types land in group 1
    pub fn group(&self) -> Group {
        match self {
            Self::Drug
            | Self::Product
            | Self::Technology
            | Self::Protein
            | Self::Gene
            | Self::Pathway
            | Self::Topic => Group::Product,
            Self::Company | Self::Sponsor => Group::Company,
            Self::Disease | Self::Indication => Group::Disease,
            Self::Patent | Self::Trial => Group::Filing,
            Self::Other(_) => Group::Product,
        }
    }
}

/// A node in the knowledge graph
///
/// Physical state (position, velocity, pin) is not part of the node; it
/// lives in the layout simulation and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier
    pub id: NodeId,
    /// Display string
    #[serde(default)]
    pub label: String,
    /// Entity category
    #[serde(default)]
    pub group: Group,
}

impl Node {
    /// Create a new node
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, group: Group) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_table_is_total() {
        let cases = [
            ("Drug", 1),
            ("Product", 1),
            ("Technology", 1),
            ("Protein", 1),
            ("Gene", 1),
            ("Pathway", 1),
            ("Topic", 1),
            ("Company", 2),
            ("Sponsor", 2),
            ("Disease", 3),
            ("Indication", 3),
            ("Patent", 4),
            ("Trial", 4),
            ("Regulation", 1),
            ("", 1),
        ];
        for (name, code) in cases {
            assert_eq!(EntityType::parse(name).group().code(), code, "type {:?}", name);
        }
    }

    #[test]
    fn type_matching_is_case_sensitive() {
        assert_eq!(EntityType::parse("company"), EntityType::Other("company".to_string()));
        assert_eq!(EntityType::parse("company").group(), Group::Product);
    }

    #[test]
    fn group_codes_round_trip() {
        for group in Group::ALL {
            assert_eq!(Group::from_code(group.code() as i64), Some(group));
        }
        assert_eq!(Group::from_code(0), None);
        assert_eq!(Group::from(9), Group::Product);
    }

    #[test]
    fn sub_node_id_format() {
        let parent = NodeId::from_string("n1");
        assert_eq!(NodeId::sub_node(&parent, 3).as_str(), "n1-sub-3");
    }
}

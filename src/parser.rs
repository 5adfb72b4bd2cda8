//! Text-to-graph parsing of generated entity lists
//!
//! The entity-generation collaborator answers with loosely formatted lines
//! such as:
//!
//! ```text
//! - TP53 (Gene)
//! • Roche (Company)
//! Breast cancer (Disease)
//! ```
//!
//! Each non-blank line becomes one sub-node of the expanded parent plus a
//! `related_to` link from the parent.

use crate::graph::{EntityType, GraphDelta, Link, Node, NodeId};
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// First parenthesized span, non-greedy
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((.*?)\)\s*").expect("parenthetical pattern is valid"));

/// Leading list marker
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•*]\s*").expect("bullet pattern is valid"));

/// One parsed line of generated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Position among the non-blank lines, zero-based
    pub ordinal: usize,
    pub label: String,
    pub entity_type: EntityType,
}

/// Parse generated text into entries.
///
/// Blank lines are dropped before ordinals are assigned. A line that is
/// nothing but a bullet marker yields no entry but still consumes its
/// ordinal.
///
/// The first parenthetical is the type. It is replaced by a single space
/// rather than deleted, so `Phase III (Trial) results` keeps its word
/// break instead of collapsing to `Phase IIIresults`.
pub fn parse_lines(text: &str) -> Vec<ParsedEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter_map(|(ordinal, line)| {
            let line = BULLET.replace(line, "");
            let line = line.trim();
            if line.is_empty() {
                debug!(ordinal, "skipping bullet-only line");
                return None;
            }
            Some(parse_entry(ordinal, line))
        })
        .collect()
}

fn parse_entry(ordinal: usize, line: &str) -> ParsedEntry {
    match PARENTHETICAL.captures(line) {
        Some(caps) => {
            let entity_type = caps
                .get(1)
                .map(|m| EntityType::parse(m.as_str().trim()))
                .unwrap_or_default();
            let label = PARENTHETICAL.replace(line, " ").trim().to_string();
            ParsedEntry {
                ordinal,
                label,
                entity_type,
            }
        }
        None => ParsedEntry {
            ordinal,
            label: line.to_string(),
            entity_type: EntityType::Topic,
        },
    }
}

/// Build the delta that expanding `parent` with `text` contributes.
///
/// Sub-node ids are `"{parent}-sub-{ordinal}"`; they carry no cross-call
/// counter, so parsing the same text for the same parent twice produces
/// the same ids. Empty input yields an empty delta.
pub fn parse_entities(parent: &NodeId, text: &str) -> GraphDelta {
    let mut delta = GraphDelta::default();
    for entry in parse_lines(text) {
        let id = NodeId::sub_node(parent, entry.ordinal);
        delta.links.push(Link::related_to(parent.clone(), id.clone()));
        delta
            .nodes
            .push(Node::new(id, entry.label, entry.entity_type.group()));
    }
    delta
}

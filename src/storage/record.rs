//! Project records as held by the document store

use crate::chat::ChatMessage;
use crate::graph::Graph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a new random ProjectId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Generate a conversation thread id: `"{unix millis}-{9 random chars}"`
pub fn generate_thread_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &random[..9])
}

/// A stored project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub owner_id: String,
    pub thread_id: String,
    pub title: String,
    pub generated_document: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    /// Mirrored graph exactly as written; not validated on read
    pub knowledge_graph: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// The mirrored graph after validation; empty when none was stored
    pub fn graph(&self) -> Graph {
        self.knowledge_graph
            .as_ref()
            .map(Graph::validate)
            .unwrap_or_default()
    }
}

/// Fields for creating a project
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub owner_id: String,
    pub title: String,
    /// Generated when absent
    pub thread_id: Option<String>,
    pub generated_document: Option<String>,
    pub chat_history: Vec<ChatMessage>,
    pub knowledge_graph: Option<Graph>,
}

impl NewProject {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.generated_document = Some(document.into());
        self
    }

    pub fn with_graph(mut self, graph: Graph) -> Self {
        self.knowledge_graph = Some(graph);
        self
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub generated_document: Option<String>,
    pub chat_history: Option<Vec<ChatMessage>>,
    pub knowledge_graph: Option<Graph>,
}

impl ProjectUpdate {
    /// Update that only replaces the mirrored graph
    pub fn knowledge_graph(graph: Graph) -> Self {
        Self {
            knowledge_graph: Some(graph),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.generated_document.is_none()
            && self.chat_history.is_none()
            && self.knowledge_graph.is_none()
    }

    /// Apply to an in-memory record
    pub(crate) fn apply_to(&self, record: &mut ProjectRecord) -> Result<(), serde_json::Error> {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(document) = &self.generated_document {
            record.generated_document = Some(document.clone());
        }
        if let Some(history) = &self.chat_history {
            record.chat_history = history.clone();
        }
        if let Some(graph) = &self.knowledge_graph {
            record.knowledge_graph = Some(serde_json::to_value(graph)?);
        }
        record.updated_at = Utc::now();
        Ok(())
    }
}

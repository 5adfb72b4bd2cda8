//! Chat-log side channel
//!
//! Successful expansions leave an advisory note in the session's chat
//! transcript. The transcript UI and its storage live elsewhere; this
//! module only defines the message shape and the one-way notifier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One chat transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// The note recorded after expanding the node labeled `label`
    pub fn expansion_note(label: &str) -> Self {
        Self::new(ChatRole::User, format!("Expand more details on: {}", label))
    }
}

/// One-way notification sink. Failures are the notifier's own business:
/// nothing is returned to the caller.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn notify(&self, message: ChatMessage);
}

/// In-memory transcript, useful as a notifier in tests and the CLI.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Mutex<Vec<ChatMessage>>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ChatNotifier for ChatLog {
    async fn notify(&self, message: ChatMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

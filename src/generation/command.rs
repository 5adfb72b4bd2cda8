//! Subprocess-backed collaborator
//!
//! Runs a configured command once per request: the prompt is written to
//! the child's stdin and its stdout is the response. Any CLI that reads a
//! prompt on stdin (an LLM wrapper script, `ollama run <model>`, ...)
//! can serve as the backend.

use super::prompts;
use super::{EntityGenerator, GenerationError, GraphExtractor};
use crate::config::GenerationConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of document characters included in extraction prompts
pub const DEFAULT_DOCUMENT_CHAR_LIMIT: usize = 8000;

/// Pull a graph payload out of an extraction reply.
///
/// Replies come as bare JSON, as a fenced block, or as JSON buried in
/// prose. Candidates are tried in that order and the first object with a
/// `nodes` or `links` key is returned.
pub fn extract_graph_json(text: &str) -> Option<Value> {
    let text = text.trim();
    [Some(text), fenced_block(text), brace_span(text)]
        .into_iter()
        .flatten()
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate.trim()).ok())
        .find(is_graph_payload)
}

/// Body of the first ``` fence, skipping any language tag line
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let rest = &text[open + 3..];
    let body = &rest[rest.find('\n')? + 1..];
    body.find("```").map(|close| &body[..close])
}

/// Outermost `{ ... }` span
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn is_graph_payload(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|fields| fields.contains_key("nodes") || fields.contains_key("links"))
}

/// Collaborator that shells out to a command.
#[derive(Debug, Clone)]
pub struct CommandClient {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    document_char_limit: usize,
}

impl CommandClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            document_char_limit: DEFAULT_DOCUMENT_CHAR_LIMIT,
        }
    }

    /// Build from configuration; `None` when no command is configured.
    pub fn from_config(config: &GenerationConfig) -> Option<Self> {
        let program = config.command.as_ref()?;
        Some(
            Self::new(program.clone())
                .with_args(config.args.clone())
                .with_timeout(Duration::from_secs(config.timeout_secs))
                .with_document_char_limit(config.document_char_limit),
        )
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_document_char_limit(mut self, limit: usize) -> Self {
        self.document_char_limit = limit;
        self
    }

    /// Run the command with `prompt` on stdin and return its stdout.
    pub async fn run(&self, prompt: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.timeout, self.run_to_completion(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout.as_secs())),
        }
    }

    async fn run_to_completion(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(program = %self.program, prompt_len = prompt.len(), "invoking generation command");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GenerationError::Unavailable(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| GenerationError::InvocationFailed(format!("writing prompt: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| GenerationError::InvocationFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::InvocationFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl EntityGenerator for CommandClient {
    async fn generate(&self, seed_label: &str) -> Result<String, GenerationError> {
        self.run(&prompts::sub_entity_prompt(seed_label)).await
    }
}

#[async_trait]
impl GraphExtractor for CommandClient {
    async fn extract(&self, document: &str) -> Result<Value, GenerationError> {
        let prompt = prompts::extraction_prompt(document, self.document_char_limit);
        let text = self.run(&prompt).await?;
        extract_graph_json(&text).ok_or_else(|| {
            GenerationError::ParseError(format!(
                "no graph object in response: {}",
                prompts::truncate_chars(&text, 200)
            ))
        })
    }
}

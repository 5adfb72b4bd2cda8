//! Mock collaborators for testing: return preconfigured responses.

use super::{EntityGenerator, GenerationError, GraphExtractor};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted responses shared by both mocks: a queue consumed front to
/// back, then an optional repeating fallback.
struct Script<T> {
    queue: Mutex<VecDeque<Result<T, GenerationError>>>,
    fallback: Option<T>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    async fn next(&self, input: &str) -> Result<T, GenerationError> {
        self.calls.lock().unwrap().push(input.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.queue.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => self.fallback.clone().ok_or_else(|| {
                GenerationError::Unavailable("no mock response queued".to_string())
            }),
        }
    }
}

/// Mock entity generator.
pub struct MockGenerator {
    script: Script<String>,
}

impl MockGenerator {
    /// A generator with nothing scripted; every call fails as unavailable.
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    /// A generator that answers every call with `text`.
    pub fn repeating(text: impl Into<String>) -> Self {
        let mut mock = Self::new();
        mock.script.fallback = Some(text.into());
        mock
    }

    /// Queue a successful response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.script.queue.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: GenerationError) -> Self {
        self.script.queue.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sleep before answering (lets tests overlap calls).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    /// Seed labels received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.script.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityGenerator for MockGenerator {
    async fn generate(&self, seed_label: &str) -> Result<String, GenerationError> {
        self.script.next(seed_label).await
    }
}

/// Mock graph extractor.
pub struct MockExtractor {
    script: Script<serde_json::Value>,
}

impl MockExtractor {
    /// An extractor with nothing scripted; every call fails as unavailable.
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    /// An extractor that answers every call with `value`.
    pub fn repeating(value: serde_json::Value) -> Self {
        let mut mock = Self::new();
        mock.script.fallback = Some(value);
        mock
    }

    /// Queue a successful response.
    pub fn with_response(self, value: serde_json::Value) -> Self {
        self.script.queue.lock().unwrap().push_back(Ok(value));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: GenerationError) -> Self {
        self.script.queue.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sleep before answering (lets tests overlap calls).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    /// Documents received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.script.calls.lock().unwrap().clone()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphExtractor for MockExtractor {
    async fn extract(&self, document: &str) -> Result<serde_json::Value, GenerationError> {
        self.script.next(document).await
    }
}

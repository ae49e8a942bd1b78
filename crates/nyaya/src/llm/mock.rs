//! Scripted in-memory backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::backend::{BackendKind, Capabilities, CompletionRequest, LlmBackend, LlmError};

/// Backend that replays queued replies in order and records every request.
///
/// Once the queue is empty each further call fails with `EmptyResponse`.
pub struct ScriptedBackend {
    kind: BackendKind,
    capabilities: Capabilities,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Text and vision capable backend with no queued replies.
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            capabilities: Capabilities::text_and_vision(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn text_only(mut self) -> Self {
        self.capabilities = Capabilities::text_only();
        self
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, LlmError>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn probe(&self) -> Result<(), LlmError> {
        Ok(())
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse(self.kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let backend = ScriptedBackend::new(BackendKind::OpenAi)
            .reply("first")
            .fail(LlmError::Connection("reset".to_string()));

        let request = CompletionRequest::new("sys", "one");
        assert_eq!(backend.complete(&request).await.unwrap(), "first");
        assert!(matches!(
            backend.complete(&request).await,
            Err(LlmError::Connection(_))
        ));
        assert!(matches!(
            backend.complete(&request).await,
            Err(LlmError::EmptyResponse(BackendKind::OpenAi))
        ));
        assert_eq!(backend.calls(), 3);
        assert_eq!(backend.last_request().unwrap().user, "one");
    }
}

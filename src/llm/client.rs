//! LLM client trait and a scripted mock for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse};
use crate::error::{GepettoError, Result};

/// A model provider that answers one completion request at a time
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model name used for requests that do not set one
    fn model(&self) -> &str;
}

/// Mock client that replays queued responses and records every request
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.responses
            .lock()
            .map_err(|e| GepettoError::Backend(e.to_string()))?
            .pop_front()
            .ok_or_else(|| GepettoError::Backend("mock client has no more responses".to_string()))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockLlmClient::new(vec![CompletionResponse::text("one"), CompletionResponse::text("two")]);

        let first = mock.complete(CompletionRequest::new("sys")).await.unwrap();
        let second = mock.complete(CompletionRequest::new("sys")).await.unwrap();
        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.model(), "mock-model");
    }

    #[tokio::test]
    async fn test_mock_exhausted() {
        let mock = MockLlmClient::new(vec![]);
        let result = mock.complete(CompletionRequest::new("sys")).await;
        assert!(matches!(result, Err(GepettoError::Backend(_))));
    }
}

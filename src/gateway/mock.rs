//! In-memory client for tests.

use super::{AiClient, AiError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock client: returns preconfigured replies.
///
/// Replies are matched by a key that must appear in the system prompt;
/// the first registered match wins. Every call is recorded so tests can
/// inspect the prompts that were sent.
pub struct MockClient {
    available: bool,
    replies: Vec<(String, Result<String, String>)>,
    default_reply: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// One recorded `analyze` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: Option<u32>,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            available: true,
            replies: Vec::new(),
            default_reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails as unconfigured.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Reply with `reply` when the system prompt contains `key`.
    pub fn with_response(mut self, key: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.push((key.into(), Ok(reply.into())));
        self
    }

    /// Fail with an API error when the system prompt contains `key`.
    pub fn with_failure(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.replies.push((key.into(), Err(message.into())));
        self
    }

    /// Reply used when no key matches.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl AiClient for MockClient {
    async fn analyze(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, AiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
                max_tokens,
            });
        }

        if !self.available {
            return Err(AiError::NotConfigured(
                "mock client configured as unavailable".to_string(),
            ));
        }

        let matched = self
            .replies
            .iter()
            .find(|(key, _)| system_prompt.contains(key.as_str()));

        match matched {
            Some((_, Ok(reply))) => Ok(reply.clone()),
            Some((_, Err(message))) => Err(AiError::Api {
                status: 500,
                body: message.clone(),
            }),
            None => self.default_reply.clone().ok_or(AiError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_matching_key_wins() {
        let client = MockClient::new()
            .with_response("Pacing", "pacing reply")
            .with_response("Architect", "other reply");

        let reply = client
            .analyze("You are the Pacing Architect", "text", None)
            .await
            .unwrap();
        assert_eq!(reply, "pacing reply");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn failure_surfaces_as_api_error() {
        let client = MockClient::new().with_failure("Voice", "overloaded");
        let err = client.analyze("Voice Lab", "text", None).await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn unmatched_without_default_is_empty() {
        let client = MockClient::new();
        assert!(matches!(
            client.analyze("sys", "user", None).await,
            Err(AiError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn unavailable_client_records_then_fails() {
        let client = MockClient::unavailable();
        let err = client.analyze("sys", "user", Some(500)).await.unwrap_err();
        assert!(matches!(err, AiError::NotConfigured(_)));
        assert_eq!(client.calls()[0].max_tokens, Some(500));
    }
}

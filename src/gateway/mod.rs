//! AI gateway: the seam between prompt builders and a text-generation service.
//!
//! The service is a black box with a text-in/text-out contract:
//! `analyze(system, user)` returns the raw reply, `analyze_json` cleans and
//! parses it. Two implementations:
//! - `AnthropicClient`: the Messages API over HTTPS (production)
//! - `MockClient`: preconfigured replies keyed by prompt content (testing)

mod anthropic;
mod mock;

pub use anthropic::AnthropicClient;
pub use mock::{MockClient, RecordedCall};

use async_trait::async_trait;
use serde_json::Value;

/// Errors from AI gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service not configured: {0}")]
    NotConfigured(String),
    #[error("request failed: {0}")]
    Http(String),
    #[error("AI service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("empty response from AI service")]
    EmptyResponse,
    #[error("response is not valid JSON: {0}")]
    Parse(String),
    #[error("AI call timed out after {0}s")]
    Timeout(u64),
}

/// Client trait for the text-generation service.
///
/// Abstracts over transport so prompt builders don't depend on how the
/// model is reached.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Send one system + user prompt and return the reply text.
    ///
    /// `max_tokens` overrides the client's configured ceiling.
    async fn analyze(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, AiError>;

    /// Like [`analyze`](Self::analyze), but the reply must be a JSON object.
    async fn analyze_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<Value, AiError> {
        let raw = self.analyze(system_prompt, user_prompt, max_tokens).await?;
        extract_json(&raw)
    }
}

/// Pull a JSON object out of a model reply.
///
/// Tries the reply as-is, then the contents of a ```` ```json ```` (or bare
/// ```` ``` ````) fence, then the span from the first `{` to the last `}`.
/// Anything else is a parse error.
pub fn extract_json(text: &str) -> Result<Value, AiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    // Try 1: Direct parse
    let direct_err = match serde_json::from_str::<Value>(trimmed) {
        Ok(v) if v.is_object() => return Ok(v),
        Ok(_) => "top-level value is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    // Try 2: Fenced code block
    let fenced = if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        Some(after.find("```").map(|end| &after[..end]).unwrap_or(after))
    } else if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        Some(after.find("```").map(|end| &after[..end]).unwrap_or(after))
    } else {
        None
    };

    if let Some(block) = fenced {
        if let Ok(v) = serde_json::from_str::<Value>(block.trim()) {
            if v.is_object() {
                return Ok(v);
            }
        }
    }

    // Try 3: First { to last }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(v) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                if v.is_object() {
                    return Ok(v);
                }
            }
        }
    }

    Err(AiError::Parse(direct_err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_plain_object() {
        assert_eq!(extract_json(r#" {"a": 1} "#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn extract_from_json_fence() {
        let reply = "```json\n{\"score\": 72}\n```";
        assert_eq!(extract_json(reply).unwrap(), json!({"score": 72}));
    }

    #[test]
    fn extract_from_bare_fence_without_closing() {
        let reply = "```\n{\"score\": 72}\n";
        assert_eq!(extract_json(reply).unwrap(), json!({"score": 72}));
    }

    #[test]
    fn extract_from_surrounding_prose() {
        let reply = "Here is the analysis: {\"ok\": true} Hope this helps.";
        assert_eq!(extract_json(reply).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn non_json_is_a_hard_error() {
        assert!(matches!(extract_json("I cannot do that."), Err(AiError::Parse(_))));
        assert!(matches!(extract_json("[1, 2, 3]"), Err(AiError::Parse(_))));
        assert!(matches!(extract_json("   "), Err(AiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn analyze_json_cleans_fenced_reply() {
        let client = MockClient::new().with_default_reply("```json\n{\"x\": 1}\n```");
        let value = client.analyze_json("sys", "user", None).await.unwrap();
        assert_eq!(value, json!({"x": 1}));
    }
}

//! Anthropic Messages API client.

use super::{AiClient, AiError};
use crate::config::AiConfig;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for `POST {base_url}/v1/messages`.
pub struct AnthropicClient {
    http_client: Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Build a client from configuration. Requires an API key.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::NotConfigured("ANTHROPIC_API_KEY is not set".into()))?;

        let mut headers = header::HeaderMap::new();
        let key_value = header::HeaderValue::from_str(api_key)
            .map_err(|e| AiError::NotConfigured(format!("invalid API key: {}", e)))?;
        headers.insert("x-api-key", key_value);
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AiError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AiClient for AnthropicClient {
    async fn analyze(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, AiError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: max_tokens.unwrap_or(self.max_tokens),
            system: system_prompt,
            messages: [Message {
                role: "user",
                content: user_prompt,
            }],
        };

        debug!(
            model = %self.model,
            prompt_chars = user_prompt.len(),
            max_tokens = request.max_tokens,
            "Sending messages request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("malformed messages response: {}", e)))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        debug!(reply_chars = text.len(), "Messages response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_not_configured() {
        let config = AiConfig::default();
        assert!(matches!(
            AnthropicClient::from_config(&config),
            Err(AiError::NotConfigured(_))
        ));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = AiConfig {
            api_key: Some("sk-test".into()),
            base_url: "http://localhost:9999/".into(),
            ..AiConfig::default()
        };
        let client = AnthropicClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/v1/messages");
        assert_eq!(client.model(), "claude-sonnet-4-5-20250929");
    }

    #[test]
    fn request_serializes_in_messages_shape() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 10,
            system: "sys",
            messages: [Message {
                role: "user",
                content: "hi",
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["system"], "sys");
        assert_eq!(value["max_tokens"], 10);
    }
}

//! AI-completion client — the single point of entry for LLM calls in
//! Hirelink.
//!
//! The orchestration layer talks to the [`CompletionClient`] trait only, so
//! tests substitute fakes and the binary decides the concrete backend.
//! "Unconfigured" (no API key) is a normal state, not an error: callers
//! check [`CompletionClient::is_configured`] and fall back to the
//! deterministic score.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Intentionally hardcoded to prevent accidental drift across environments.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.3;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion client is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Who authored a message in the conversation we send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// One role-tagged message. The orchestrator builds an ordered list of
/// these per enhancement call.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The completion backend seam. Send a conversation, get the assistant's
/// text back. Multi-turn and tool-call responses are out of scope.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether the client can make calls at all. False short-circuits the
    /// whole enhancement pass; it is not an error condition.
    fn is_configured(&self) -> bool;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API backend. Retries 429 and 5xx with exponential
/// backoff; owns authentication.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: Option<String>,
}

impl AnthropicClient {
    /// `api_key = None` (or blank) builds an unconfigured client; every
    /// call then short-circuits with [`LlmError::NotConfigured`].
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    async fn call(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let (system, user_messages) = partition_messages(messages);
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: user_messages,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: AnthropicResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                parsed.usage.input_tokens, parsed.usage.output_tokens
            );

            return parsed
                .text()
                .map(str::to_string)
                .ok_or(LlmError::EmptyContent);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key.clone().ok_or(LlmError::NotConfigured)?;
        self.call(&api_key, messages).await
    }
}

/// Splits a conversation into the Anthropic request shape: system messages
/// concatenate into the `system` field, user messages stay ordered in
/// `messages`.
fn partition_messages(messages: &[ChatMessage]) -> (String, Vec<AnthropicMessage<'_>>) {
    let system = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let rest = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| AnthropicMessage {
            role: "user",
            content: &m.content,
        })
        .collect();

    (system, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_splits_system_from_user() {
        let messages = vec![
            ChatMessage::system("You are a recruiter."),
            ChatMessage::user("Score this pair."),
            ChatMessage::user("And explain why."),
        ];
        let (system, rest) = partition_messages(&messages);
        assert_eq!(system, "You are a recruiter.");
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].role, "user");
        assert_eq!(rest[1].content, "And explain why.");
    }

    #[test]
    fn test_partition_concatenates_multiple_system_messages() {
        let messages = vec![
            ChatMessage::system("Part one."),
            ChatMessage::system("Part two."),
        ];
        let (system, rest) = partition_messages(&messages);
        assert_eq!(system, "Part one.\n\nPart two.");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_missing_or_blank_key_means_unconfigured() {
        assert!(!AnthropicClient::new(None).is_configured());
        assert!(!AnthropicClient::new(Some("   ".to_string())).is_configured());
        assert!(AnthropicClient::new(Some("sk-test".to_string())).is_configured());
    }
}

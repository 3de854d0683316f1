//! The single network stage: POST the payload, read the reply.
//!
//! This module is intentionally thin — prompt engineering lives in
//! [`crate::prompts`], payload assembly in [`crate::pipeline::request`].
//! One submission means exactly one HTTP call: failures are classified and
//! surfaced to the caller unchanged, never retried. The user pressing the
//! button again *is* the retry policy.

use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::pipeline::request::ChatRequest;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// How much of an upstream error body to keep in the error message.
const ERROR_BODY_LIMIT: usize = 1024;

/// Client for an OpenRouter-compatible chat-completions endpoint.
#[derive(Debug)]
pub struct ModelClient {
    http: reqwest::Client,
    chat_url: String,
    api_key: String,
    timeout_secs: u64,
}

/// The extracted assistant reply plus token usage.
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Raw assistant message content (the structured-correction JSON text).
    pub content: String,
    /// Prompt tokens reported by the provider, 0 when absent.
    pub prompt_tokens: u64,
    /// Completion tokens reported by the provider, 0 when absent.
    pub completion_tokens: u64,
}

impl ModelClient {
    /// Build a client from the config.
    ///
    /// # Errors
    /// [`GradeError::ApiKeyMissing`] when no credential is configured.
    pub fn new(config: &GradingConfig) -> Result<Self, GradeError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GradeError::ApiKeyMissing)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| GradeError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            chat_url: format!(
                "{}/chat/completions",
                config.endpoint.trim_end_matches('/')
            ),
            api_key,
            timeout_secs: config.api_timeout_secs,
        })
    }

    /// Perform the chat-completions call and extract the assistant reply.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ModelReply, GradeError> {
        let response = self
            .http
            .post(&self.chat_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GradeError::UpstreamTimeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    GradeError::UpstreamRequest {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!("Correction model returned {}: {}", status, body);
            return Err(GradeError::UpstreamStatus {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let completion: ChatCompletion =
            response
                .json()
                .await
                .map_err(|e| GradeError::MalformedResponse {
                    detail: format!("response body is not valid JSON: {e}"),
                })?;

        let usage = completion.usage.unwrap_or_default();
        debug!(
            "Model reply: {} prompt tokens, {} completion tokens",
            usage.prompt_tokens, usage.completion_tokens
        );

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GradeError::MalformedResponse {
                detail: "no message content in response".to_string(),
            })?;

        Ok(ModelReply {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}

// ── Response wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Strip a markdown code fence from model output if present.
///
/// Providers without strict structured-output support occasionally wrap the
/// JSON in ```json … ``` despite the schema; tolerate it.
pub(crate) fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the opening fence line (with optional language tag).
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

fn truncate(body: &str, limit: usize) -> String {
    if body.len() > limit {
        let mut end = limit;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    } else {
        body.to_string()
    }
}

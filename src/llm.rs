//! One-shot chat-completion client for the connectivity doctor.
//!
//! OpenRouter, OpenAI, and Ollama all speak the OpenAI-compatible
//! `/chat/completions` shape; Anthropic uses its own `/v1/messages` API.
//! Requests are issued strictly one at a time, with a client-level timeout
//! and no retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ModelSpec, Provider, RuntimeConfig};
use crate::error::LlmError;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A single chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Sampling and length parameters for one completion.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

/// Thin HTTP client for one-off completions.
pub struct ChatClient {
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Issue one chat completion against the provider named by `spec` and
    /// return the assistant text.
    pub async fn complete(
        &self,
        config: &RuntimeConfig,
        spec: &ModelSpec,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        tracing::debug!(model = %spec, "issuing chat completion");
        match spec.provider {
            Provider::Anthropic => self.complete_anthropic(config, spec, messages, params).await,
            _ => self.complete_openai_compatible(config, spec, messages, params).await,
        }
    }

    async fn complete_openai_compatible(
        &self,
        config: &RuntimeConfig,
        spec: &ModelSpec,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        let provider = spec.provider.as_str().to_string();
        let base = match spec.provider {
            Provider::OpenRouter => OPENROUTER_BASE_URL.to_string(),
            Provider::OpenAi => OPENAI_BASE_URL.to_string(),
            Provider::Ollama => format!("{}/v1", config.ollama_base_url.trim_end_matches('/')),
            Provider::Anthropic => unreachable!("anthropic uses the messages API"),
        };

        let mut request = self
            .http
            .post(format!("{base}/chat/completions"))
            .json(&OpenAiRequest {
                model: &spec.model,
                messages,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
                stream: false,
            });

        if let Some(key) = config.api_key_for(spec.provider) {
            request = request.bearer_auth(key);
        } else if spec.provider != Provider::Ollama {
            return Err(LlmError::AuthFailed { provider });
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed { provider });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider,
                reason: format!("{status}: {}", truncate(&body, 300)),
            });
        }

        let parsed: OpenAiResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::InvalidResponse {
                provider,
                reason: "response contained no assistant message".to_string(),
            })
    }

    async fn complete_anthropic(
        &self,
        config: &RuntimeConfig,
        spec: &ModelSpec,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        let provider = spec.provider.as_str().to_string();
        let key = config
            .api_key_for(Provider::Anthropic)
            .ok_or_else(|| LlmError::AuthFailed {
                provider: provider.clone(),
            })?;

        let response = self
            .http
            .post(format!("{ANTHROPIC_BASE_URL}/v1/messages"))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&AnthropicRequest {
                model: &spec.model,
                messages,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed { provider });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider,
                reason: format!("{status}: {}", truncate(&body, 300)),
            });
        }

        let parsed: AnthropicResponse = response.json().await?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::InvalidResponse {
                provider,
                reason: "response contained no text block".to_string(),
            })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

//! Runtime configuration for the connectivity doctor.
//!
//! Resolved from the process environment after `dotenvy` has loaded `.env`,
//! mirroring what the research agent's own loader reads: the
//! `FAST_LLM`/`SMART_LLM`/`STRATEGIC_LLM` triple as `provider:model` pairs,
//! provider API keys, and a couple of provider-specific knobs.

use crate::error::ConfigError;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenRouter,
    OpenAi,
    Anthropic,
    Ollama,
}

impl Provider {
    pub fn parse(value: &str, key: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!(
                    "unknown provider '{value}' (expected openrouter, openai, anthropic, or ollama)"
                ),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }

    /// Env var holding this provider's API key, if it needs one.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }
}

/// A `provider:model` pair as written into the env file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl ModelSpec {
    /// Parse `openrouter:anthropic/claude-3.5-haiku` style values. The model
    /// part may itself contain `:` (Ollama tags), so only the first colon
    /// splits.
    pub fn parse(value: &str, key: &str) -> Result<Self, ConfigError> {
        let (provider, model) = value.split_once(':').ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected 'provider:model', got '{value}'"),
        })?;
        let model = model.trim();
        if model.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "model name is empty".to_string(),
            });
        }
        Ok(Self {
            provider: Provider::parse(provider, key)?,
            model: model.to_string(),
        })
    }
}

impl std::fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider.as_str(), self.model)
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub fast_llm: ModelSpec,
    pub smart_llm: ModelSpec,
    pub strategic_llm: ModelSpec,
    /// OpenRouter request rate limit (requests per second).
    pub openrouter_limit_rps: f64,
    pub ollama_base_url: String,
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            fast_llm: ModelSpec::parse(&require_env("FAST_LLM")?, "FAST_LLM")?,
            smart_llm: ModelSpec::parse(&require_env("SMART_LLM")?, "SMART_LLM")?,
            strategic_llm: ModelSpec::parse(&require_env("STRATEGIC_LLM")?, "STRATEGIC_LLM")?,
            openrouter_limit_rps: optional_env("OPENROUTER_LIMIT_RPS")
                .map(|s| {
                    s.parse().map_err(|e| ConfigError::InvalidValue {
                        key: "OPENROUTER_LIMIT_RPS".to_string(),
                        message: format!("must be a number: {e}"),
                    })
                })
                .transpose()?
                .unwrap_or(1.0),
            ollama_base_url: optional_env("OLLAMA_BASE_URL")
                .unwrap_or_else(|| "http://localhost:11434".to_string()),
        })
    }

    /// The distinct providers referenced by the model triple, in
    /// fast/smart/strategic order.
    pub fn providers(&self) -> Vec<Provider> {
        let mut providers = Vec::new();
        for spec in [&self.fast_llm, &self.smart_llm, &self.strategic_llm] {
            if !providers.contains(&spec.provider) {
                providers.push(spec.provider);
            }
        }
        providers
    }

    /// Look up the API key for a provider from the environment. `None` when
    /// the provider needs no key, or the var is unset/blank.
    pub fn api_key_for(&self, provider: Provider) -> Option<String> {
        provider.api_key_var().and_then(optional_env)
    }
}

/// Read an env var, treating unset and whitespace-only values as absent.
pub(crate) fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::MissingRequired {
        key: key.to_string(),
        hint: "Run `switchboard switch` to apply a provider preset.".to_string(),
    })
}

//! Configuration for the remote model client.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::CompletionParams;

/// Default chat-completion endpoint (Groq, OpenAI-compatible).
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Remote model settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Bearer credential. `None` puts the whole service in degraded mode.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Sampling temperature for the assistant chat path.
    pub temperature: f32,
    /// Nucleus sampling for the assistant chat path.
    pub top_p: f32,
    /// Maximum output tokens for the assistant chat path.
    pub max_tokens: u32,
    /// Request timeout for the assistant chat path.
    #[serde(with = "crate::config::duration_secs")]
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 512,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl LlmConfig {
    /// Whether a non-empty credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Completion parameters for the assistant chat path.
    #[must_use]
    pub const fn chat_params(&self) -> CompletionParams {
        CompletionParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            timeout: self.request_timeout,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Backoff settings for the retry layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, first call included.
    pub max_attempts: u32,
    /// Delay before the first retry, doubled on each attempt.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
    /// Random jitter added on top of the computed backoff.
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 20_000,
            jitter_ms: 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert!(!config.has_credential());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.chat_params().max_tokens, 512);
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let config = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };
        assert!(!config.has_credential());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = LlmConfig {
            api_key: Some("gsk_secret".to_string()),
            ..LlmConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("***"));
    }
}

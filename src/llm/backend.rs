//! Raw chat-completion transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::debug;

use super::config::LlmConfig;
use super::error::LlmError;
use super::types::{ChatRequest, WireRequest, WireResponse};
use crate::text::truncate_chars;

/// Maximum number of body characters kept from an error response.
const ERROR_BODY_CHARS: usize = 200;

/// Connection timeout, independent of the per-call budget.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fallible single request/response call to a chat-completion API.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request and return the first choice's raw content.
    ///
    /// # Errors
    /// Returns an error on transport failure, timeout, non-2xx status or an
    /// undecodable body.
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// OpenAI-compatible backend (Groq by default).
pub struct GroqBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GroqBackend {
    /// Build a backend from the model settings.
    ///
    /// # Errors
    /// Returns an error if no credential is configured, the endpoint is not a
    /// valid URL, or the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        url::Url::parse(&config.endpoint)
            .map_err(|e| LlmError::Config(format!("endpoint {}: {e}", config.endpoint)))?;

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let timeout = request.params.timeout;
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&WireRequest::from(request))
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, ERROR_BODY_CHARS),
                retry_after,
            });
        }

        let payload: WireResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(timeout)
            } else {
                LlmError::Decode(e.to_string())
            }
        })?;

        Ok(payload.first_content())
    }
}

#[async_trait]
impl ChatBackend for GroqBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let timeout = request.params.timeout;
        // Hard bound on the whole exchange, body included.
        tokio::time::timeout(timeout, self.exchange(request))
            .await
            .map_err(|_| LlmError::Timeout(timeout))?
    }
}

/// Split reqwest failures into timeouts and other transport errors.
fn classify(err: reqwest::Error, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(timeout)
    } else {
        LlmError::Transport(err)
    }
}

/// Read a `Retry-After` header expressed in (possibly fractional) seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let secs: f64 = raw.parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

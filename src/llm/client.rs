//! Fail-soft model client used by every call site.

use std::sync::Arc;

use tracing::warn;

use super::backend::{ChatBackend, GroqBackend};
use super::config::{LlmConfig, RetryConfig};
use super::error::{DEGRADED_MESSAGE, LlmError};
use super::retry::{RetryPolicy, Retrying};
use super::types::{ChatRequest, CompletionParams};

/// Remote model client that never fails.
///
/// Without a credential every call returns [`DEGRADED_MESSAGE`] and no request
/// is sent. Otherwise backend errors are turned into descriptive text.
#[derive(Clone)]
pub struct ModelClient {
    backend: Option<Arc<dyn ChatBackend>>,
    model: String,
}

impl ModelClient {
    /// Wrap an arbitrary backend. The backend is only used when `config`
    /// carries a credential.
    #[must_use]
    pub fn new(config: &LlmConfig, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend: config.has_credential().then_some(backend),
            model: config.model.clone(),
        }
    }

    /// A client that answers every call with the degraded-mode message.
    #[must_use]
    pub fn degraded(model: impl Into<String>) -> Self {
        Self {
            backend: None,
            model: model.into(),
        }
    }

    /// Build the Groq backend wrapped in the retry layer.
    ///
    /// # Errors
    /// Returns an error if a credential is present but the backend cannot be
    /// built (invalid endpoint, TLS setup failure).
    pub fn from_config(config: &LlmConfig, retry: &RetryConfig) -> Result<Self, LlmError> {
        if !config.has_credential() {
            warn!("GROQ_API_KEY not set, model calls run in degraded mode");
            return Ok(Self::degraded(config.model.clone()));
        }

        let backend = Retrying::new(GroqBackend::new(config)?, RetryPolicy::from(retry));
        Ok(Self::new(config, Arc::new(backend)))
    }

    /// Whether calls actually reach a model.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one completion and return its trimmed text.
    ///
    /// Failures come back as text: the degraded-mode message, `HTTP <status>: ...`
    /// or `Network error: ...`. An empty string means the model answered with
    /// nothing; callers substitute their own placeholder.
    pub async fn complete(&self, system: &str, user: &str, params: &CompletionParams) -> String {
        let Some(backend) = &self.backend else {
            return DEGRADED_MESSAGE.to_string();
        };

        let request = ChatRequest::new(&self.model, system, user, params.clone());
        match backend.chat(&request).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                warn!(model = %self.model, "model call failed: {err}");
                err.soft_text()
            }
        }
    }
}

//! Error types for the remote model layer.

use std::time::Duration;

use thiserror::Error;

/// Fixed reply used whenever no model credential is configured.
pub const DEGRADED_MESSAGE: &str = "Degraded mode: no model API key configured.";

/// Errors raised by a [`ChatBackend`](super::ChatBackend).
///
/// These never leave [`ModelClient`](super::ModelClient): they are folded into
/// the returned text by [`LlmError::soft_text`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// No credential for the remote model.
    #[error("no model API key configured")]
    MissingApiKey,

    /// The call did not complete within its budget.
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// Connection refused, DNS failure, TLS error...
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, already truncated.
        body: String,
        /// Server-supplied `Retry-After` delay.
        retry_after: Option<Duration>,
    },

    /// The body could not be decoded as a completion response.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("invalid model configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Check if the retry layer should try again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Delay requested by the server, if any.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Text that replaces the model output when the call failed.
    #[must_use]
    pub fn soft_text(&self) -> String {
        match self {
            Self::MissingApiKey => DEGRADED_MESSAGE.to_string(),
            Self::Status { status, body, .. } => format!("HTTP {status}: {body}"),
            Self::Timeout(_) | Self::Transport(_) => format!("Network error: {self}"),
            Self::Decode(msg) => format!("Malformed model response: {msg}"),
            Self::Config(msg) => format!("Model configuration error: {msg}"),
        }
    }
}

//! Remote model client for OpenAI-compatible chat-completion APIs.
//!
//! Layers, from the wire up:
//! - [`ChatBackend`]: one fallible request/response call ([`GroqBackend`]).
//! - [`Retrying`]: backoff-with-jitter decorator over any backend.
//! - [`ModelClient`]: fail-soft facade returning text, with degraded mode.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use backend::{ChatBackend, GroqBackend};
pub use client::ModelClient;
pub use config::{LlmConfig, RetryConfig};
pub use error::{DEGRADED_MESSAGE, LlmError};
pub use retry::{RetryPolicy, Retrying};
pub use types::{ChatMessage, ChatRequest, ChatRole, CompletionParams};

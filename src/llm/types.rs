//! Request and response shapes for OpenAI-compatible chat completions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Role instruction (persona, output structure).
    System,
    /// End-user content.
    User,
    /// Model output.
    Assistant,
}

/// A single chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling and transport parameters of one completion call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Maximum number of generated tokens.
    pub max_tokens: u32,
    /// Timeout budget for the call.
    pub timeout: Duration,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 512,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A fully-formed chat completion request.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation, system instruction first.
    pub messages: Vec<ChatMessage>,
    /// Sampling parameters.
    pub params: CompletionParams,
}

impl ChatRequest {
    /// Build the usual two-message request: role instruction then user text.
    #[must_use]
    pub fn new(model: &str, system: &str, user: &str, params: CompletionParams) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            params,
        }
    }

    /// Text of the last user message, if any.
    #[must_use]
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Body sent on the wire.
#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl<'a> From<&'a ChatRequest> for WireRequest<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            max_tokens: request.params.max_tokens,
        }
    }
}

/// Subset of the completion response we read.
#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    #[serde(default)]
    pub choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireChoice {
    #[serde(default)]
    pub message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl WireResponse {
    /// Content of the first choice, empty when absent.
    pub fn first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}

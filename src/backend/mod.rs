//! Chat-completion backends for AI-powered analysis

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BackendError;

pub mod http;

pub use http::HttpChatBackend;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Framing and ground rules
    System,

    /// The actual analysis request
    User,

    /// A model reply
    Assistant,
}

impl MessageRole {
    /// Wire name expected by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One message in a chat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author
    pub role: MessageRole,

    /// Message body
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// The system/user message pair sent for one analysis call.
///
/// The system message frames the model as a reviewer for the request's
/// analysis type and pins the reply format to bare JSON; the user
/// message carries the rendered prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBag {
    /// Framing message, always first on the wire
    pub system: ChatMessage,

    /// Prompt message, always second on the wire
    pub user: ChatMessage,
}

impl MessageBag {
    /// Build a bag from raw message texts
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: ChatMessage::system(system),
            user: ChatMessage::user(user),
        }
    }

    /// Messages in wire order
    pub fn ordered(&self) -> [&ChatMessage; 2] {
        [&self.system, &self.user]
    }
}

/// Tuning knobs for one completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Sampling temperature
    pub temperature: f64,

    /// Reply length ceiling in tokens
    pub max_tokens: u32,

    /// How long to wait for the backend
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 2048,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A chat-completion backend capable of answering analysis prompts
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs and diagnostics
    fn name(&self) -> &str;

    /// Whether the backend has everything it needs to accept calls
    fn is_configured(&self) -> bool;

    /// Send the messages to the named model and return the raw reply text
    async fn complete(
        &self,
        model: &str,
        messages: &MessageBag,
        options: &CompletionOptions,
    ) -> Result<String, BackendError>;
}

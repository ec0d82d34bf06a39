//! OpenAI-compatible chat-completion backend over HTTP

use std::env;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{ChatBackend, CompletionOptions, MessageBag};
use crate::config::BackendConfig;
use crate::errors::BackendError;

/// Longest error body we echo back into error messages
const MAX_ERROR_BODY: usize = 400;

/// Chat backend that talks to any OpenAI-compatible HTTP endpoint
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Request body for the chat completions endpoint
#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// The slice of the response body we actually read
#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    content: Option<String>,
}

impl HttpChatBackend {
    /// Create a backend against the given base URL with an explicit key
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Create a backend from configuration, pulling the API key from the
    /// environment variable the config names
    pub fn from_config(config: &BackendConfig) -> Self {
        let api_key = env::var(&config.api_key_env).ok().filter(|key| !key.is_empty());
        if api_key.is_none() {
            warn!(
                "No API key found in ${}; AI analysis will be unavailable",
                config.api_key_env
            );
        }
        Self::new(config.base_url.clone(), api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        model: &str,
        messages: &MessageBag,
        options: &CompletionOptions,
    ) -> Result<String, BackendError> {
        let api_key = self.api_key.as_deref().ok_or(BackendError::NotConfigured)?;

        let body = WireRequest {
            model,
            messages: messages
                .ordered()
                .iter()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let url = self.endpoint();
        debug!("POST {} (model {}, max_tokens {})", url, model, options.max_tokens);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_excerpt(&text),
            });
        }

        extract_content(&text)
    }
}

/// Bound an error body for inclusion in an error message.
///
/// Cuts on a char boundary so a multibyte body can never split a
/// character mid-sequence.
pub fn error_excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY {
        return trimmed.to_string();
    }
    let mut cut = MAX_ERROR_BODY;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    trimmed[..cut].to_string()
}

/// Pull the completion text out of a chat completions response body.
///
/// Kept separate from the HTTP plumbing so the decoding rules can be
/// tested without a live endpoint.
pub fn extract_content(body: &str) -> Result<String, BackendError> {
    let response: WireResponse = serde_json::from_str(body)
        .map_err(|err| BackendError::MalformedResponse(err.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(BackendError::EmptyResponse)
}

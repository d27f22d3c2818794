//! Chat-completion client that turns a prompt into page copy.

use std::time::Duration;

use landify_core::{GeneratedContent, config::GenerationConfig};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::prompt::ChatMessage;

/// Longest raw response excerpt kept in an error.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Content generation errors.
///
/// Every variant is recoverable at the group level: the caller skips the
/// group and moves on.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential in the environment.
    #[error("environment variable {0} is not set")]
    MissingCredential(String),

    /// Network or client failure.
    #[error("failed to contact generation endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("generation endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body lacks `choices[0].message.content`.
    #[error("unexpected response format: {message}; raw: {raw}")]
    MissingContent { message: String, raw: String },

    /// Message content is not usable page copy.
    #[error("generated content is not valid: {message}; raw: {raw}")]
    Format { message: String, raw: String },
}

/// Produces page copy for a prompt.
pub trait ContentGenerator {
    fn generate(&self, messages: &[ChatMessage]) -> Result<GeneratedContent, GenerationError>;
}

impl<G: ContentGenerator + ?Sized> ContentGenerator for &G {
    fn generate(&self, messages: &[ChatMessage]) -> Result<GeneratedContent, GenerationError> {
        (**self).generate(messages)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    stream: bool,
    messages: &'a [ChatMessage],
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Blocking client for an OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key_env: String,
    api_key: Option<String>,
}

impl ChatClient {
    /// Create a client, reading the bearer token from the environment
    /// variable named in `config`.
    ///
    /// A missing token is not an error here; each call reports it instead.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("landify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key_env: config.api_key_env.clone(),
            api_key,
        })
    }

    /// Override the credential.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Drop any credential picked up from the environment.
    #[must_use]
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract and parse `choices[0].message.content` from a response body.
    pub fn parse_response(body: &str) -> Result<GeneratedContent, GenerationError> {
        let data: Value = serde_json::from_str(body).map_err(|e| GenerationError::MissingContent {
            message: format!("response is not JSON: {e}"),
            raw: excerpt(body),
        })?;

        let content = data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| GenerationError::MissingContent {
                message: "missing choices[0].message.content".to_string(),
                raw: excerpt(body),
            })?
            .trim();

        let value: Value = serde_json::from_str(content).map_err(|e| GenerationError::Format {
            message: format!("content is not JSON: {e}"),
            raw: excerpt(content),
        })?;

        serde_json::from_value(value).map_err(|e| GenerationError::Format {
            message: e.to_string(),
            raw: excerpt(content),
        })
    }
}

impl ContentGenerator for ChatClient {
    fn generate(&self, messages: &[ChatMessage]) -> Result<GeneratedContent, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::MissingCredential(self.api_key_env.clone()))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            stream: false,
            messages,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "requesting page copy");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Self::parse_response(&body)
    }
}

fn excerpt(s: &str) -> String {
    s.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

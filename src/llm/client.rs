use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Errors from asking the oracle for a structured guess
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Request(String),
    #[error("oracle API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("oracle reply had no text content")]
    EmptyReply,
    #[error("oracle reply is not a valid episode record: {0}")]
    Malformed(String),
}

/// A prompt pair sent to the oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub system: String,
    pub user: String,
}

/// Anything that can answer an extraction prompt with raw reply text
///
/// The reply is expected to be JSON, possibly fenced; parsing and validation
/// are the caller's job.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn request(&self, request: &OracleRequest) -> Result<String, OracleError>;
}

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Whole-request timeout; hitting it counts as an oracle failure
    pub timeout: Duration,
}

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

impl AnthropicConfig {
    /// Create config from environment variables
    ///
    /// `ANTHROPIC_MODEL` overrides the default model when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, model))
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.1,
            max_tokens: 1500,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Build the HTTP client; fails rather than run without the timeout
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a message to Claude and get a response
    pub async fn send_message(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api { status, body });
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Request(format!("unreadable response body: {}", e)))?;

        // Extract text from the first content block
        response
            .content
            .into_iter()
            .find(|c| c.content_type == "text" && !c.text.trim().is_empty())
            .map(|c| c.text)
            .ok_or(OracleError::EmptyReply)
    }
}

#[async_trait]
impl Oracle for AnthropicClient {
    async fn request(&self, request: &OracleRequest) -> Result<String, OracleError> {
        self.send_message(&request.system, &request.user).await
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

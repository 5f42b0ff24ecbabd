//! Petition transcript summarisation through the Anthropic Messages API.

use std::time::Duration;

use axum::http::StatusCode;
use domain::models::summary::{build_prompt, parse_extracted_petition, ExtractedPetition};
use domain::models::summary::ExtractionError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while summarising a transcript.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("AI service API key is not configured")]
    NotConfigured,

    #[error("AI service rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("AI service rate limit exceeded")]
    RateLimited,

    #[error("AI service request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service error: HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response from AI service: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl SummaryError {
    /// Classifies a failed upstream call.
    ///
    /// The status code decides when it is specific; otherwise the error text
    /// is checked for the API key, rate limit and timeout markers.
    pub fn from_upstream(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => return SummaryError::Unauthorized(status),
            429 => return SummaryError::RateLimited,
            408 | 504 => return SummaryError::Timeout,
            _ => {}
        }

        let lowered = message.to_lowercase();
        if lowered.contains("api key") || lowered.contains("api_key") {
            SummaryError::NotConfigured
        } else if lowered.contains("rate limit") || lowered.contains("rate_limit") {
            SummaryError::RateLimited
        } else if lowered.contains("timeout") || lowered.contains("timed out") {
            SummaryError::Timeout
        } else {
            SummaryError::Upstream { status, message }
        }
    }

    /// HTTP status returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SummaryError::NotConfigured | SummaryError::Unauthorized(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SummaryError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SummaryError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            SummaryError::Http(_)
            | SummaryError::Upstream { .. }
            | SummaryError::InvalidResponse(_)
            | SummaryError::Extraction(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message returned to the caller. Upstream details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            SummaryError::NotConfigured | SummaryError::Unauthorized(_) => {
                "AI service is not configured correctly"
            }
            SummaryError::RateLimited => "AI service rate limit exceeded. Please try again later.",
            SummaryError::Timeout => "AI service timed out. Please try again.",
            SummaryError::Extraction(_) | SummaryError::InvalidResponse(_) => {
                "Could not extract petition details from the AI response"
            }
            SummaryError::Http(_) | SummaryError::Upstream { .. } => "AI service request failed",
        }
    }

    /// Label for the `ai_summary_requests_total` outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            SummaryError::NotConfigured | SummaryError::Unauthorized(_) => "not_configured",
            SummaryError::RateLimited => "rate_limited",
            SummaryError::Timeout => "timeout",
            SummaryError::Extraction(_) | SummaryError::InvalidResponse(_) => "invalid_response",
            SummaryError::Http(_) | SummaryError::Upstream { .. } => "upstream_error",
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the LLM completion endpoint.
pub struct SummaryClient {
    client: Client,
    config: LlmConfig,
}

impl SummaryClient {
    pub fn new(config: LlmConfig) -> Result<Self, SummaryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    /// Extracts petition fields from a validated transcript.
    pub async fn summarize(&self, transcript: &str) -> Result<ExtractedPetition, SummaryError> {
        if !self.is_configured() {
            return Err(SummaryError::NotConfigured);
        }

        let reply = self.complete(&build_prompt(transcript)).await?;
        debug!(reply_len = reply.len(), "AI reply received");

        Ok(parse_extracted_petition(&reply)?)
    }

    /// Sends one user message and returns the concatenated text blocks.
    async fn complete(&self, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummaryError::Timeout
                } else {
                    SummaryError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .map(|envelope| {
                    let kind = envelope.error.kind.unwrap_or_default();
                    let message = envelope.error.message.unwrap_or_default();
                    format!("{} {}", kind, message).trim().to_string()
                })
                .unwrap_or(text);

            warn!(status = status.as_u16(), error = %message, "AI service returned an error");
            return Err(SummaryError::from_upstream(status.as_u16(), message));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(SummaryError::InvalidResponse(
                "No text content in response".into(),
            ));
        }

        Ok(text)
    }
}

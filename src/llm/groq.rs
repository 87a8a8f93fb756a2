// ABOUTME: Groq LLM provider implementation for schema-constrained plan generation
// ABOUTME: Uses Groq's OpenAI-compatible chat completions API with JSON schema response formats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Groq Provider
//!
//! Hosted backend for plan generation. Groq accepts JSON schema response
//! formats, so every stage gets constrained decoding.
//!
//! ## Configuration
//!
//! Set `GROQ_API_KEY` with a key from the Groq Console:
//! <https://console.groq.com/keys>
//!
//! ## Supported Models
//!
//! - `llama-3.3-70b-versatile` (default): best plan quality
//! - `llama-3.1-8b-instant`: fast, good enough for single workouts
//! - `openai/gpt-oss-120b`: strict JSON schema decoding

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::env;
use tracing::{debug, error, instrument, warn};

use super::wire::{body_preview, ApiErrorDetail, CompletionBody, CompletionReply, WireFormat};
use super::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use crate::errors::AppError;

/// Environment variable holding the Groq API key
const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const AVAILABLE_MODELS: &[&str] = &[
    "llama-3.3-70b-versatile",
    "llama-3.1-8b-instant",
    "openai/gpt-oss-120b",
    "openai/gpt-oss-20b",
];

const API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Service label used in error messages
const SERVICE: &str = "Groq";

/// Groq LLM provider using LPU-accelerated inference
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqProvider {
    /// Create a new Groq provider with the given API key
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: API_BASE_URL.to_owned(),
        }
    }

    /// Point the provider at a different OpenAI-compatible base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a Groq provider from `GROQ_API_KEY`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `GROQ_API_KEY` is not set
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(GROQ_API_KEY_ENV).map_err(|_| {
            AppError::config(format!(
                "Missing {GROQ_API_KEY_ENV} environment variable. Get your API key from https://console.groq.com/keys"
            ))
        })?;

        Ok(Self::new(api_key))
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url.trim_end_matches('/'))
    }

    /// Map a non-success status and body onto an application error
    fn status_error(status: StatusCode, body: &str) -> AppError {
        let Some(detail) = ApiErrorDetail::parse(body) else {
            return AppError::external_service(
                SERVICE,
                format!("API error ({status}): {}", body_preview(body)),
            );
        };

        match status {
            StatusCode::UNAUTHORIZED => {
                AppError::config(format!("Groq API authentication failed: {}", detail.message))
            }
            StatusCode::TOO_MANY_REQUESTS => AppError::external_service(
                SERVICE,
                format!("Rate limit exceeded: {}", detail.message),
            ),
            StatusCode::BAD_REQUEST => {
                AppError::invalid_input(format!("Groq API validation error: {}", detail.message))
            }
            _ => AppError::external_service(
                SERVICE,
                format!(
                    "{} - {}",
                    detail.error_type.as_deref().unwrap_or("unknown"),
                    detail.message
                ),
            ),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn display_name(&self) -> &'static str {
        "Groq (Llama)"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::structured()
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(DEFAULT_MODEL)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let body = CompletionBody::new(
            model,
            request,
            request.response_format.as_ref().map(WireFormat::exact),
        );
        debug!(messages = body.message_count(), "Sending Groq chat completion");

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Groq API: {e}");
                AppError::external_service(SERVICE, format!("Failed to connect: {e}"))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
        })?;
        if !status.is_success() {
            return Err(Self::status_error(status, &text));
        }

        let reply = CompletionReply::decode(SERVICE, &text)?;
        debug!(
            chars = reply.content.len(),
            finish_reason = ?reply.finish_reason,
            "Received Groq completion"
        );
        Ok(reply)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(self.api_url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("Health check failed: {e}")))?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(status = %response.status(), "Groq health check failed");
        }
        Ok(healthy)
    }
}

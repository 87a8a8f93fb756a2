// ABOUTME: Generic OpenAI-compatible LLM provider for local and self-hosted endpoints
// ABOUTME: Presets for Ollama, vLLM and LocalAI, downgrading response formats to what each honors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Lets plans be generated against a local model server. Backends differ in
//! how much output constraint they accept, so the requested response format
//! is downgraded to the preset's capabilities before it goes on the wire.
//!
//! ## Configuration
//!
//! - `LOCAL_LLM_BASE_URL`: Base URL (default: <http://localhost:11434/v1> for Ollama)
//! - `LOCAL_LLM_MODEL`: Model to use (default: `qwen2.5:14b-instruct`)
//! - `LOCAL_LLM_API_KEY`: API key (optional, empty for local servers)

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, RequestBuilder, StatusCode};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::wire::{body_preview, ApiErrorDetail, CompletionBody, CompletionReply, WireFormat};
use super::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, ResponseFormat};
use crate::errors::AppError;

const LOCAL_LLM_BASE_URL_ENV: &str = "LOCAL_LLM_BASE_URL";
const LOCAL_LLM_MODEL_ENV: &str = "LOCAL_LLM_MODEL";
const LOCAL_LLM_API_KEY_ENV: &str = "LOCAL_LLM_API_KEY";

/// Ollama's default endpoint
const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

const DEFAULT_MODEL: &str = "qwen2.5:14b-instruct";

const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Transport ceiling; a full skeleton on local hardware can take minutes
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Service label used in error messages
const SERVICE: &str = "LocalLLM";

const AVAILABLE_MODELS: &[&str] = &[
    "qwen2.5:14b-instruct",
    "qwen2.5:32b-instruct",
    "llama3.1:8b-instruct",
    "llama3.3:70b-instruct",
    "mistral:7b-instruct",
];

/// Known local model servers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalServer {
    /// Ollama, schema-constrained output via `format`
    Ollama,
    /// vLLM with guided decoding
    Vllm,
    /// `LocalAI`, JSON mode only
    LocalAi,
    /// Anything else speaking the chat completions API
    Generic,
}

impl LocalServer {
    /// Guess the server from the well-known default port in `base_url`
    #[must_use]
    pub fn detect(base_url: &str) -> Self {
        if base_url.contains(":11434") {
            Self::Ollama
        } else if base_url.contains(":8000") {
            Self::Vllm
        } else if base_url.contains(":8080") {
            Self::LocalAi
        } else {
            Self::Generic
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Vllm => "vllm",
            Self::LocalAi => "localai",
            Self::Generic => "local",
        }
    }

    const fn display_name(self) -> &'static str {
        match self {
            Self::Ollama => "Ollama (Local)",
            Self::Vllm => "vLLM (Local)",
            Self::LocalAi => "LocalAI",
            Self::Generic => "Local LLM",
        }
    }

    const fn default_base_url(self) -> &'static str {
        match self {
            Self::Ollama | Self::Generic => DEFAULT_BASE_URL,
            Self::Vllm => "http://localhost:8000/v1",
            Self::LocalAi => "http://localhost:8080/v1",
        }
    }

    const fn capabilities(self) -> LlmCapabilities {
        match self {
            Self::Ollama | Self::Vllm => LlmCapabilities::structured(),
            Self::LocalAi | Self::Generic => {
                LlmCapabilities::SYSTEM_MESSAGES.union(LlmCapabilities::JSON_MODE)
            }
        }
    }
}

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <http://localhost:11434/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Model used when a request names none
    pub default_model: String,
    /// Which server this is; decides name and capabilities
    pub server: LocalServer,
    /// Output constraints the server honors
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Preset for `server` at its default endpoint
    #[must_use]
    pub fn for_server(server: LocalServer, model: &str) -> Self {
        Self {
            base_url: server.default_base_url().to_owned(),
            api_key: None,
            default_model: model.to_owned(),
            server,
            capabilities: server.capabilities(),
        }
    }

    /// Configuration for a local Ollama instance
    #[must_use]
    pub fn ollama(model: &str) -> Self {
        Self::for_server(LocalServer::Ollama, model)
    }

    /// Configuration for a local vLLM instance
    #[must_use]
    pub fn vllm(model: &str) -> Self {
        Self::for_server(LocalServer::Vllm, model)
    }

    /// Configuration for `LocalAI`
    #[must_use]
    pub fn local_ai(model: &str) -> Self {
        Self::for_server(LocalServer::LocalAi, model)
    }
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self::for_server(LocalServer::Generic, DEFAULT_MODEL)
    }
}

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from `LOCAL_LLM_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url =
            env::var(LOCAL_LLM_BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let model = env::var(LOCAL_LLM_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        let api_key = env::var(LOCAL_LLM_API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty());

        let mut config =
            OpenAiCompatibleConfig::for_server(LocalServer::detect(&base_url), &model);
        config.base_url = base_url;
        config.api_key = api_key;

        info!(
            provider = config.server.name(),
            base_url = %config.base_url,
            model = %config.default_model,
            "Initializing local LLM provider"
        );
        Self::new(config)
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_key.as_deref() {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Downgrade the requested format to what this backend can honor
    fn wire_format<'a>(&self, format: Option<&'a ResponseFormat>) -> Option<WireFormat<'a>> {
        let capabilities = self.config.capabilities;
        let format = format?;
        match format {
            ResponseFormat::JsonSchema { .. } if capabilities.supports_json_schema() => {
                Some(WireFormat::exact(format))
            }
            _ if capabilities.supports_json_mode() => Some(WireFormat::JsonObject),
            _ => None,
        }
    }

    fn connection_error(&self, e: &ReqwestError) -> AppError {
        if e.is_connect() {
            AppError::external_service(
                SERVICE,
                format!(
                    "Cannot connect to {}. Is the server running at {}?",
                    self.config.server.name(),
                    self.config.base_url
                ),
            )
        } else {
            AppError::external_service(SERVICE, format!("Failed to connect: {e}"))
        }
    }

    /// Map a non-success status and body onto an application error
    fn status_error(status: StatusCode, body: &str) -> AppError {
        match (ApiErrorDetail::parse(body), status) {
            (Some(detail), StatusCode::UNAUTHORIZED) => {
                AppError::config(format!("API authentication failed: {}", detail.message))
            }
            (Some(detail), StatusCode::NOT_FOUND) => AppError::external_service(
                SERVICE,
                format!("Model or endpoint not found: {}", detail.message),
            ),
            (Some(detail), _) => {
                AppError::external_service(SERVICE, format!("({status}) {}", detail.message))
            }
            // Proxies in front of local servers answer with plain text or HTML
            (
                None,
                StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT,
            ) => AppError::external_service(
                SERVICE,
                "Local LLM server is not responding. Is Ollama/vLLM running?",
            ),
            (None, _) => AppError::external_service(
                SERVICE,
                format!("API error ({status}): {}", body_preview(body)),
            ),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.server.name()
    }

    fn display_name(&self) -> &'static str {
        self.config.server.display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    #[instrument(skip(self, request), fields(provider = self.config.server.name()))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        let body = CompletionBody::new(
            model,
            request,
            self.wire_format(request.response_format.as_ref()),
        );
        debug!(model, messages = body.message_count(), "Sending local chat completion");

        let response = self
            .authorized(self.client.post(self.api_url("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {}: {e}", self.config.server.name());
                self.connection_error(&e)
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
            "Received local completion"
        );
        Ok(reply)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .authorized(self.client.get(self.api_url("models")))
            .send()
            .await
            .map_err(|e| self.connection_error(&e))?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(
                provider = self.config.server.name(),
                status = %response.status(),
                "Local LLM health check failed"
            );
        }
        Ok(healthy)
    }
}

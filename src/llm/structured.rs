// ABOUTME: Structured generation client turning one prompt into one schema-validated object
// ABOUTME: Maps transport, empty and malformed responses onto distinct generation error kinds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Structured Generation Client
//!
//! One call, one outbound request, one validated object. The client never
//! retries and never caches: the caller owns the retry budget, and identical
//! prompts may legitimately produce different valid objects.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use super::prompts::COACH_SYSTEM_PROMPT;
use super::{
    ChatMessage, ChatRequest, LlmProvider, LlmProviderRegistry, ModelSelector, ResponseFormat,
};
use crate::errors::{GenerationError, SchemaValidationError};
use crate::training_plan::schema::OutputSchema;

/// Sampling temperature for plan generation
const GENERATION_TEMPERATURE: f32 = 0.4;

/// Locate the JSON object inside a backend response
///
/// Accepts a bare object, an object wrapped in a markdown code fence, or an
/// object surrounded by prose.
#[must_use]
pub fn extract_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    if let Some(fenced) = trimmed.strip_prefix("```") {
        let body = fenced.trim_start_matches("json");
        if let Some(end) = body.rfind("```") {
            return extract_json(&body[..end]);
        }
    }

    if trimmed.starts_with('{') && serde_json::from_str::<Value>(trimmed).is_ok() {
        return Some(trimmed);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

/// Client issuing schema-constrained generation calls
#[derive(Clone)]
pub struct StructuredGenerationClient {
    registry: LlmProviderRegistry,
    call_timeout: Option<Duration>,
}

impl StructuredGenerationClient {
    /// Create a client over the given providers
    #[must_use]
    pub const fn new(registry: LlmProviderRegistry) -> Self {
        Self {
            registry,
            call_timeout: None,
        }
    }

    /// Bound every call; an elapsed call fails as a provider error
    #[must_use]
    pub const fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Registered providers
    #[must_use]
    pub const fn registry(&self) -> &LlmProviderRegistry {
        &self.registry
    }

    fn provider(&self, selector: &ModelSelector) -> Result<Arc<dyn LlmProvider>, GenerationError> {
        self.registry.get(&selector.provider).ok_or_else(|| {
            GenerationError::Provider(format!(
                "no LLM provider named '{}' is registered",
                selector.provider
            ))
        })
    }

    fn build_request<S: OutputSchema>(provider: &dyn LlmProvider, prompt: &str) -> ChatRequest {
        let capabilities = provider.capabilities();
        let messages = if capabilities.supports_system_messages() {
            vec![
                ChatMessage::system(COACH_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ]
        } else {
            vec![ChatMessage::user(format!("{COACH_SYSTEM_PROMPT}\n\n{prompt}"))]
        };

        let request = ChatRequest::new(messages).with_temperature(GENERATION_TEMPERATURE);
        if capabilities.supports_json_schema() {
            request.with_response_format(ResponseFormat::JsonSchema {
                name: S::STAGE.as_str().to_owned(),
                schema: S::descriptor(),
            })
        } else if capabilities.supports_json_mode() {
            request.with_response_format(ResponseFormat::JsonObject)
        } else {
            request
        }
    }

    /// Generate one object of schema `S`
    ///
    /// # Errors
    ///
    /// - `GenerationError::Provider` for transport, provider or timeout failures
    /// - `GenerationError::EmptyResponse` if the backend returned no content
    /// - `GenerationError::SchemaValidation` if the content is not a valid `S`
    #[instrument(skip(self, prompt), fields(stage = %S::STAGE, model = %selector))]
    pub async fn generate<S: OutputSchema>(
        &self,
        prompt: &str,
        selector: &ModelSelector,
    ) -> Result<S::Output, GenerationError> {
        let provider = self.provider(selector)?;
        let mut request = Self::build_request::<S>(provider.as_ref(), prompt);
        if let Some(model) = &selector.model {
            request = request.with_model(model.clone());
        }

        debug!(prompt_len = prompt.len(), "Issuing structured generation call");

        let call = provider.complete(&request);
        let response = match self.call_timeout {
            Some(limit) => timeout(limit, call).await.map_err(|_| {
                warn!(timeout_secs = limit.as_secs(), "Structured generation call timed out");
                GenerationError::Provider(format!("call timed out after {}s", limit.as_secs()))
            })?,
            None => call.await,
        }
        .map_err(|e| GenerationError::Provider(e.to_string()))?;

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let json = extract_json(&response.content).ok_or_else(|| {
            SchemaValidationError::single(S::STAGE, "response does not contain a JSON object")
        })?;
        let candidate: Value = serde_json::from_str(json).map_err(|e| {
            SchemaValidationError::single(S::STAGE, format!("response is not valid JSON: {e}"))
        })?;

        Ok(S::validate(candidate)?)
    }
}

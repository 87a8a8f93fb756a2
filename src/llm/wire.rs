// ABOUTME: Chat-completions wire format shared by every OpenAI-style backend
// ABOUTME: Borrowing request bodies, reply decoding and error body parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, TokenUsage};
use crate::errors::AppError;

/// Longest slice of a non-JSON error body echoed back in an error message
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

// ============================================================================
// Request Body
// ============================================================================

#[derive(Debug, Serialize)]
pub(super) struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireFormat<'a>>,
    stream: bool,
}

impl<'a> CompletionBody<'a> {
    /// Non-streaming body for `request`; `response_format` is already downgraded by the caller
    pub(super) fn new(
        model: &'a str,
        request: &'a ChatRequest,
        response_format: Option<WireFormat<'a>>,
    ) -> Self {
        Self {
            model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format,
            stream: false,
        }
    }

    pub(super) fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum WireFormat<'a> {
    JsonObject,
    JsonSchema { json_schema: WireSchema<'a> },
}

#[derive(Debug, Serialize)]
pub(super) struct WireSchema<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

impl<'a> WireFormat<'a> {
    /// Pass the requested format through unchanged
    pub(super) fn exact(format: &'a ResponseFormat) -> Self {
        match format {
            ResponseFormat::JsonObject => Self::JsonObject,
            ResponseFormat::JsonSchema { name, schema } => Self::JsonSchema {
                json_schema: WireSchema {
                    name,
                    schema,
                    strict: false,
                },
            },
        }
    }
}

// ============================================================================
// Reply Body
// ============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct CompletionReply {
    choices: Vec<ReplyChoice>,
    #[serde(default)]
    usage: Option<ReplyUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ReplyChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl CompletionReply {
    /// Decode a successful reply body into the first choice
    ///
    /// # Errors
    ///
    /// Returns an external service error if the body is not a completion or has no choices.
    pub(super) fn decode(service: &str, body: &str) -> Result<ChatResponse, AppError> {
        let reply: Self = serde_json::from_str(body).map_err(|e| {
            AppError::external_service(service, format!("Failed to parse response: {e}"))
        })?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(service, "API returned no choices"))?;

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: reply.model,
            usage: reply.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

// ============================================================================
// Error Body
// ============================================================================

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorDetail,
}

/// `{"error": {"message": ..., "type": ...}}` body returned on failure
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

impl ApiErrorDetail {
    /// Parse a JSON error body; `None` for plain text or HTML bodies
    pub(super) fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

/// First characters of an unstructured error body
pub(super) fn body_preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}

// ABOUTME: Model selection values naming the provider and model for each generation stage
// ABOUTME: Immutable for the duration of a plan request and shared read-only by every stage call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

use stride_core::errors::Stage;

/// Provider and model used for one generation call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSelector {
    /// Registered provider name (e.g. "groq", "ollama")
    pub provider: String,
    /// Model id; the provider default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ModelSelector {
    /// Selector for a provider and explicit model
    #[must_use]
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: Some(model.into()),
        }
    }

    /// Selector that uses the provider's default model
    #[must_use]
    pub fn provider_default(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: None,
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "{}/{model}", self.provider),
            None => write!(f, "{}/default", self.provider),
        }
    }
}

/// Per-stage model choice for a whole plan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSelection {
    /// Model for the skeleton stage
    pub skeleton: ModelSelector,
    /// Model for every week outline call
    pub week_outline: ModelSelector,
    /// Model for every workout call
    pub workout: ModelSelector,
}

impl ModelSelection {
    /// Use the same selector for every stage
    #[must_use]
    pub fn uniform(selector: &ModelSelector) -> Self {
        Self {
            skeleton: selector.clone(),
            week_outline: selector.clone(),
            workout: selector.clone(),
        }
    }

    /// Selector for a given stage
    #[must_use]
    pub const fn for_stage(&self, stage: Stage) -> &ModelSelector {
        match stage {
            Stage::Skeleton => &self.skeleton,
            Stage::WeekOutline => &self.week_outline,
            Stage::Workout => &self.workout,
        }
    }
}

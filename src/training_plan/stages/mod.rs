// ABOUTME: Stage generator contract shared by the skeleton, week outline and workout stages
// ABOUTME: LLM-backed generator rendering versioned prompts and calling the structured client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stage Generators
//!
//! Every stage has the same shape: render a template from a context, make one
//! structured generation call, and (for the calendar-bearing stages) cross-check
//! the returned dates. A stage call either succeeds or fails with a
//! [`GenerationError`]; it never retries on its own.

mod skeleton;
mod week_outline;
mod workout;

pub use skeleton::{check_skeleton_dates, SkeletonContext};
pub use week_outline::{check_outline_dates, WeekOutlineContext};
pub use workout::WorkoutContext;

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::GenerationError;
use crate::llm::prompts::{EmbeddedTemplateStore, TemplateStore};
use crate::llm::{ModelSelector, StructuredGenerationClient};
use crate::models::{Skeleton, WeekOutline, Workout};

/// One generation stage: context in, validated output or a tagged failure out
#[async_trait]
pub trait StageGenerator<C, O>: Send + Sync
where
    C: Send + Sync,
{
    /// Run the stage once
    ///
    /// # Errors
    ///
    /// Returns the `GenerationError` describing why this single call failed.
    async fn generate(&self, context: &C, selector: &ModelSelector) -> Result<O, GenerationError>;
}

/// Skeleton stage object
pub type SkeletonGenerator = dyn StageGenerator<SkeletonContext, Skeleton>;
/// Week outline stage object
pub type WeekOutlineGenerator = dyn StageGenerator<WeekOutlineContext, WeekOutline>;
/// Workout stage object
pub type WorkoutGenerator = dyn StageGenerator<WorkoutContext, Workout>;

/// Stage generator backed by the structured generation client
#[derive(Clone)]
pub struct LlmStageGenerator {
    client: StructuredGenerationClient,
    templates: Arc<dyn TemplateStore>,
}

impl LlmStageGenerator {
    /// Create a generator using the given templates
    #[must_use]
    pub fn new(client: StructuredGenerationClient, templates: Arc<dyn TemplateStore>) -> Self {
        Self { client, templates }
    }

    /// Create a generator using the templates compiled into the binary
    #[must_use]
    pub fn with_embedded_templates(client: StructuredGenerationClient) -> Self {
        Self::new(client, Arc::new(EmbeddedTemplateStore))
    }

    /// Underlying structured generation client
    #[must_use]
    pub const fn client(&self) -> &StructuredGenerationClient {
        &self.client
    }
}

/// The three stage generators the orchestrator drives
#[derive(Clone)]
pub struct StageGenerators {
    /// Skeleton stage
    pub skeleton: Arc<SkeletonGenerator>,
    /// Week outline stage
    pub week_outline: Arc<WeekOutlineGenerator>,
    /// Workout stage
    pub workout: Arc<WorkoutGenerator>,
}

impl StageGenerators {
    /// Use one LLM-backed generator for every stage
    #[must_use]
    pub fn llm(generator: LlmStageGenerator) -> Self {
        let generator = Arc::new(generator);
        Self {
            skeleton: generator.clone(),
            week_outline: generator.clone(),
            workout: generator,
        }
    }
}

/// Placeholder value for an absent optional questionnaire answer
pub(crate) fn or_unspecified(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("not specified")
}

// ABOUTME: Generation context wiring the LLM provider, prompt templates and the orchestrator
// ABOUTME: Built once from configuration and shared by the HTTP routes and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use tracing::info;

use crate::config::{LlmProviderType, PlannerConfig};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{DirectoryTemplateStore, EmbeddedTemplateStore, TemplateStore};
use crate::llm::{
    GroqProvider, LlmProvider, LlmProviderRegistry, ModelSelection, OpenAiCompatibleProvider,
    StructuredGenerationClient,
};
use crate::training_plan::{LlmStageGenerator, StageGenerators, TrainingPlanOrchestrator};

/// Generation context containing the orchestrator and request defaults
#[derive(Clone)]
pub struct GenerationContext {
    orchestrator: Arc<TrainingPlanOrchestrator>,
    default_models: ModelSelection,
}

impl GenerationContext {
    /// Create new generation context
    #[must_use]
    pub fn new(orchestrator: TrainingPlanOrchestrator, default_models: ModelSelection) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            default_models,
        }
    }

    /// Build the provider, templates and orchestrator described by `config`
    ///
    /// # Errors
    ///
    /// Returns a config error if provider credentials are missing or the
    /// template override directory cannot be read.
    pub fn from_config(config: &PlannerConfig) -> AppResult<Self> {
        let provider: Arc<dyn LlmProvider> = match config.llm_provider {
            LlmProviderType::Groq => Arc::new(GroqProvider::from_env()?),
            LlmProviderType::Local => Arc::new(OpenAiCompatibleProvider::from_env()?),
        };

        let templates: Arc<dyn TemplateStore> = match &config.prompt_template_dir {
            Some(dir) => Arc::new(
                DirectoryTemplateStore::load(dir).map_err(|e| AppError::config(e.to_string()))?,
            ),
            None => Arc::new(EmbeddedTemplateStore),
        };

        Ok(Self::with_provider(config, provider, templates))
    }

    /// Build around an already constructed provider
    #[must_use]
    pub fn with_provider(
        config: &PlannerConfig,
        provider: Arc<dyn LlmProvider>,
        templates: Arc<dyn TemplateStore>,
    ) -> Self {
        let provider_name = provider.name();
        let mut registry = LlmProviderRegistry::new();
        registry.register(provider);

        let client =
            StructuredGenerationClient::new(registry).with_call_timeout(config.call_timeout);
        let stages = StageGenerators::llm(LlmStageGenerator::new(client, templates));
        let orchestrator = TrainingPlanOrchestrator::new(stages)
            .with_retry_policies(config.retry)
            .with_max_concurrency(config.max_concurrency);
        let default_models = config.models.selection(provider_name);

        info!(
            provider = provider_name,
            skeleton_model = %default_models.skeleton,
            week_outline_model = %default_models.week_outline,
            workout_model = %default_models.workout,
            "Generation context ready"
        );

        Self::new(orchestrator, default_models)
    }

    /// Get the orchestrator
    #[must_use]
    pub const fn orchestrator(&self) -> &Arc<TrainingPlanOrchestrator> {
        &self.orchestrator
    }

    /// Models used when a request does not name its own
    #[must_use]
    pub const fn default_models(&self) -> &ModelSelection {
        &self.default_models
    }
}

// ABOUTME: Environment-based configuration for plan generation and the HTTP server
// ABOUTME: Parses STRIDE_* variables into typed models, retry policies, limits and paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Planner configuration loaded from environment variables

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::types::LlmProviderType;
use crate::constants::ports::DEFAULT_HTTP_PORT;
use crate::errors::{AppError, AppResult};
use crate::llm::{ModelSelection, ModelSelector};
use crate::training_plan::retry::{RetryPolicies, StageRetryPolicy, DEFAULT_RETRY_BACKOFF};

/// Fallback model for every stage
pub const LLM_MODEL_ENV: &str = "STRIDE_LLM_MODEL";
/// Skeleton stage model
pub const SKELETON_MODEL_ENV: &str = "STRIDE_SKELETON_MODEL";
/// Week outline stage model
pub const WEEK_OUTLINE_MODEL_ENV: &str = "STRIDE_WEEK_OUTLINE_MODEL";
/// Workout stage model
pub const WORKOUT_MODEL_ENV: &str = "STRIDE_WORKOUT_MODEL";
/// Cap on in-flight generation calls
pub const MAX_CONCURRENCY_ENV: &str = "STRIDE_PLAN_MAX_CONCURRENCY";
/// Per-call timeout in seconds
pub const CALL_TIMEOUT_ENV: &str = "STRIDE_LLM_CALL_TIMEOUT_SECS";
/// Skeleton attempts
pub const SKELETON_ATTEMPTS_ENV: &str = "STRIDE_SKELETON_MAX_ATTEMPTS";
/// Week outline attempts
pub const WEEK_OUTLINE_ATTEMPTS_ENV: &str = "STRIDE_WEEK_OUTLINE_MAX_ATTEMPTS";
/// Workout attempts
pub const WORKOUT_ATTEMPTS_ENV: &str = "STRIDE_WORKOUT_MAX_ATTEMPTS";
/// Whether schema failures are retried
pub const RETRY_SCHEMA_ERRORS_ENV: &str = "STRIDE_RETRY_SCHEMA_ERRORS";
/// Base retry backoff in milliseconds
pub const RETRY_BACKOFF_ENV: &str = "STRIDE_RETRY_BACKOFF_MS";
/// Directory overriding embedded prompt templates
pub const PROMPT_TEMPLATE_DIR_ENV: &str = "STRIDE_PROMPT_TEMPLATE_DIR";
/// HTTP server port
pub const HTTP_PORT_ENV: &str = "STRIDE_HTTP_PORT";

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    non_empty_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AppError::config(format!("{key}: invalid value '{raw}': {e}")))
        })
        .transpose()
}

fn parse_flag(key: &str, default: bool) -> bool {
    non_empty_var(key).map_or(default, |value| {
        !(value.eq_ignore_ascii_case("false") || value == "0")
    })
}

/// Per-stage model overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageModels {
    /// Fallback for every stage
    pub default: Option<String>,
    /// Skeleton override
    pub skeleton: Option<String>,
    /// Week outline override
    pub week_outline: Option<String>,
    /// Workout override
    pub workout: Option<String>,
}

impl StageModels {
    fn from_env() -> Self {
        Self {
            default: non_empty_var(LLM_MODEL_ENV),
            skeleton: non_empty_var(SKELETON_MODEL_ENV),
            week_outline: non_empty_var(WEEK_OUTLINE_MODEL_ENV),
            workout: non_empty_var(WORKOUT_MODEL_ENV),
        }
    }

    fn selector(&self, provider: &str, stage_model: Option<&String>) -> ModelSelector {
        stage_model
            .or(self.default.as_ref())
            .map_or_else(
                || ModelSelector::provider_default(provider),
                |model| ModelSelector::new(provider, model.clone()),
            )
    }

    /// Model selection for a registered provider
    #[must_use]
    pub fn selection(&self, provider: &str) -> ModelSelection {
        ModelSelection {
            skeleton: self.selector(provider, self.skeleton.as_ref()),
            week_outline: self.selector(provider, self.week_outline.as_ref()),
            workout: self.selector(provider, self.workout.as_ref()),
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// LLM backend
    pub llm_provider: LlmProviderType,
    /// Per-stage models
    pub models: StageModels,
    /// Cap on in-flight generation calls; `None` is unbounded
    pub max_concurrency: Option<usize>,
    /// Per-call timeout; `None` waits for the provider
    pub call_timeout: Option<Duration>,
    /// Orchestrator retry policies
    pub retry: RetryPolicies,
    /// Prompt template override directory
    pub prompt_template_dir: Option<PathBuf>,
    /// HTTP server port
    pub http_port: u16,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProviderType::default(),
            models: StageModels::default(),
            max_concurrency: None,
            call_timeout: None,
            retry: RetryPolicies::default(),
            prompt_template_dir: None,
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if a numeric variable does not parse or an
    /// attempt count is zero.
    pub fn from_env() -> AppResult<Self> {
        let backoff = parse_var::<u64>(RETRY_BACKOFF_ENV)?
            .map_or(DEFAULT_RETRY_BACKOFF, Duration::from_millis);
        let retry_schema_errors = parse_flag(RETRY_SCHEMA_ERRORS_ENV, true);
        let stage_policy = |key: &str| -> AppResult<StageRetryPolicy> {
            let max_attempts = parse_var::<u32>(key)?.unwrap_or(1);
            if max_attempts == 0 {
                return Err(AppError::config(format!("{key} must be at least 1")));
            }
            Ok(StageRetryPolicy {
                max_attempts,
                backoff,
                retry_schema_errors,
            })
        };

        let config = Self {
            llm_provider: LlmProviderType::from_env(),
            models: StageModels::from_env(),
            max_concurrency: parse_var::<usize>(MAX_CONCURRENCY_ENV)?.filter(|limit| *limit > 0),
            call_timeout: parse_var::<u64>(CALL_TIMEOUT_ENV)?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            retry: RetryPolicies {
                skeleton: stage_policy(SKELETON_ATTEMPTS_ENV)?,
                week_outline: stage_policy(WEEK_OUTLINE_ATTEMPTS_ENV)?,
                workout: stage_policy(WORKOUT_ATTEMPTS_ENV)?,
            },
            prompt_template_dir: non_empty_var(PROMPT_TEMPLATE_DIR_ENV).map(PathBuf::from),
            http_port: parse_var::<u16>(HTTP_PORT_ENV)?.unwrap_or(DEFAULT_HTTP_PORT),
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!(
            llm_provider = %self.llm_provider,
            default_model = self.models.default.as_deref().unwrap_or("provider default"),
            max_concurrency = ?self.max_concurrency,
            call_timeout_secs = ?self.call_timeout.map(|t| t.as_secs()),
            skeleton_attempts = self.retry.skeleton.max_attempts,
            week_outline_attempts = self.retry.week_outline.max_attempts,
            workout_attempts = self.retry.workout.max_attempts,
            prompt_template_dir = ?self.prompt_template_dir,
            http_port = self.http_port,
            "Planner configuration loaded"
        );
    }
}

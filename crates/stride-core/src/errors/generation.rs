// ABOUTME: Error taxonomy for the multi-stage training-plan generation pipeline
// ABOUTME: Distinguishes fatal plan errors from recoverable per-week and per-day stage failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Generation Errors
//!
//! Every stage call returns `Result<T, GenerationError>`. The orchestrator
//! decides the recovery tier from the stage that failed:
//!
//! - skeleton failures become [`PlanGenerationError::SkeletonGeneration`] and abort the request
//! - week and day failures are recorded as failure markers inside the plan

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline stage that produced an error or a failure marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Phase/week scaffold for the whole plan
    Skeleton,
    /// Day-by-day outline for one week
    WeekOutline,
    /// Concrete interval workout for one day
    Workout,
}

impl Stage {
    /// Stable identifier used in logs and schema names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton",
            Self::WeekOutline => "week_outline",
            Self::Workout => "workout",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inverted or malformed date range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date range: start {start} is after end {end}")]
pub struct InvalidRangeError {
    /// Requested start date
    pub start: NaiveDate,
    /// Requested end date
    pub end: NaiveDate,
}

impl InvalidRangeError {
    /// Create a new range error
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Structured output failed local structural validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} output failed schema validation: {}", .details.join("; "))]
pub struct SchemaValidationError {
    /// Stage whose schema was violated
    pub stage: Stage,
    /// Every violation found, in document order
    pub details: Vec<String>,
}

impl SchemaValidationError {
    /// Create a validation error with a single violation
    #[must_use]
    pub fn single(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            details: vec![detail.into()],
        }
    }
}

/// Structured output disagrees with the partitioned calendar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} output is inconsistent with the computed calendar: {}", .details.join("; "))]
pub struct DateConsistencyError {
    /// Stage whose dates were inconsistent
    pub stage: Stage,
    /// Every mismatch found
    pub details: Vec<String>,
}

/// Prompt template could not be loaded or rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Template text references a placeholder with no supplied value
    #[error("template '{template}' has no value for placeholder '{{{placeholder}}}'")]
    MissingPlaceholder {
        /// Template identifier
        template: String,
        /// Placeholder name without braces
        placeholder: String,
    },
    /// Template source could not be read
    #[error("template '{template}' could not be loaded: {reason}")]
    Unavailable {
        /// Template identifier
        template: String,
        /// Underlying cause
        reason: String,
    },
}

/// Failure of a single structured generation unit of work
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Network, transport, timeout, or provider-side error
    #[error("provider error: {0}")]
    Provider(String),
    /// Backend answered with no content at all
    #[error("provider returned an empty response")]
    EmptyResponse,
    /// Backend content failed schema coercion or validation
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),
    /// Backend invented dates outside the computed calendar
    #[error(transparent)]
    DateConsistency(#[from] DateConsistencyError),
    /// Prompt template problem (never retried)
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The surrounding plan request was cancelled
    #[error("generation cancelled")]
    Cancelled,
}

/// Flat error kind recorded in failure markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationErrorKind {
    /// See [`GenerationError::Provider`]
    ProviderError,
    /// See [`GenerationError::EmptyResponse`]
    EmptyResponseError,
    /// See [`GenerationError::SchemaValidation`]
    SchemaValidationError,
    /// See [`GenerationError::DateConsistency`]
    DateConsistencyError,
    /// See [`GenerationError::Template`]
    TemplateError,
    /// See [`GenerationError::Cancelled`]
    Cancelled,
}

impl GenerationError {
    /// Flat kind of this error
    #[must_use]
    pub const fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::Provider(_) => GenerationErrorKind::ProviderError,
            Self::EmptyResponse => GenerationErrorKind::EmptyResponseError,
            Self::SchemaValidation(_) => GenerationErrorKind::SchemaValidationError,
            Self::DateConsistency(_) => GenerationErrorKind::DateConsistencyError,
            Self::Template(_) => GenerationErrorKind::TemplateError,
            Self::Cancelled => GenerationErrorKind::Cancelled,
        }
    }

    /// Whether the backend produced content that did not match expectations
    #[must_use]
    pub const fn is_schema_failure(&self) -> bool {
        matches!(self, Self::SchemaValidation(_) | Self::DateConsistency(_))
    }

    /// Whether issuing a brand-new call could plausibly succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Template(_) | Self::Cancelled)
    }
}

/// Fatal failure of a whole plan request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanGenerationError {
    /// Start/race dates are inverted; no generation call was made
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    /// The skeleton stage failed, so there is no plan to fan out from
    #[error("skeleton generation failed: {0}")]
    SkeletonGeneration(GenerationError),
    /// The request was cancelled before the plan was assembled
    #[error("training plan generation cancelled")]
    Cancelled,
}

impl PlanGenerationError {
    /// Actionable message suitable for end users
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidRange(err) => format!(
                "The race date must not be before the start date ({err}). Adjust the dates and try again."
            ),
            Self::SkeletonGeneration(err) => format!(
                "Could not generate a training plan skeleton ({err}) - try again or adjust dates."
            ),
            Self::Cancelled => "Training plan generation was cancelled.".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_retry_classification() {
        let schema = GenerationError::from(SchemaValidationError::single(Stage::Workout, "x"));
        assert_eq!(schema.kind(), GenerationErrorKind::SchemaValidationError);
        assert!(schema.is_schema_failure());
        assert!(schema.is_retryable());

        assert!(!GenerationError::Cancelled.is_retryable());
        assert!(!GenerationError::Provider("timeout".to_owned()).is_schema_failure());
    }

    #[test]
    fn test_schema_error_lists_every_detail() {
        let error = SchemaValidationError {
            stage: Stage::WeekOutline,
            details: vec!["days[0].date missing".to_owned(), "days[1].intensityLevel out of range".to_owned()],
        };
        let text = error.to_string();
        assert!(text.starts_with("week_outline"));
        assert!(text.contains("days[0].date missing; days[1]"));
    }
}

// ABOUTME: Per-stage retry policy applied by the orchestrator around single stage calls
// ABOUTME: Exponential backoff; template and cancellation failures are never retried
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use crate::errors::{GenerationError, Stage};

/// Default pause before the second attempt
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// How many brand-new calls the orchestrator may issue for one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRetryPolicy {
    /// Total calls per unit, at least 1
    pub max_attempts: u32,
    /// Pause before the second call; doubled for every further call
    pub backoff: Duration,
    /// Whether schema and date consistency failures are worth another call
    pub retry_schema_errors: bool,
}

impl Default for StageRetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl StageRetryPolicy {
    /// One call, no retry
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            backoff: DEFAULT_RETRY_BACKOFF,
            retry_schema_errors: true,
        }
    }

    /// Up to `max_attempts` calls with the given base backoff
    #[must_use]
    pub fn with_attempts(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retry_schema_errors: true,
        }
    }

    /// Whether another call should follow a failed `attempt` (1-based)
    #[must_use]
    pub const fn should_retry(&self, error: &GenerationError, attempt: u32) -> bool {
        attempt < self.max_attempts
            && error.is_retryable()
            && (self.retry_schema_errors || !error.is_schema_failure())
    }

    /// Pause after the failed `attempt` (1-based)
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(1_u32 << exponent)
    }
}

/// Retry policies of the three stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicies {
    /// Skeleton stage
    pub skeleton: StageRetryPolicy,
    /// Week outline stage
    pub week_outline: StageRetryPolicy,
    /// Workout stage
    pub workout: StageRetryPolicy,
}

impl RetryPolicies {
    /// Policy of one stage
    #[must_use]
    pub const fn for_stage(&self, stage: Stage) -> &StageRetryPolicy {
        match stage {
            Stage::Skeleton => &self.skeleton,
            Stage::WeekOutline => &self.week_outline,
            Stage::Workout => &self.workout,
        }
    }
}

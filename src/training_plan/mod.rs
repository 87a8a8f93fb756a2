// ABOUTME: Multi-stage AI training plan generation pipeline
// ABOUTME: Date partitioning, schema validation, stage generators, orchestration and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training Plan Generation
//!
//! Questionnaire → week windows → skeleton → week outlines → workouts → plan.
//!
//! - [`calendar`]: pure date partitioning
//! - [`schema`]: structural validation of every stage output
//! - [`stages`]: one generator per stage
//! - [`orchestrator`]: fan-out, tiered recovery and assembly
//! - [`persistence`]: store contract for reviewed plans

/// Week windows and day slots
pub mod calendar;
/// Orchestration of the three stages
pub mod orchestrator;
/// Persistence adapter contract
pub mod persistence;
/// Per-stage retry policy
pub mod retry;
/// Stage output schemas
pub mod schema;
/// Stage generators
pub mod stages;

pub use calendar::{compute_day_slots, compute_week_windows, window_day_slots};
pub use orchestrator::TrainingPlanOrchestrator;
pub use persistence::{InMemoryPlanStore, TrainingPlanStore};
pub use retry::{RetryPolicies, StageRetryPolicy};
pub use stages::{LlmStageGenerator, StageGenerator, StageGenerators};

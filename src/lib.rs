// ABOUTME: Main library entry point for the Stride AI training plan generator
// ABOUTME: Multi-stage LLM pipeline turning a runner questionnaire into a periodized plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stride Planner
//!
//! Generates a structured running plan from a questionnaire in three stages:
//! a plan skeleton (phases and weeks), one outline per week (days), and one
//! workout per training day. Week and day units run concurrently; a failed
//! unit leaves a marked gap instead of failing the whole plan.
//!
//! ## Architecture
//!
//! - **llm**: provider contract, concrete providers, structured generation and prompt templates
//! - **`training_plan`**: date partitioner, schema validator, stage generators, orchestrator, persistence
//! - **providers**: completed activity history bucketed into plan week windows
//! - **routes**/**context**: the axum HTTP surface and its dependency injection
//! - **config**/**logging**: environment configuration and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stride_planner::config::PlannerConfig;
//! use stride_planner::context::GenerationContext;
//! use stride_planner::errors::AppResult;
//!
//! fn build() -> AppResult<GenerationContext> {
//!     let config = PlannerConfig::from_env()?;
//!     GenerationContext::from_config(&config)
//! }
//! ```

pub use stride_core::{constants, errors, models};

/// Environment-driven configuration
pub mod config;

/// Focused dependency injection contexts
pub mod context;

/// LLM providers, structured generation and prompt templates
pub mod llm;

/// Logging initialization and request-scoped tracing
pub mod logging;

/// Completed activity history providers
pub mod providers;

/// HTTP routes
pub mod routes;

/// Training plan generation pipeline
pub mod training_plan;

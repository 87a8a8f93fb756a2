// ABOUTME: Configuration module for the training plan generator
// ABOUTME: Environment-driven settings for providers, per-stage models, fan-out, retries and HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is read from the environment once at startup and is
//! immutable afterwards.

/// Environment configuration
pub mod environment;
/// Typed configuration enums
pub mod types;

pub use environment::PlannerConfig;
pub use types::LlmProviderType;

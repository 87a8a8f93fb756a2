// ABOUTME: Core types and constants for the Stride AI training-plan generator
// ABOUTME: Foundation crate with error handling, plan/workout models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stride Core
//!
//! Foundation crate providing shared types for the training-plan generator.
//! It holds no I/O and changes infrequently, so the pipeline crate can
//! recompile without touching it.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the generation error taxonomy
//! - **models**: request, skeleton, outline, workout and assembled plan types
//! - **constants**: limits, endpoints and defaults

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models for plan generation
pub mod models;

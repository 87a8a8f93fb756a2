// ABOUTME: Focused dependency injection contexts for plan generation and plan storage
// ABOUTME: Handlers and binaries receive only the dependencies they use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Focused dependency injection contexts
//!
//! # Architecture
//!
//! - `GenerationContext`: orchestrator and default per-stage models
//! - `DataContext`: plan persistence
//! - `ServerContext`: both of the above plus the loaded configuration

pub mod data;
pub mod generation;
pub mod server;

pub use data::DataContext;
pub use generation::GenerationContext;
pub use server::ServerContext;

// ABOUTME: Composed server context holding the generation and data contexts
// ABOUTME: Axum state for every training plan route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::{DataContext, GenerationContext};
use crate::config::PlannerConfig;
use crate::errors::AppResult;

/// Composed server context containing all focused contexts
#[derive(Clone)]
pub struct ServerContext {
    config: Arc<PlannerConfig>,
    generation: GenerationContext,
    data: DataContext,
}

impl ServerContext {
    /// Create new server context from focused contexts
    #[must_use]
    pub fn new(config: PlannerConfig, generation: GenerationContext, data: DataContext) -> Self {
        Self {
            config: Arc::new(config),
            generation,
            data,
        }
    }

    /// Build every context from configuration, with an in-memory plan store
    ///
    /// # Errors
    ///
    /// Returns an error if the generation context cannot be built.
    pub fn from_config(config: PlannerConfig) -> AppResult<Self> {
        let generation = GenerationContext::from_config(&config)?;
        Ok(Self::new(config, generation, DataContext::in_memory()))
    }

    /// Get configuration
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Get generation context
    #[must_use]
    pub const fn generation(&self) -> &GenerationContext {
        &self.generation
    }

    /// Get data context
    #[must_use]
    pub const fn data(&self) -> &DataContext {
        &self.data
    }
}

// ABOUTME: Data context for dependency injection of the training plan store
// ABOUTME: Shared by the save and fetch routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use crate::training_plan::{InMemoryPlanStore, TrainingPlanStore};

/// Data context containing the plan persistence adapter
#[derive(Clone)]
pub struct DataContext {
    plan_store: Arc<dyn TrainingPlanStore>,
}

impl DataContext {
    /// Create new data context
    #[must_use]
    pub fn new(plan_store: Arc<dyn TrainingPlanStore>) -> Self {
        Self { plan_store }
    }

    /// Data context backed by a fresh in-memory store
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPlanStore::new()))
    }

    /// Get the plan store
    #[must_use]
    pub const fn plan_store(&self) -> &Arc<dyn TrainingPlanStore> {
        &self.plan_store
    }
}

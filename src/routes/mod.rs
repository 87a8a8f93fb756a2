// ABOUTME: Route module organization for the training plan HTTP surface
// ABOUTME: Combines the health and training plan routers behind shared middleware
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the orchestrator and the plan store.

/// Health check routes
pub mod health;
/// Training plan generation and storage routes
pub mod training_plan;

pub use health::HealthRoutes;
pub use training_plan::{GeneratePlanRequest, SavedPlanResponse, TrainingPlanRoutes};

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::ServerContext;

/// Full application router
pub fn router(context: ServerContext) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(TrainingPlanRoutes::routes(context))
        .layer(TraceLayer::new_for_http())
}

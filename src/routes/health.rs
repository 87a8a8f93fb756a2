// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Liveness endpoint reporting the service name and current time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::constants::{endpoints, SERVICE_NAME};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the liveness route
    pub fn routes() -> Router {
        Router::new().route(endpoints::HEALTH_CHECK, get(Self::handle_health))
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "timestamp": Utc::now().to_rfc3339()
        }))
    }
}

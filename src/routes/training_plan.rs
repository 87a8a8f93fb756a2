// ABOUTME: Route handlers for training plan generation, saving and retrieval
// ABOUTME: Every endpoint is scoped to the opaque user id carried in the x-user-id header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Training plan routes
//!
//! Generation is synchronous: the response carries the assembled plan.
//! Dropping the HTTP request future cancels the run and aborts in-flight
//! provider calls. Saving a reviewed plan is a separate explicit call.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::constants::{endpoints, USER_ID_HEADER};
use crate::context::ServerContext;
use crate::errors::AppError;
use crate::llm::ModelSelection;
use crate::logging::PlanTraceContext;
use crate::models::{GeneratedTrainingPlan, ScheduleRequest};

/// Body of a generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    /// Questionnaire answers and dates
    pub request: ScheduleRequest,
    /// Per-stage models; configured defaults when absent
    #[serde(default)]
    pub models: Option<ModelSelection>,
}

/// Response of a successful save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlanResponse {
    /// Id of the persisted schedule
    pub id: Uuid,
}

/// Training plan routes implementation
pub struct TrainingPlanRoutes;

impl TrainingPlanRoutes {
    /// Create all training plan routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route(
                endpoints::TRAINING_PLANS_GENERATE,
                post(Self::handle_generate),
            )
            .route(endpoints::TRAINING_PLANS, post(Self::handle_save))
            .route(endpoints::TRAINING_PLAN_BY_ID, get(Self::handle_get))
            .with_state(context)
    }

    /// Opaque current user id from the request headers
    fn current_user(headers: &HeaderMap) -> Result<String, AppError> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(AppError::auth_required)
    }

    async fn handle_generate(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(body): Json<GeneratePlanRequest>,
    ) -> Result<Response, AppError> {
        let user_id = Self::current_user(&headers)?;
        let generation = context.generation();
        let models = body
            .models
            .unwrap_or_else(|| generation.default_models().clone());
        let trace = PlanTraceContext::new(Some(user_id));

        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();

        let plan = generation
            .orchestrator()
            .generate_training_plan(body.request, &models, &trace, &cancel)
            .await
            .map_err(|e| AppError::from(e).with_request_id(trace.request_id.to_string()))?;

        Ok((StatusCode::OK, Json(plan)).into_response())
    }

    async fn handle_save(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(plan): Json<GeneratedTrainingPlan>,
    ) -> Result<Response, AppError> {
        let user_id = Self::current_user(&headers)?;
        let id = context.data().plan_store().save_plan(&user_id, &plan).await?;
        info!(plan_id = %id, request_id = %plan.request_id, "Training plan saved");

        Ok((StatusCode::CREATED, Json(SavedPlanResponse { id })).into_response())
    }

    async fn handle_get(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user_id = Self::current_user(&headers)?;
        let record = context.data().plan_store().get_plan(&user_id, id).await?;

        Ok((StatusCode::OK, Json(record)).into_response())
    }
}

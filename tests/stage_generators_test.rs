// ABOUTME: Integration tests for the LLM-backed stage generators
// ABOUTME: Checks rendered prompts and the calendar cross-checks applied to skeletons and outlines
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::ScriptedProvider;
use stride_planner::errors::{GenerationError, GenerationErrorKind, Stage};
use stride_planner::llm::{LlmProviderRegistry, StructuredGenerationClient};
use stride_planner::models::{
    PhaseObjective, ScheduleRequest, Skeleton, WeekFocus, WeekOutline, Workout,
};
use stride_planner::training_plan::stages::{
    SkeletonContext, StageGenerator, WeekOutlineContext, WorkoutContext,
};
use stride_planner::training_plan::{compute_week_windows, window_day_slots, LlmStageGenerator};

fn generator_for(provider: &Arc<ScriptedProvider>) -> LlmStageGenerator {
    let mut registry = LlmProviderRegistry::new();
    registry.register(provider.clone());
    LlmStageGenerator::with_embedded_templates(StructuredGenerationClient::new(registry))
}

fn january_request() -> ScheduleRequest {
    common::schedule_request(common::date(2024, 1, 1), common::date(2024, 1, 21))
}

fn skeleton_context(request: &ScheduleRequest) -> SkeletonContext {
    SkeletonContext {
        request: Arc::new(request.clone()),
        windows: compute_week_windows(request.start_date, request.race_date).unwrap(),
    }
}

fn outline_context(request: &ScheduleRequest, week_index: usize) -> WeekOutlineContext {
    let windows = compute_week_windows(request.start_date, request.race_date).unwrap();
    let window = windows[week_index];
    WeekOutlineContext {
        request: Arc::new(request.clone()),
        phase_name: "Base".to_owned(),
        phase_objective: PhaseObjective::Base,
        phase_description: "Aerobic foundation".to_owned(),
        week: common::week_from_window(&window),
        day_slots: window_day_slots(&window),
    }
}

fn user_prompt(provider: &ScriptedProvider) -> String {
    provider.requests()[0].messages.last().unwrap().content.clone()
}

#[tokio::test]
async fn test_skeleton_prompt_lists_computed_weeks() {
    common::init_test_logging();
    let request = january_request();
    let body = common::skeleton_json(&request);
    let provider = Arc::new(ScriptedProvider::by_stage(move |_, _| body.clone()));

    let skeleton: Skeleton = generator_for(&provider)
        .generate(&skeleton_context(&request), &common::test_models().skeleton)
        .await
        .unwrap();

    assert_eq!(skeleton.week_count(), 3);
    let prompt = user_prompt(&provider);
    assert!(prompt.contains("- Week 1: 2024-01-01 to 2024-01-07 (7 days)"));
    assert!(prompt.contains("- Week 3: 2024-01-15 to 2024-01-21 (7 days)"));
    assert!(prompt.contains("Riverside Marathon"));
    assert!(!prompt.contains("{weeks}"));
}

#[tokio::test]
async fn test_skeleton_with_renumbered_week_is_date_inconsistent() {
    let request = january_request();
    let windows = compute_week_windows(request.start_date, request.race_date).unwrap();
    let mut skeleton = common::skeleton_for(&windows);
    skeleton.phases[0].weeks[1].week_number = 5;
    let body = serde_json::to_string(&skeleton).unwrap();
    let provider = Arc::new(ScriptedProvider::by_stage(move |_, _| body.clone()));

    let result: Result<Skeleton, GenerationError> = generator_for(&provider)
        .generate(&skeleton_context(&request), &common::test_models().skeleton)
        .await;
    match result {
        Err(GenerationError::DateConsistency(error)) => {
            assert_eq!(error.stage, Stage::Skeleton);
            assert!(error.details.iter().any(|detail| detail.starts_with("weeks[1]")));
        }
        other => panic!("expected a date consistency failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_skeleton_missing_a_week_is_date_inconsistent() {
    let request = january_request();
    let windows = compute_week_windows(request.start_date, request.race_date).unwrap();
    let body = serde_json::to_string(&common::skeleton_for(&windows[..2])).unwrap();
    let provider = Arc::new(ScriptedProvider::by_stage(move |_, _| body.clone()));

    let result: Result<Skeleton, GenerationError> = generator_for(&provider)
        .generate(&skeleton_context(&request), &common::test_models().skeleton)
        .await;
    assert_eq!(
        result.unwrap_err().kind(),
        GenerationErrorKind::DateConsistencyError
    );
}

#[tokio::test]
async fn test_outline_prompt_lists_day_slots() {
    let request = january_request();
    let context = outline_context(&request, 1);
    let body = serde_json::to_string(&common::outline_for(&request, &context.day_slots)).unwrap();
    let provider = Arc::new(ScriptedProvider::by_stage(move |_, _| body.clone()));

    let outline: WeekOutline = generator_for(&provider)
        .generate(&context, &common::test_models().week_outline)
        .await
        .unwrap();

    assert_eq!(outline.days.len(), 7);
    let prompt = user_prompt(&provider);
    assert!(prompt.contains("- Day 1: 2024-01-08 (Monday)"));
    assert!(prompt.contains("- Day 7: 2024-01-14 (Sunday)"));
}

#[tokio::test]
async fn test_outline_with_wrong_day_count_is_schema_failure() {
    let request = january_request();
    let context = outline_context(&request, 0);
    let body =
        serde_json::to_string(&common::outline_for(&request, &context.day_slots[..5])).unwrap();
    let provider = Arc::new(ScriptedProvider::by_stage(move |_, _| body.clone()));

    let result: Result<WeekOutline, GenerationError> = generator_for(&provider)
        .generate(&context, &common::test_models().week_outline)
        .await;
    assert_eq!(
        result.unwrap_err().kind(),
        GenerationErrorKind::SchemaValidationError
    );
}

#[tokio::test]
async fn test_outline_with_wrong_date_is_date_inconsistent() {
    let request = january_request();
    let context = outline_context(&request, 0);
    let mut outline = common::outline_for(&request, &context.day_slots);
    outline.days[3].date = common::date(2024, 1, 11);
    let body = serde_json::to_string(&outline).unwrap();
    let provider = Arc::new(ScriptedProvider::by_stage(move |_, _| body.clone()));

    let result: Result<WeekOutline, GenerationError> = generator_for(&provider)
        .generate(&context, &common::test_models().week_outline)
        .await;
    match result {
        Err(GenerationError::DateConsistency(error)) => assert_eq!(error.stage, Stage::WeekOutline),
        other => panic!("expected a date consistency failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_workout_prompt_describes_the_day() {
    let request = january_request();
    let context = outline_context(&request, 0);
    let outline = common::outline_for(&request, &context.day_slots);
    let day = outline.days[1].clone();
    let provider = Arc::new(ScriptedProvider::by_stage(|stage, _| {
        assert_eq!(stage, "workout");
        common::workout_json("Tuesday intervals")
    }));

    let workout: Workout = generator_for(&provider)
        .generate(
            &WorkoutContext {
                request: Arc::new(request),
                phase_objective: PhaseObjective::Build,
                week_focus: WeekFocus::Threshold,
                day,
            },
            &common::test_models().workout,
        )
        .await
        .unwrap();

    assert_eq!(workout.title, "Tuesday intervals");
    let prompt = user_prompt(&provider);
    assert!(prompt.contains("2024-01-02"));
    assert!(prompt.contains("Tuesday"));
    assert_eq!(provider.requests()[0].model.as_deref(), Some("workout-model"));
}

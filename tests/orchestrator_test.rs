// ABOUTME: Integration tests for the training plan orchestrator
// ABOUTME: Ordering, tiered failure recovery, retries, cancellation, concurrency caps and regeneration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{NaiveDate, Weekday};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use common::{MockStages, ScriptedProvider};
use stride_planner::config::PlannerConfig;
use stride_planner::constants::FAILED_WEEK_DESCRIPTION;
use stride_planner::context::GenerationContext;
use stride_planner::errors::{
    ErrorCode, GenerationError, GenerationErrorKind, PlanGenerationError, Stage,
};
use stride_planner::llm::prompts::EmbeddedTemplateStore;
use stride_planner::logging::PlanTraceContext;
use stride_planner::models::{GeneratedTrainingPlan, ScheduleRequest};
use stride_planner::training_plan::{RetryPolicies, StageRetryPolicy, TrainingPlanOrchestrator};

async fn generate(
    orchestrator: &TrainingPlanOrchestrator,
    request: ScheduleRequest,
) -> Result<GeneratedTrainingPlan, PlanGenerationError> {
    orchestrator
        .generate_training_plan(
            request,
            &common::test_models(),
            &PlanTraceContext::new(None),
            &CancellationToken::new(),
        )
        .await
}

fn three_weeks() -> ScheduleRequest {
    common::schedule_request(common::date(2024, 1, 1), common::date(2024, 1, 21))
}

fn week_numbers(plan: &GeneratedTrainingPlan) -> Vec<u32> {
    plan.weeks().map(|week| week.week_number).collect()
}

fn quick_retries(attempts: u32) -> StageRetryPolicy {
    StageRetryPolicy::with_attempts(attempts, Duration::from_millis(1))
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_plan_follows_skeleton_order() {
    common::init_test_logging();
    let mock = Arc::new(MockStages::new());
    let plan = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap();

    assert_eq!(plan.phases.len(), 2);
    assert_eq!(plan.phases[0].name, "Base");
    assert_eq!(week_numbers(&plan), vec![1, 2, 3]);
    for week in plan.weeks() {
        let dates: Vec<NaiveDate> = week.days.iter().map(|day| day.outline.date).collect();
        let expected: Vec<NaiveDate> = week.start_date.iter_days().take(7).collect();
        assert_eq!(dates, expected);
    }
    assert!(plan.is_complete());
    // One Monday rest day per week
    assert_eq!(plan.completeness.workouts, 18);
    assert_eq!(mock.skeleton_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.outline_calls.load(Ordering::SeqCst), 3);
    assert_eq!(mock.workout_calls.load(Ordering::SeqCst), 18);
}

#[tokio::test]
async fn test_completion_order_does_not_leak_into_plan() {
    let mock = Arc::new(
        MockStages::new()
            .delay_week(1, Duration::from_millis(150))
            .delay_week(2, Duration::from_millis(75)),
    );
    let plan = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap();

    assert_eq!(mock.completion_order(), vec![3, 2, 1]);
    assert_eq!(week_numbers(&plan), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_slow_day_keeps_its_position() {
    let slow = common::date(2024, 1, 2);
    let mock = Arc::new(MockStages::new().delay_day(slow, Duration::from_millis(100)));
    let plan = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap();

    let first_week = plan.week(0, 0).unwrap();
    assert_eq!(first_week.days[1].outline.date, slow);
    assert_eq!(
        first_week.days[1].workout.as_ref().unwrap().title,
        "Session 2024-01-02"
    );
}

#[tokio::test]
async fn test_same_day_plan_has_one_slot() {
    let race_day = common::date(2024, 1, 3);
    let mock = Arc::new(MockStages::new());
    let plan = generate(
        &common::mock_orchestrator(&mock),
        common::schedule_request(race_day, race_day),
    )
    .await
    .unwrap();

    assert_eq!(week_numbers(&plan), vec![1]);
    let week = plan.week(0, 0).unwrap();
    assert_eq!(week.days.len(), 1);
    assert_eq!(week.days[0].outline.date, race_day);
    assert_eq!(plan.completeness.workouts, 1);
}

// ============================================================================
// Failure Tiers
// ============================================================================

#[tokio::test]
async fn test_failed_week_leaves_marked_gap() {
    let mock = Arc::new(
        MockStages::new().fail_week(3, GenerationError::Provider("upstream 503".to_owned())),
    );
    let plan = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap();

    assert_eq!(week_numbers(&plan), vec![1, 2, 3]);
    let failed = plan.week(1, 0).unwrap();
    assert!(failed.is_failed());
    assert!(failed.days.is_empty());
    assert_eq!(failed.detailed_description, FAILED_WEEK_DESCRIPTION);
    let marker = failed.failure.as_ref().unwrap();
    assert_eq!(marker.stage, Stage::WeekOutline);
    assert_eq!(marker.kind, GenerationErrorKind::ProviderError);

    assert!(!plan.completeness.complete);
    assert_eq!(plan.completeness.failed_weeks, vec![3]);
    assert!(plan.completeness.failed_days.is_empty());
    assert_eq!(plan.completeness.workouts, 12);
}

#[tokio::test]
async fn test_failed_day_keeps_outline() {
    let broken = common::date(2024, 1, 10);
    let mock = Arc::new(MockStages::new().fail_day(broken, GenerationError::EmptyResponse));
    let plan = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap();

    let week = plan.week(0, 1).unwrap();
    let day = &week.days[2];
    assert_eq!(day.outline.date, broken);
    assert!(!day.outline.is_rest_day);
    assert!(day.workout.is_none());
    assert_eq!(
        day.failure.as_ref().unwrap().kind,
        GenerationErrorKind::EmptyResponseError
    );

    assert!(!plan.completeness.complete);
    assert_eq!(plan.completeness.failed_days.len(), 1);
    assert_eq!(plan.completeness.failed_days[0].week_number, 2);
    assert_eq!(plan.completeness.failed_days[0].day_number, 3);
    assert_eq!(plan.completeness.failed_days[0].date, broken);
}

#[tokio::test]
async fn test_rest_days_never_call_workout_stage() {
    let mut request = three_weeks();
    request.rest_days = vec![Weekday::Mon, Weekday::Fri];
    let mock = Arc::new(MockStages::new());
    let plan = generate(&common::mock_orchestrator(&mock), request)
        .await
        .unwrap();

    assert_eq!(mock.workout_calls.load(Ordering::SeqCst), 15);
    for day in plan.weeks().flat_map(|week| &week.days) {
        assert_eq!(day.outline.is_rest_day, day.workout.is_none());
    }
    assert!(plan.is_complete());
}

#[tokio::test]
async fn test_skeleton_failure_aborts_request() {
    let mock = Arc::new(MockStages::new().fail_skeleton(GenerationError::EmptyResponse));
    let error = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        PlanGenerationError::SkeletonGeneration(GenerationError::EmptyResponse)
    );
    assert_eq!(mock.outline_calls.load(Ordering::SeqCst), 0);
    assert_eq!(mock.workout_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inverted_range_makes_no_calls() {
    let mock = Arc::new(MockStages::new());
    let request = common::schedule_request(common::date(2024, 2, 1), common::date(2024, 1, 1));
    let error = generate(&common::mock_orchestrator(&mock), request)
        .await
        .unwrap_err();

    assert!(matches!(error, PlanGenerationError::InvalidRange(_)));
    assert_eq!(mock.total_calls(), 0);
}

// ============================================================================
// Retry
// ============================================================================

#[tokio::test]
async fn test_single_attempt_by_default() {
    let mock = Arc::new(MockStages::new().flaky_week(2, 1));
    let plan = generate(&common::mock_orchestrator(&mock), three_weeks())
        .await
        .unwrap();

    assert_eq!(plan.completeness.failed_weeks, vec![2]);
    assert_eq!(plan.week(0, 1).unwrap().failure.as_ref().unwrap().attempts, 1);
    assert_eq!(mock.outline_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_policy_recovers_flaky_week() {
    let mock = Arc::new(MockStages::new().flaky_week(2, 2));
    let orchestrator = common::mock_orchestrator(&mock).with_retry_policies(RetryPolicies {
        week_outline: quick_retries(3),
        ..RetryPolicies::default()
    });
    let plan = generate(&orchestrator, three_weeks()).await.unwrap();

    assert!(plan.is_complete());
    assert_eq!(mock.outline_calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_retry_budget_is_bounded() {
    let mock = Arc::new(MockStages::new().flaky_week(1, 5));
    let orchestrator = common::mock_orchestrator(&mock).with_retry_policies(RetryPolicies {
        week_outline: quick_retries(2),
        ..RetryPolicies::default()
    });
    let plan = generate(&orchestrator, three_weeks()).await.unwrap();

    let failure = plan.week(0, 0).unwrap().failure.clone().unwrap();
    assert_eq!(failure.attempts, 2);
    assert_eq!(mock.outline_calls.load(Ordering::SeqCst), 4);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_before_start_is_cancelled() {
    let mock = Arc::new(MockStages::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let error = common::mock_orchestrator(&mock)
        .generate_training_plan(
            three_weeks(),
            &common::test_models(),
            &PlanTraceContext::new(None),
            &cancel,
        )
        .await
        .unwrap_err();
    assert_eq!(error, PlanGenerationError::Cancelled);
}

#[tokio::test]
async fn test_cancel_mid_flight_discards_partial_plan() {
    let mock = Arc::new(MockStages::new().delay_every_call(Duration::from_secs(30)));
    let orchestrator = common::mock_orchestrator(&mock);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = timeout(
        Duration::from_secs(5),
        orchestrator.generate_training_plan(
            three_weeks(),
            &common::test_models(),
            &PlanTraceContext::new(Some("athlete-1".to_owned())),
            &cancel,
        ),
    )
    .await
    .expect("cancellation should stop generation promptly");

    assert_eq!(result.unwrap_err(), PlanGenerationError::Cancelled);
    assert_eq!(mock.workout_calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_units_run_concurrently_when_unbounded() {
    let mock = Arc::new(MockStages::new().delay_every_call(Duration::from_millis(40)));
    let request = common::schedule_request(common::date(2024, 1, 1), common::date(2024, 1, 28));
    generate(&common::mock_orchestrator(&mock), request)
        .await
        .unwrap();

    assert!(mock.max_in_flight.load(Ordering::SeqCst) >= 4);
}

#[tokio::test]
async fn test_concurrency_cap_is_respected() {
    let mock = Arc::new(MockStages::new().delay_every_call(Duration::from_millis(10)));
    let orchestrator = common::mock_orchestrator(&mock).with_max_concurrency(Some(2));
    let request = common::schedule_request(common::date(2024, 1, 1), common::date(2024, 1, 28));
    let plan = generate(&orchestrator, request).await.unwrap();

    assert!(plan.is_complete());
    let peak = mock.max_in_flight.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak in-flight calls was {peak}");
}

// ============================================================================
// Regeneration
// ============================================================================

#[tokio::test]
async fn test_regenerate_failed_week_in_place() {
    let mock = Arc::new(MockStages::new().flaky_week(3, 1));
    let orchestrator = common::mock_orchestrator(&mock);
    let mut plan = generate(&orchestrator, three_weeks()).await.unwrap();
    assert_eq!(plan.completeness.failed_weeks, vec![3]);
    let before = plan.week(0, 0).unwrap().clone();

    orchestrator
        .regenerate_week(
            &mut plan,
            1,
            0,
            &common::test_models(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(plan.is_complete());
    let rebuilt = plan.week(1, 0).unwrap();
    assert_eq!(rebuilt.week_number, 3);
    assert_eq!(rebuilt.days.len(), 7);
    assert_eq!(plan.week(0, 0).unwrap(), &before);
}

#[tokio::test]
async fn test_regenerate_day_replaces_only_that_day() {
    let broken = common::date(2024, 1, 2);
    let failing = Arc::new(MockStages::new().fail_day(broken, GenerationError::EmptyResponse));
    let mut plan = generate(&common::mock_orchestrator(&failing), three_weeks())
        .await
        .unwrap();
    assert!(!plan.is_complete());

    let healthy = Arc::new(MockStages::new());
    common::mock_orchestrator(&healthy)
        .regenerate_day(
            &mut plan,
            0,
            0,
            1,
            &common::test_models(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(plan.is_complete());
    assert_eq!(healthy.workout_calls.load(Ordering::SeqCst), 1);
    assert_eq!(healthy.outline_calls.load(Ordering::SeqCst), 0);
    let day = &plan.week(0, 0).unwrap().days[1];
    assert_eq!(day.workout.as_ref().unwrap().title, "Session 2024-01-02");
    assert!(day.failure.is_none());
}

#[tokio::test]
async fn test_regenerate_day_rejects_rest_days_and_failed_weeks() {
    let mock = Arc::new(
        MockStages::new().fail_week(2, GenerationError::Provider("down".to_owned())),
    );
    let orchestrator = common::mock_orchestrator(&mock);
    let mut plan = generate(&orchestrator, three_weeks()).await.unwrap();
    let snapshot = plan.clone();
    let models = common::test_models();
    let cancel = CancellationToken::new();

    let rest_day = orchestrator
        .regenerate_day(&mut plan, 0, 0, 0, &models, &cancel)
        .await
        .unwrap_err();
    assert_eq!(rest_day.code, ErrorCode::InvalidInput);

    let failed_week = orchestrator
        .regenerate_day(&mut plan, 0, 1, 0, &models, &cancel)
        .await
        .unwrap_err();
    assert_eq!(failed_week.code, ErrorCode::InvalidInput);

    let missing = orchestrator
        .regenerate_week(&mut plan, 4, 0, &models, &cancel)
        .await
        .unwrap_err();
    assert_eq!(missing.code, ErrorCode::InvalidInput);

    assert_eq!(plan, snapshot);
}

#[tokio::test]
async fn test_cancelled_regeneration_leaves_plan_untouched() {
    let mock = Arc::new(MockStages::new());
    let orchestrator = common::mock_orchestrator(&mock);
    let mut plan = generate(&orchestrator, three_weeks()).await.unwrap();
    let snapshot = plan.clone();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let error = orchestrator
        .regenerate_week(&mut plan, 0, 1, &common::test_models(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::GenerationCancelled);
    assert_eq!(plan, snapshot);
}

// ============================================================================
// End to End
// ============================================================================

/// Dates listed as `- Day N: YYYY-MM-DD (Weekday)` in a week outline prompt
fn prompt_day_slots(prompt: &str) -> Vec<NaiveDate> {
    prompt
        .lines()
        .filter_map(|line| line.trim().strip_prefix("- Day "))
        .filter_map(|rest| rest.split_once(": "))
        .filter_map(|(_, tail)| tail.get(..10))
        .map(|date| date.parse().unwrap())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_through_llm_stages() {
    common::init_test_logging();
    let request = common::schedule_request(common::date(2024, 1, 1), common::date(2024, 1, 17));
    let scripted_request = request.clone();
    let provider = Arc::new(ScriptedProvider::by_stage(move |stage, chat| {
        let prompt = &chat.messages.last().unwrap().content;
        match stage {
            "skeleton" => common::skeleton_json(&scripted_request),
            "week_outline" => serde_json::to_string(&common::outline_for(
                &scripted_request,
                &prompt_day_slots(prompt),
            ))
            .unwrap(),
            "workout" => common::workout_json("Aerobic intervals"),
            other => panic!("unexpected stage {other}"),
        }
    }));

    let context = GenerationContext::with_provider(
        &PlannerConfig::default(),
        provider.clone(),
        Arc::new(EmbeddedTemplateStore),
    );
    let plan = context
        .orchestrator()
        .generate_training_plan(
            request,
            context.default_models(),
            &PlanTraceContext::new(Some("athlete-7".to_owned())),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(plan.is_complete());
    assert_eq!(week_numbers(&plan), vec![1, 2, 3]);
    let last_week = plan.weeks().last().unwrap();
    assert_eq!(last_week.days.len(), 3);
    assert_eq!(last_week.end_date, common::date(2024, 1, 17));
    // 17 days, Mondays 1st, 8th and 15th are rest days
    assert_eq!(plan.completeness.workouts, 14);
    assert_eq!(provider.call_count(), 1 + 3 + 14);
    assert!(provider
        .requests()
        .iter()
        .all(|chat| chat.model.is_none()));
}

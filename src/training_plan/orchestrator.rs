// ABOUTME: Training plan orchestrator driving skeleton, week outline and workout stages end to end
// ABOUTME: Concurrent fan-out with tiered failure recovery, retries, cancellation and unit regeneration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training Plan Orchestrator
//!
//! Failure tiers:
//!
//! - skeleton failure aborts the request
//! - a week outline failure leaves that week with no days and a failure marker
//! - a workout failure leaves that day with its outline and no workout
//!
//! Week and day units run concurrently. Each unit future owns a snapshot of its
//! own context and the results are collected in submission order, so the
//! assembled plan never depends on completion order.

use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::calendar::{compute_week_windows, window_day_slots};
use super::retry::RetryPolicies;
use super::stages::{SkeletonContext, StageGenerators, WeekOutlineContext, WorkoutContext};
use crate::errors::{AppError, AppResult, ErrorCode, GenerationError, PlanGenerationError, Stage};
use crate::llm::ModelSelection;
use crate::logging::PlanTraceContext;
use crate::models::{
    DayOutline, GeneratedTrainingPlan, Phase, PhaseObjective, PlannedDay, PlannedPhase,
    PlannedWeek, ScheduleRequest, UnitFailure, Week, WeekFocus,
};

/// Last error of a unit after its retry budget was spent
struct FailedUnit {
    error: GenerationError,
    attempts: u32,
}

impl FailedUnit {
    fn marker(&self, stage: Stage) -> UnitFailure {
        UnitFailure::from_error(stage, &self.error, self.attempts)
    }
}

/// Phase fields a week outline needs
#[derive(Debug, Clone)]
struct PhaseScope {
    name: String,
    objective: PhaseObjective,
    description: String,
}

impl PhaseScope {
    fn of_phase(phase: &Phase) -> Self {
        Self {
            name: phase.name.clone(),
            objective: phase.objective,
            description: phase.description.clone(),
        }
    }

    fn of_planned(phase: &PlannedPhase) -> Self {
        Self {
            name: phase.name.clone(),
            objective: phase.objective,
            description: phase.description.clone(),
        }
    }
}

fn cancelled_error() -> AppError {
    AppError::new(
        ErrorCode::GenerationCancelled,
        "Training plan generation was cancelled",
    )
}

fn missing_unit(unit: &str) -> AppError {
    AppError::invalid_input(format!("Training plan has no {unit}"))
}

/// Drives the three-stage generation pipeline for one request at a time
#[derive(Clone)]
pub struct TrainingPlanOrchestrator {
    stages: StageGenerators,
    retry: RetryPolicies,
    limiter: Option<Arc<Semaphore>>,
}

impl TrainingPlanOrchestrator {
    /// Create an orchestrator with single-attempt stages and unbounded fan-out
    #[must_use]
    pub fn new(stages: StageGenerators) -> Self {
        Self {
            stages,
            retry: RetryPolicies::default(),
            limiter: None,
        }
    }

    /// Replace the per-stage retry policies
    #[must_use]
    pub const fn with_retry_policies(mut self, retry: RetryPolicies) -> Self {
        self.retry = retry;
        self
    }

    /// Cap the number of in-flight generation calls; `None` or `0` means unbounded
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.limiter = limit
            .filter(|permits| *permits > 0)
            .map(|permits| Arc::new(Semaphore::new(permits)));
        self
    }

    /// Retry policies in effect
    #[must_use]
    pub const fn retry_policies(&self) -> &RetryPolicies {
        &self.retry
    }

    // ========================================================================
    // Unit Execution
    // ========================================================================

    async fn call_once<T, Fut>(
        &self,
        cancel: &CancellationToken,
        call: Fut,
    ) -> Result<T, GenerationError>
    where
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let limited = async {
            let _permit = match &self.limiter {
                Some(limiter) => match limiter.acquire().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        return Err(GenerationError::Provider(
                            "generation limiter closed".to_owned(),
                        ))
                    }
                },
                None => None,
            };
            call.await
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(GenerationError::Cancelled),
            result = limited => result,
        }
    }

    async fn run_unit<T, F, Fut>(
        &self,
        stage: Stage,
        cancel: &CancellationToken,
        mut call: F,
    ) -> Result<T, FailedUnit>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let policy = self.retry.for_stage(stage);
        let mut attempt = 1;
        loop {
            match self.call_once(cancel, call()).await {
                Ok(output) => return Ok(output),
                Err(error) if policy.should_retry(&error, attempt) => {
                    let delay = policy.delay_after(attempt);
                    debug!(
                        %stage,
                        attempt,
                        kind = ?error.kind(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Stage call failed, retrying"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => {
                            return Err(FailedUnit { error: GenerationError::Cancelled, attempts: attempt });
                        }
                        () = sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(error) => {
                    return Err(FailedUnit {
                        error,
                        attempts: attempt,
                    })
                }
            }
        }
    }

    async fn build_day(
        &self,
        request: Arc<ScheduleRequest>,
        phase_objective: PhaseObjective,
        week_focus: WeekFocus,
        day: DayOutline,
        models: &ModelSelection,
        cancel: &CancellationToken,
    ) -> PlannedDay {
        if day.is_rest_day {
            return PlannedDay::rest(day);
        }

        let span = info_span!("day", day_number = day.day_number, date = %day.date);
        let context = WorkoutContext {
            request,
            phase_objective,
            week_focus,
            day,
        };
        let result = self
            .run_unit(Stage::Workout, cancel, || {
                self.stages.workout.generate(&context, &models.workout)
            })
            .instrument(span.clone())
            .await;

        match result {
            Ok(workout) => PlannedDay {
                outline: context.day,
                workout: Some(workout),
                failure: None,
            },
            Err(failed) => {
                span.in_scope(|| {
                    warn!(
                        kind = ?failed.error.kind(),
                        attempts = failed.attempts,
                        error = %failed.error,
                        "Workout generation failed, keeping day outline"
                    );
                });
                PlannedDay {
                    failure: Some(failed.marker(Stage::Workout)),
                    outline: context.day,
                    workout: None,
                }
            }
        }
    }

    async fn build_week(
        &self,
        request: Arc<ScheduleRequest>,
        scope: PhaseScope,
        week: Week,
        models: &ModelSelection,
        cancel: &CancellationToken,
    ) -> PlannedWeek {
        let span = info_span!("week", week_number = week.week_number);
        let context = WeekOutlineContext {
            request: Arc::clone(&request),
            phase_name: scope.name,
            phase_objective: scope.objective,
            phase_description: scope.description,
            day_slots: window_day_slots(&week.window()),
            week,
        };

        async move {
            let result = self
                .run_unit(Stage::WeekOutline, cancel, || {
                    self.stages
                        .week_outline
                        .generate(&context, &models.week_outline)
                })
                .await;

            let outline = match result {
                Ok(outline) => outline,
                Err(failed) => {
                    warn!(
                        kind = ?failed.error.kind(),
                        attempts = failed.attempts,
                        error = %failed.error,
                        "Week outline generation failed, marking week as failed"
                    );
                    return PlannedWeek::failed(context.week, failed.marker(Stage::WeekOutline));
                }
            };

            let day_tasks: Vec<_> = outline
                .days
                .iter()
                .map(|day| {
                    self.build_day(
                        Arc::clone(&request),
                        context.phase_objective,
                        context.week.focus,
                        day.clone(),
                        models,
                        cancel,
                    )
                })
                .collect();
            let days = join_all(day_tasks).await;

            PlannedWeek::from_outline(context.week, outline, days)
        }
        .instrument(span)
        .await
    }

    // ========================================================================
    // Plan Generation
    // ========================================================================

    /// Generate a complete training plan for one questionnaire
    ///
    /// Week and day failures are recorded inside the returned plan; check
    /// [`GeneratedTrainingPlan::completeness`] to see whether anything is missing.
    ///
    /// # Errors
    ///
    /// - `PlanGenerationError::InvalidRange` if the race date precedes the start date
    /// - `PlanGenerationError::SkeletonGeneration` if the skeleton stage failed
    /// - `PlanGenerationError::Cancelled` if `cancel` fired before the plan was assembled
    pub async fn generate_training_plan(
        &self,
        request: ScheduleRequest,
        models: &ModelSelection,
        trace: &PlanTraceContext,
        cancel: &CancellationToken,
    ) -> Result<GeneratedTrainingPlan, PlanGenerationError> {
        self.generate_in_span(request, models, trace, cancel)
            .instrument(trace.span())
            .await
    }

    async fn generate_in_span(
        &self,
        request: ScheduleRequest,
        models: &ModelSelection,
        trace: &PlanTraceContext,
        cancel: &CancellationToken,
    ) -> Result<GeneratedTrainingPlan, PlanGenerationError> {
        let windows = compute_week_windows(request.start_date, request.race_date)?;
        info!(
            race = %request.race_name,
            start_date = %request.start_date,
            race_date = %request.race_date,
            weeks = windows.len(),
            skeleton_model = %models.skeleton,
            "Generating training plan"
        );

        let request = Arc::new(request);
        let context = SkeletonContext {
            request: Arc::clone(&request),
            windows,
        };
        let result = self
            .run_unit(Stage::Skeleton, cancel, || {
                self.stages.skeleton.generate(&context, &models.skeleton)
            })
            .await;

        let skeleton = match result {
            Ok(skeleton) => skeleton,
            Err(FailedUnit {
                error: GenerationError::Cancelled,
                ..
            }) => return Err(PlanGenerationError::Cancelled),
            Err(failed) => {
                error!(
                    kind = ?failed.error.kind(),
                    attempts = failed.attempts,
                    error = %failed.error,
                    "Skeleton generation failed"
                );
                return Err(PlanGenerationError::SkeletonGeneration(failed.error));
            }
        };

        let mut week_tasks = Vec::with_capacity(skeleton.week_count());
        for phase in &skeleton.phases {
            for week in &phase.weeks {
                week_tasks.push(self.build_week(
                    Arc::clone(&request),
                    PhaseScope::of_phase(phase),
                    week.clone(),
                    models,
                    cancel,
                ));
            }
        }
        let mut planned_weeks = join_all(week_tasks).await.into_iter();

        if cancel.is_cancelled() {
            info!("Training plan generation cancelled, discarding partial results");
            return Err(PlanGenerationError::Cancelled);
        }

        let phases = skeleton
            .phases
            .into_iter()
            .map(|phase| {
                let weeks = planned_weeks.by_ref().take(phase.weeks.len()).collect();
                PlannedPhase::from_phase(phase, weeks)
            })
            .collect();

        let plan =
            GeneratedTrainingPlan::assemble(trace.request_id, Arc::unwrap_or_clone(request), phases);
        info!(
            weeks = plan.weeks().count(),
            workouts = plan.completeness.workouts,
            failed_weeks = plan.completeness.failed_weeks.len(),
            failed_days = plan.completeness.failed_days.len(),
            complete = plan.completeness.complete,
            "Training plan generated"
        );
        Ok(plan)
    }

    // ========================================================================
    // Unit Regeneration
    // ========================================================================

    /// Regenerate one week's outline and workouts in place
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the week does not exist, or `GenerationCancelled`
    /// if `cancel` fired; the plan is left untouched in both cases.
    pub async fn regenerate_week(
        &self,
        plan: &mut GeneratedTrainingPlan,
        phase_index: usize,
        week_index: usize,
        models: &ModelSelection,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let (scope, week) = {
            let phase = plan
                .phases
                .get(phase_index)
                .ok_or_else(|| missing_unit(&format!("phase {phase_index}")))?;
            let week = phase
                .weeks
                .get(week_index)
                .ok_or_else(|| missing_unit(&format!("week {week_index} in phase {phase_index}")))?;
            (PhaseScope::of_planned(phase), week.skeleton_week())
        };

        let trace = PlanTraceContext::with_request_id(plan.request_id, None);
        let rebuilt = self
            .build_week(Arc::new(plan.request.clone()), scope, week, models, cancel)
            .instrument(trace.span())
            .await;
        if cancel.is_cancelled() {
            return Err(cancelled_error());
        }

        if let Some(slot) = plan.week_mut(phase_index, week_index) {
            *slot = rebuilt;
        }
        plan.refresh_completeness();
        Ok(())
    }

    /// Regenerate one training day's workout in place
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the day does not exist, belongs to a failed
    /// week, or is a rest day; `GenerationCancelled` if `cancel` fired.
    pub async fn regenerate_day(
        &self,
        plan: &mut GeneratedTrainingPlan,
        phase_index: usize,
        week_index: usize,
        day_index: usize,
        models: &ModelSelection,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let (objective, focus, outline) = {
            let phase = plan
                .phases
                .get(phase_index)
                .ok_or_else(|| missing_unit(&format!("phase {phase_index}")))?;
            let week = phase
                .weeks
                .get(week_index)
                .ok_or_else(|| missing_unit(&format!("week {week_index} in phase {phase_index}")))?;
            if week.is_failed() {
                return Err(AppError::invalid_input(
                    "Week outline failed; regenerate the whole week instead",
                ));
            }
            let day = week
                .days
                .get(day_index)
                .ok_or_else(|| missing_unit(&format!("day {day_index} in week {week_index}")))?;
            if day.outline.is_rest_day {
                return Err(AppError::invalid_input("Rest days have no workout to regenerate"));
            }
            (phase.objective, week.focus, day.outline.clone())
        };

        let trace = PlanTraceContext::with_request_id(plan.request_id, None);
        let rebuilt = self
            .build_day(
                Arc::new(plan.request.clone()),
                objective,
                focus,
                outline,
                models,
                cancel,
            )
            .instrument(trace.span())
            .await;
        if cancel.is_cancelled() {
            return Err(cancelled_error());
        }

        if let Some(slot) = plan
            .week_mut(phase_index, week_index)
            .and_then(|week| week.days.get_mut(day_index))
        {
            *slot = rebuilt;
        }
        plan.refresh_completeness();
        Ok(())
    }
}

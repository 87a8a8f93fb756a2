// ABOUTME: Shared test utilities for plan generation integration tests
// ABOUTME: Provides quiet logging, request/plan fixtures, a scripted LLM provider and mock stage generators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs
)]
//! Shared test utilities for `stride_planner`

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::time::sleep;
use tracing::Level;

use stride_planner::errors::{AppError, GenerationError};
use stride_planner::llm::{
    ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, ModelSelection, ModelSelector,
    ResponseFormat,
};
use stride_planner::models::{
    DayOutline, Distance, DistanceUnit, DurationType, DurationUnit, DurationVolume,
    ExperienceLevel, IntensityType, Interval, IntervalType, Phase, PhaseObjective, RepeatGroup,
    ScheduleRequest, Skeleton, Week, WeekFocus, WeekOutline, WeekWindow, Workout, WorkoutItem,
    WorkoutType,
};
use stride_planner::training_plan::calendar::weekday_name;
use stride_planner::training_plan::stages::{
    SkeletonContext, StageGenerator, StageGenerators, WeekOutlineContext, WorkoutContext,
};
use stride_planner::training_plan::{compute_week_windows, TrainingPlanOrchestrator};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Marathon questionnaire with Monday as preferred rest day
pub fn schedule_request(start: NaiveDate, race: NaiveDate) -> ScheduleRequest {
    ScheduleRequest {
        race_name: "Riverside Marathon".to_owned(),
        race_type: WorkoutType::Run,
        race_distance: Distance {
            value: 42.195,
            unit: DistanceUnit::Kilometers,
        },
        start_date: start,
        race_date: race,
        rest_days: vec![Weekday::Mon],
        experience_level: ExperienceLevel::Intermediate,
        goal_time: Some("3:45:00".to_owned()),
        additional_notes: None,
    }
}

pub fn week_from_window(window: &WeekWindow) -> Week {
    Week {
        week_number: window.week_number,
        start_date: window.start_date,
        end_date: window.end_date,
        focus: WeekFocus::Endurance,
        description: format!("Aerobic week {}", window.week_number),
        volume_distance: Distance {
            value: 30.0,
            unit: DistanceUnit::Kilometers,
        },
        volume_duration: DurationVolume { minutes: 240.0 },
    }
}

/// Skeleton tiling the windows: first half BASE, second half BUILD
pub fn skeleton_for(windows: &[WeekWindow]) -> Skeleton {
    let split = windows.len().div_ceil(2);
    let (base, build) = windows.split_at(split);
    let phase = |name: &str, objective: PhaseObjective, windows: &[WeekWindow]| Phase {
        name: name.to_owned(),
        start_date: windows[0].start_date,
        end_date: windows[windows.len() - 1].end_date,
        objective,
        description: format!("{name} phase"),
        weeks: windows.iter().map(week_from_window).collect(),
    };

    let mut phases = vec![phase("Base", PhaseObjective::Base, base)];
    if !build.is_empty() {
        phases.push(phase("Build", PhaseObjective::Build, build));
    }
    Skeleton { phases }
}

/// Outline with one day per slot; rest on the request's preferred rest days
pub fn outline_for(request: &ScheduleRequest, slots: &[NaiveDate]) -> WeekOutline {
    let days = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let is_rest_day = request.rest_days.contains(&slot.weekday());
            DayOutline {
                day_number: u32::try_from(index + 1).unwrap(),
                day_name: weekday_name(*slot).to_owned(),
                date: *slot,
                day_description: if is_rest_day {
                    "Rest".to_owned()
                } else {
                    "Easy aerobic run".to_owned()
                },
                workout_type: (!is_rest_day).then_some(WorkoutType::Run),
                intensity_level: if is_rest_day { 0 } else { 4 },
                is_rest_day,
            }
        })
        .collect();
    WeekOutline {
        detailed_description: "Steady aerobic build".to_owned(),
        days,
    }
}

pub fn interval(interval_type: IntervalType, minutes: f64) -> Interval {
    Interval {
        interval_type,
        duration_type: DurationType::Time,
        duration_value: minutes,
        duration_unit: DurationUnit::Minutes,
        intensity_type: IntensityType::HeartRate,
        intensity_min: Some(130.0),
        intensity_max: Some(150.0),
    }
}

/// Warmup, 4 x (3 min on, 2 min easy) and cooldown
pub fn interval_workout(title: &str) -> Workout {
    Workout {
        title: title.to_owned(),
        description: "Controlled intervals".to_owned(),
        workout_type: WorkoutType::Run,
        items: vec![
            WorkoutItem::Interval(interval(IntervalType::Warmup, 10.0)),
            WorkoutItem::RepeatGroup(RepeatGroup {
                repeats: 4,
                intervals: vec![interval(IntervalType::Active, 3.0)],
                rest_interval: Some(interval(IntervalType::Rest, 2.0)),
            }),
            WorkoutItem::Interval(interval(IntervalType::Cooldown, 10.0)),
        ],
    }
}

pub fn test_models() -> ModelSelection {
    ModelSelection {
        skeleton: ModelSelector::new("scripted", "skeleton-model"),
        week_outline: ModelSelector::new("scripted", "outline-model"),
        workout: ModelSelector::new("scripted", "workout-model"),
    }
}

// ============================================================================
// Scripted LLM Provider
// ============================================================================

type Responder = Box<dyn Fn(&ChatRequest) -> Result<String, AppError> + Send + Sync>;

/// Provider answering from a closure and recording every request
pub struct ScriptedProvider {
    capabilities: LlmCapabilities,
    responder: Responder,
    delay: Option<Duration>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(
        capabilities: LlmCapabilities,
        responder: impl Fn(&ChatRequest) -> Result<String, AppError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            capabilities,
            responder: Box::new(responder),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer calls in order from a fixed list
    pub fn sequence(
        capabilities: LlmCapabilities,
        responses: Vec<Result<String, AppError>>,
    ) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(capabilities, move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::internal("script exhausted")))
        })
    }

    /// Structured backend answering by the JSON schema name of each request
    pub fn by_stage(
        responder: impl Fn(&str, &ChatRequest) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::new(LlmCapabilities::structured(), move |request| {
            let stage = match &request.response_format {
                Some(ResponseFormat::JsonSchema { name, .. }) => name.clone(),
                _ => String::new(),
            };
            Ok(responder(&stage, request))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Test Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted-default"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["scripted-default"]
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        let content = (self.responder)(request)?;
        Ok(ChatResponse {
            content,
            model: request
                .model
                .clone()
                .unwrap_or_else(|| "scripted-default".to_owned()),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Valid skeleton JSON for a request, tiling its computed windows
pub fn skeleton_json(request: &ScheduleRequest) -> String {
    let windows = compute_week_windows(request.start_date, request.race_date).unwrap();
    serde_json::to_string(&skeleton_for(&windows)).unwrap()
}

pub fn workout_json(title: &str) -> String {
    serde_json::to_string(&interval_workout(title)).unwrap()
}

pub fn json_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

// ============================================================================
// Mock Stage Generators
// ============================================================================

/// Deterministic stage generators with injectable failures and delays
///
/// Weeks are addressed by week number, days by date.
#[derive(Default)]
pub struct MockStages {
    skeleton_error: Option<GenerationError>,
    week_errors: HashMap<u32, GenerationError>,
    day_errors: HashMap<NaiveDate, GenerationError>,
    /// Number of leading failures per week before the outline succeeds
    week_flaky: HashMap<u32, usize>,
    week_delays: HashMap<u32, Duration>,
    day_delays: HashMap<NaiveDate, Duration>,
    call_delay: Option<Duration>,
    pub skeleton_calls: AtomicUsize,
    pub outline_calls: AtomicUsize,
    pub workout_calls: AtomicUsize,
    week_attempts: Mutex<HashMap<u32, usize>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    completion_order: Mutex<Vec<u32>>,
}

impl MockStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_skeleton(mut self, error: GenerationError) -> Self {
        self.skeleton_error = Some(error);
        self
    }

    pub fn fail_week(mut self, week_number: u32, error: GenerationError) -> Self {
        self.week_errors.insert(week_number, error);
        self
    }

    pub fn fail_day(mut self, date: NaiveDate, error: GenerationError) -> Self {
        self.day_errors.insert(date, error);
        self
    }

    /// Week outline fails with a provider error `failures` times, then succeeds
    pub fn flaky_week(mut self, week_number: u32, failures: usize) -> Self {
        self.week_flaky.insert(week_number, failures);
        self
    }

    pub fn delay_week(mut self, week_number: u32, delay: Duration) -> Self {
        self.week_delays.insert(week_number, delay);
        self
    }

    pub fn delay_day(mut self, date: NaiveDate, delay: Duration) -> Self {
        self.day_delays.insert(date, delay);
        self
    }

    /// Delay applied to every outline and workout call
    pub fn delay_every_call(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.skeleton_calls.load(Ordering::SeqCst)
            + self.outline_calls.load(Ordering::SeqCst)
            + self.workout_calls.load(Ordering::SeqCst)
    }

    /// Week numbers in the order their outline calls finished
    pub fn completion_order(&self) -> Vec<u32> {
        self.completion_order.lock().unwrap().clone()
    }

    async fn tracked<T>(
        &self,
        delay: Option<Duration>,
        output: Result<T, GenerationError>,
    ) -> Result<T, GenerationError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = delay.or(self.call_delay) {
            sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        output
    }
}

#[async_trait]
impl StageGenerator<SkeletonContext, Skeleton> for MockStages {
    async fn generate(
        &self,
        context: &SkeletonContext,
        _selector: &ModelSelector,
    ) -> Result<Skeleton, GenerationError> {
        self.skeleton_calls.fetch_add(1, Ordering::SeqCst);
        match &self.skeleton_error {
            Some(error) => Err(error.clone()),
            None => Ok(skeleton_for(&context.windows)),
        }
    }
}

#[async_trait]
impl StageGenerator<WeekOutlineContext, WeekOutline> for MockStages {
    async fn generate(
        &self,
        context: &WeekOutlineContext,
        _selector: &ModelSelector,
    ) -> Result<WeekOutline, GenerationError> {
        self.outline_calls.fetch_add(1, Ordering::SeqCst);
        let week_number = context.week.week_number;
        let attempt = {
            let mut attempts = self.week_attempts.lock().unwrap();
            let seen = attempts.entry(week_number).or_insert(0);
            *seen += 1;
            *seen
        };

        let output = if let Some(error) = self.week_errors.get(&week_number) {
            Err(error.clone())
        } else if self
            .week_flaky
            .get(&week_number)
            .is_some_and(|failures| attempt <= *failures)
        {
            Err(GenerationError::Provider(format!("transient failure {attempt}")))
        } else {
            Ok(outline_for(&context.request, &context.day_slots))
        };

        let result = self
            .tracked(self.week_delays.get(&week_number).copied(), output)
            .await;
        self.completion_order.lock().unwrap().push(week_number);
        result
    }
}

#[async_trait]
impl StageGenerator<WorkoutContext, Workout> for MockStages {
    async fn generate(
        &self,
        context: &WorkoutContext,
        _selector: &ModelSelector,
    ) -> Result<Workout, GenerationError> {
        self.workout_calls.fetch_add(1, Ordering::SeqCst);
        let date = context.day.date;
        let output = match self.day_errors.get(&date) {
            Some(error) => Err(error.clone()),
            None => Ok(interval_workout(&format!("Session {date}"))),
        };
        self.tracked(self.day_delays.get(&date).copied(), output).await
    }
}

/// Wire one mock into all three stages
pub fn mock_generators(mock: &Arc<MockStages>) -> StageGenerators {
    StageGenerators {
        skeleton: mock.clone(),
        week_outline: mock.clone(),
        workout: mock.clone(),
    }
}

pub fn mock_orchestrator(mock: &Arc<MockStages>) -> TrainingPlanOrchestrator {
    TrainingPlanOrchestrator::new(mock_generators(mock))
}

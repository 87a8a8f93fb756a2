// ABOUTME: Persistence adapter contract for generated training plans and workouts
// ABOUTME: Record types mirroring the stored hierarchy plus a DashMap-backed in-memory store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Persistence
//!
//! A plan is saved as one logical unit: the schedule, its phases, weeks and
//! days, and one workout record per generated workout. Records keep explicit
//! `position` fields so a relational backend can restore order without
//! relying on insertion order.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::schema::{OutputSchema, WorkoutSchema};
use crate::errors::{AppError, AppResult};
use crate::models::{
    DurationType, DurationUnit, GeneratedTrainingPlan, IntensityType, Interval, IntervalType,
    PhaseObjective, PlanCompleteness, PlannedDay, PlannedPhase, PlannedWeek, WeekFocus, Workout,
    WorkoutItem, WorkoutType,
};

// ============================================================================
// Records
// ============================================================================

/// Stored training schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    /// Record id
    pub id: Uuid,
    /// Owner
    pub user_id: String,
    /// Generation request this schedule came from
    pub request_id: Uuid,
    /// Target race
    pub race_name: String,
    /// First day of training
    pub start_date: NaiveDate,
    /// Race day
    pub race_date: NaiveDate,
    /// Whether every training day had a workout when saved
    pub complete: bool,
    /// Save time
    pub created_at: DateTime<Utc>,
    /// Phases in calendar order
    pub phases: Vec<PhaseRecord>,
}

/// Stored phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    /// Order within the schedule
    pub position: usize,
    /// Display name
    pub name: String,
    /// Training objective
    pub objective: PhaseObjective,
    /// Coach description
    pub description: String,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Weeks in order
    pub weeks: Vec<WeekRecord>,
}

/// Stored week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    /// Order within the phase
    pub position: usize,
    /// Week number as generated
    pub week_number: u32,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Primary focus
    pub focus: WeekFocus,
    /// Skeleton description
    pub description: String,
    /// Outline description or failed-week placeholder
    pub detailed_description: String,
    /// Whether the outline failed to generate
    pub outline_failed: bool,
    /// Days in order
    pub days: Vec<DayRecord>,
}

/// Stored day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    /// Order within the week
    pub position: usize,
    /// Day number as generated
    pub day_number: u32,
    /// Calendar date
    pub date: NaiveDate,
    /// Theme of the day
    pub day_description: String,
    /// Intensity on a 0-10 scale
    pub intensity_level: u8,
    /// Rest day flag
    pub is_rest_day: bool,
    /// Linked workout, if one was generated
    pub workout_id: Option<Uuid>,
}

/// Stored workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    /// Record id
    pub id: Uuid,
    /// Owner
    pub user_id: String,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Sport
    pub workout_type: WorkoutType,
    /// Day the workout is planned for, when saved as part of a plan
    pub scheduled_date: Option<NaiveDate>,
    /// Items in order
    pub items: Vec<WorkoutItemRecord>,
}

/// Stored workout item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutItemRecord {
    /// Order within the workout
    pub position: usize,
    /// Interval or repeat group payload
    pub kind: WorkoutItemKind,
}

/// Payload of a stored workout item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "itemType")]
pub enum WorkoutItemKind {
    /// Single interval
    Interval(IntervalRecord),
    /// Repeated interval block
    RepeatGroup(RepeatGroupRecord),
}

/// Stored repeat group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatGroupRecord {
    /// Number of repetitions
    pub repeats: u32,
    /// Intervals of one repetition
    pub intervals: Vec<IntervalRecord>,
    /// Rest after each repetition
    pub rest_interval: Option<IntervalRecord>,
}

/// Stored interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRecord {
    /// Order within the parent
    pub position: usize,
    /// Segment type
    pub interval_type: IntervalType,
    /// What the duration measures
    pub duration_type: DurationType,
    /// Duration magnitude
    pub duration_value: f64,
    /// Duration unit
    pub duration_unit: DurationUnit,
    /// Intensity target kind
    pub intensity_type: IntensityType,
    /// Lower target bound
    pub intensity_min: Option<f64>,
    /// Upper target bound
    pub intensity_max: Option<f64>,
}

// ============================================================================
// Translation
// ============================================================================

impl IntervalRecord {
    fn from_interval(position: usize, interval: &Interval) -> Self {
        Self {
            position,
            interval_type: interval.interval_type,
            duration_type: interval.duration_type,
            duration_value: interval.duration_value,
            duration_unit: interval.duration_unit,
            intensity_type: interval.intensity_type,
            intensity_min: interval.intensity_min,
            intensity_max: interval.intensity_max,
        }
    }
}

impl WorkoutRecord {
    /// Translate a generated workout into its stored form
    #[must_use]
    pub fn from_workout(
        id: Uuid,
        user_id: &str,
        workout: &Workout,
        scheduled_date: Option<NaiveDate>,
    ) -> Self {
        let items = workout
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| WorkoutItemRecord {
                position,
                kind: match item {
                    WorkoutItem::Interval(interval) => {
                        WorkoutItemKind::Interval(IntervalRecord::from_interval(0, interval))
                    }
                    WorkoutItem::RepeatGroup(group) => {
                        WorkoutItemKind::RepeatGroup(RepeatGroupRecord {
                            repeats: group.repeats,
                            intervals: group
                                .intervals
                                .iter()
                                .enumerate()
                                .map(|(index, interval)| {
                                    IntervalRecord::from_interval(index, interval)
                                })
                                .collect(),
                            rest_interval: group
                                .rest_interval
                                .as_ref()
                                .map(|rest| IntervalRecord::from_interval(group.intervals.len(), rest)),
                        })
                    }
                },
            })
            .collect();

        Self {
            id,
            user_id: user_id.to_owned(),
            title: workout.title.clone(),
            description: workout.description.clone(),
            workout_type: workout.workout_type,
            scheduled_date,
            items,
        }
    }
}

/// A plan translated into records, ready to be written as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecords {
    /// Schedule hierarchy
    pub schedule: ScheduleRecord,
    /// One record per generated workout, referenced from the days
    pub workouts: Vec<WorkoutRecord>,
}

/// Run a workout submitted for storage through the workout schema again
///
/// # Errors
///
/// Returns `InvalidInput` listing the violations if the workout was edited
/// into an invalid shape.
pub fn check_workout(workout: &Workout) -> AppResult<()> {
    WorkoutSchema::revalidate(workout)
        .map(|_| ())
        .map_err(|e| AppError::invalid_input(e.to_string()))
}

impl PlanRecords {
    /// Translate a submitted plan; ids are freshly allocated
    ///
    /// Every workout is validated again and completeness is recomputed from
    /// the phases, so the submitted `completeness` report is never trusted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if any workout fails validation.
    pub fn from_plan(user_id: &str, plan: &GeneratedTrainingPlan) -> AppResult<Self> {
        for day in plan.weeks().flat_map(|week| &week.days) {
            if let Some(workout) = &day.workout {
                let date = day.outline.date;
                check_workout(workout).map_err(|e| {
                    warn!(%date, error = %e, "Rejected submitted workout");
                    AppError::invalid_input(format!("Workout on {date}: {}", e.message))
                })?;
            }
        }
        let completeness = PlanCompleteness::evaluate(&plan.phases);

        let mut workouts = Vec::new();
        let phases = plan
            .phases
            .iter()
            .enumerate()
            .map(|(position, phase)| Self::phase_record(user_id, position, phase, &mut workouts))
            .collect();

        let schedule = ScheduleRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            request_id: plan.request_id,
            race_name: plan.request.race_name.clone(),
            start_date: plan.request.start_date,
            race_date: plan.request.race_date,
            complete: completeness.complete,
            created_at: Utc::now(),
            phases,
        };
        Ok(Self { schedule, workouts })
    }

    fn phase_record(
        user_id: &str,
        position: usize,
        phase: &PlannedPhase,
        workouts: &mut Vec<WorkoutRecord>,
    ) -> PhaseRecord {
        PhaseRecord {
            position,
            name: phase.name.clone(),
            objective: phase.objective,
            description: phase.description.clone(),
            start_date: phase.start_date,
            end_date: phase.end_date,
            weeks: phase
                .weeks
                .iter()
                .enumerate()
                .map(|(index, week)| Self::week_record(user_id, index, week, workouts))
                .collect(),
        }
    }

    fn week_record(
        user_id: &str,
        position: usize,
        week: &PlannedWeek,
        workouts: &mut Vec<WorkoutRecord>,
    ) -> WeekRecord {
        WeekRecord {
            position,
            week_number: week.week_number,
            start_date: week.start_date,
            end_date: week.end_date,
            focus: week.focus,
            description: week.description.clone(),
            detailed_description: week.detailed_description.clone(),
            outline_failed: week.is_failed(),
            days: week
                .days
                .iter()
                .enumerate()
                .map(|(index, day)| Self::day_record(user_id, index, day, workouts))
                .collect(),
        }
    }

    fn day_record(
        user_id: &str,
        position: usize,
        day: &PlannedDay,
        workouts: &mut Vec<WorkoutRecord>,
    ) -> DayRecord {
        let workout_id = day.workout.as_ref().map(|workout| {
            let id = Uuid::new_v4();
            workouts.push(WorkoutRecord::from_workout(
                id,
                user_id,
                workout,
                Some(day.outline.date),
            ));
            id
        });

        DayRecord {
            position,
            day_number: day.outline.day_number,
            date: day.outline.date,
            day_description: day.outline.day_description.clone(),
            intensity_level: day.outline.intensity_level,
            is_rest_day: day.outline.is_rest_day,
            workout_id,
        }
    }
}

// ============================================================================
// Store Contract
// ============================================================================

/// Persistence adapter for reviewed plans and individual workouts
#[async_trait]
pub trait TrainingPlanStore: Send + Sync {
    /// Save a whole plan as one unit and return the schedule id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a workout fails validation, or an error if
    /// the backend rejects the write.
    async fn save_plan(&self, user_id: &str, plan: &GeneratedTrainingPlan) -> AppResult<Uuid>;

    /// Fetch a saved schedule owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no such schedule exists for the user.
    async fn get_plan(&self, user_id: &str, id: Uuid) -> AppResult<ScheduleRecord>;

    /// Save a single finalized workout and return its id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the workout fails validation, or an error if
    /// the backend rejects the write.
    async fn save_workout(&self, user_id: &str, workout: &Workout) -> AppResult<Uuid>;

    /// Fetch a saved workout owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no such workout exists for the user.
    async fn get_workout(&self, user_id: &str, id: Uuid) -> AppResult<WorkoutRecord>;
}

/// Process-local store used by the server and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanStore {
    schedules: Arc<DashMap<Uuid, ScheduleRecord>>,
    workouts: Arc<DashMap<Uuid, WorkoutRecord>>,
}

impl InMemoryPlanStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored schedules
    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.schedules.len()
    }

    /// Number of stored workouts
    #[must_use]
    pub fn workout_count(&self) -> usize {
        self.workouts.len()
    }
}

#[async_trait]
impl TrainingPlanStore for InMemoryPlanStore {
    async fn save_plan(&self, user_id: &str, plan: &GeneratedTrainingPlan) -> AppResult<Uuid> {
        let records = PlanRecords::from_plan(user_id, plan)?;
        let id = records.schedule.id;
        let workout_count = records.workouts.len();

        for workout in records.workouts {
            self.workouts.insert(workout.id, workout);
        }
        self.schedules.insert(id, records.schedule);

        info!(schedule_id = %id, user_id, workouts = workout_count, "Saved training plan");
        Ok(id)
    }

    async fn get_plan(&self, user_id: &str, id: Uuid) -> AppResult<ScheduleRecord> {
        self.schedules
            .get(&id)
            .filter(|record| record.user_id == user_id)
            .map(|record| record.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Training plan {id}")))
    }

    async fn save_workout(&self, user_id: &str, workout: &Workout) -> AppResult<Uuid> {
        check_workout(workout)?;
        let id = Uuid::new_v4();
        self.workouts
            .insert(id, WorkoutRecord::from_workout(id, user_id, workout, None));
        debug!(workout_id = %id, user_id, "Saved workout");
        Ok(id)
    }

    async fn get_workout(&self, user_id: &str, id: Uuid) -> AppResult<WorkoutRecord> {
        self.workouts
            .get(&id)
            .filter(|record| record.user_id == user_id)
            .map(|record| record.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Workout {id}")))
    }
}

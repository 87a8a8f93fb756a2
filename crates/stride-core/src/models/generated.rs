// ABOUTME: Assembled training plan: skeleton weeks augmented with outlines, workouts and failure markers
// ABOUTME: Also computes plan completeness so callers can present partial plans with marked gaps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outline::{DayOutline, WeekOutline};
use super::plan::{DurationVolume, Phase, PhaseObjective, Week, WeekFocus, WeekWindow};
use super::schedule::{Distance, ScheduleRequest};
use super::workout::Workout;
use crate::constants::FAILED_WEEK_DESCRIPTION;
use crate::errors::{GenerationError, GenerationErrorKind, Stage};

/// Marker recorded in place of a unit whose generation failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitFailure {
    /// Stage that failed
    pub stage: Stage,
    /// Flat error kind
    pub kind: GenerationErrorKind,
    /// Human-readable error detail
    pub message: String,
    /// Number of calls issued before giving up
    pub attempts: u32,
}

impl UnitFailure {
    /// Build a marker from the last error of a unit
    #[must_use]
    pub fn from_error(stage: Stage, error: &GenerationError, attempts: u32) -> Self {
        Self {
            stage,
            kind: error.kind(),
            message: error.to_string(),
            attempts,
        }
    }
}

/// One day of the assembled plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDay {
    /// Outline entry produced by the week outline stage
    pub outline: DayOutline,
    /// Generated workout; `None` on rest days and on failed days
    pub workout: Option<Workout>,
    /// Present when the workout stage failed for this day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<UnitFailure>,
}

impl PlannedDay {
    /// A rest day never carries a workout
    #[must_use]
    pub const fn rest(outline: DayOutline) -> Self {
        Self {
            outline,
            workout: None,
            failure: None,
        }
    }

    /// Whether this day needs no further generation
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        self.outline.is_rest_day || self.workout.is_some()
    }
}

/// One week of the assembled plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedWeek {
    /// Week number as emitted by the skeleton
    pub week_number: u32,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
    /// Primary focus
    pub focus: WeekFocus,
    /// Skeleton-level description
    pub description: String,
    /// Planned distance volume
    pub volume_distance: Distance,
    /// Planned duration volume
    pub volume_duration: DurationVolume,
    /// Outline description, or the failed-week placeholder
    pub detailed_description: String,
    /// Days in outline order; empty when the outline failed
    pub days: Vec<PlannedDay>,
    /// Present when the week outline stage failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<UnitFailure>,
}

impl PlannedWeek {
    /// Augment a skeleton week with its outline and per-day results
    #[must_use]
    pub fn from_outline(week: Week, outline: WeekOutline, days: Vec<PlannedDay>) -> Self {
        Self {
            detailed_description: outline.detailed_description,
            days,
            failure: None,
            ..Self::skeleton_only(week)
        }
    }

    /// A week whose outline could not be generated
    #[must_use]
    pub fn failed(week: Week, failure: UnitFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::skeleton_only(week)
        }
    }

    fn skeleton_only(week: Week) -> Self {
        Self {
            week_number: week.week_number,
            start_date: week.start_date,
            end_date: week.end_date,
            focus: week.focus,
            description: week.description,
            volume_distance: week.volume_distance,
            volume_duration: week.volume_duration,
            detailed_description: FAILED_WEEK_DESCRIPTION.to_owned(),
            days: Vec::new(),
            failure: None,
        }
    }

    /// The skeleton week this planned week was built from
    #[must_use]
    pub fn skeleton_week(&self) -> Week {
        Week {
            week_number: self.week_number,
            start_date: self.start_date,
            end_date: self.end_date,
            focus: self.focus,
            description: self.description.clone(),
            volume_distance: self.volume_distance,
            volume_duration: self.volume_duration,
        }
    }

    /// Calendar window of this week
    #[must_use]
    pub const fn window(&self) -> WeekWindow {
        WeekWindow {
            week_number: self.week_number,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Whether the week outline stage failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// One phase of the assembled plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedPhase {
    /// Display name
    pub name: String,
    /// First day of the phase
    pub start_date: NaiveDate,
    /// Last day of the phase
    pub end_date: NaiveDate,
    /// Training objective
    pub objective: PhaseObjective,
    /// Coach description
    pub description: String,
    /// Weeks in skeleton order
    pub weeks: Vec<PlannedWeek>,
}

impl PlannedPhase {
    /// Attach planned weeks to a skeleton phase, dropping the skeleton weeks
    #[must_use]
    pub fn from_phase(phase: Phase, weeks: Vec<PlannedWeek>) -> Self {
        Self {
            name: phase.name,
            start_date: phase.start_date,
            end_date: phase.end_date,
            objective: phase.objective,
            description: phase.description,
            weeks,
        }
    }
}

/// Address of a day whose workout failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDay {
    /// Week number of the containing week
    pub week_number: u32,
    /// Day number within the week
    pub day_number: u32,
    /// Calendar date of the day
    pub date: NaiveDate,
}

/// Completeness of an assembled plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCompleteness {
    /// True only if no week and no day failed
    pub complete: bool,
    /// Week numbers whose outline failed
    pub failed_weeks: Vec<u32>,
    /// Training days whose workout failed
    pub failed_days: Vec<FailedDay>,
    /// Number of generated workouts in the plan
    pub workouts: usize,
}

impl PlanCompleteness {
    /// Evaluate completeness of assembled phases
    ///
    /// A failed week counts as incomplete even though it has no days left to fail.
    #[must_use]
    pub fn evaluate(phases: &[PlannedPhase]) -> Self {
        let mut report = Self::default();
        for week in phases.iter().flat_map(|phase| &phase.weeks) {
            if week.is_failed() {
                report.failed_weeks.push(week.week_number);
                continue;
            }
            for day in &week.days {
                if day.workout.is_some() {
                    report.workouts += 1;
                }
                if !day.is_satisfied() {
                    report.failed_days.push(FailedDay {
                        week_number: week.week_number,
                        day_number: day.outline.day_number,
                        date: day.outline.date,
                    });
                }
            }
        }
        report.complete = report.failed_weeks.is_empty() && report.failed_days.is_empty();
        report
    }
}

/// A fully assembled, possibly partial, training plan ready for review or saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTrainingPlan {
    /// Correlation id of the generation request
    pub request_id: Uuid,
    /// Questionnaire the plan was generated from
    pub request: ScheduleRequest,
    /// When assembly finished
    pub generated_at: DateTime<Utc>,
    /// Phases in skeleton order
    pub phases: Vec<PlannedPhase>,
    /// Completeness report
    pub completeness: PlanCompleteness,
}

impl GeneratedTrainingPlan {
    /// Assemble a plan and evaluate its completeness
    #[must_use]
    pub fn assemble(request_id: Uuid, request: ScheduleRequest, phases: Vec<PlannedPhase>) -> Self {
        let completeness = PlanCompleteness::evaluate(&phases);
        Self {
            request_id,
            request,
            generated_at: Utc::now(),
            phases,
            completeness,
        }
    }

    /// Re-evaluate completeness after a unit was replaced
    pub fn refresh_completeness(&mut self) {
        self.completeness = PlanCompleteness::evaluate(&self.phases);
    }

    /// Whether every training day has a workout
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completeness.complete
    }

    /// All weeks in plan order
    pub fn weeks(&self) -> impl Iterator<Item = &PlannedWeek> {
        self.phases.iter().flat_map(|phase| phase.weeks.iter())
    }

    /// Week addressed by phase and week index
    #[must_use]
    pub fn week(&self, phase_index: usize, week_index: usize) -> Option<&PlannedWeek> {
        self.phases.get(phase_index)?.weeks.get(week_index)
    }

    /// Mutable week addressed by phase and week index
    pub fn week_mut(&mut self, phase_index: usize, week_index: usize) -> Option<&mut PlannedWeek> {
        self.phases.get_mut(phase_index)?.weeks.get_mut(week_index)
    }
}

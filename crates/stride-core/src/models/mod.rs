// ABOUTME: Domain models for AI training-plan generation
// ABOUTME: Re-exports request, calendar, skeleton, outline, workout and assembled plan types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! The plan hierarchy mirrors what gets persisted:
//!
//! - `ScheduleRequest`: questionnaire input
//! - `WeekWindow`: derived calendar partition
//! - `Skeleton` → `Phase` → `Week`: first generation stage
//! - `WeekOutline` → `DayOutline`: second stage, one per week
//! - `Workout` → `WorkoutItem` → `Interval` / `RepeatGroup`: third stage, one per training day
//! - `GeneratedTrainingPlan`: everything above assembled, with failure markers

mod activity;
mod generated;
mod outline;
mod plan;
mod schedule;
mod workout;

pub use activity::CompletedActivity;
pub use generated::{
    FailedDay, GeneratedTrainingPlan, PlanCompleteness, PlannedDay, PlannedPhase, PlannedWeek,
    UnitFailure,
};
pub use outline::{DayOutline, WeekOutline};
pub use plan::{DurationVolume, Phase, PhaseObjective, Skeleton, Week, WeekFocus, WeekWindow};
pub use schedule::{Distance, DistanceUnit, ExperienceLevel, ScheduleRequest, WorkoutType};
pub use workout::{
    DurationType, DurationUnit, IntensityType, Interval, IntervalType, RepeatGroup, Workout,
    WorkoutItem,
};

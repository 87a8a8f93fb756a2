// ABOUTME: Schedule questionnaire submitted by a user to request an AI training plan
// ABOUTME: Race parameters, date range, experience level, and shared sport/distance enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::InvalidRangeError;

/// Sport of a race or workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutType {
    /// Running
    Run,
    /// Cycling
    Bike,
    /// Swimming
    Swim,
    /// Multi-sport
    Triathlon,
}

impl WorkoutType {
    /// Wire name as used in prompts and JSON
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Run => "RUN",
            Self::Bike => "BIKE",
            Self::Swim => "SWIM",
            Self::Triathlon => "TRIATHLON",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported athlete experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    /// New to structured training
    Beginner,
    /// Has completed races before
    Intermediate,
    /// Trains consistently with performance goals
    Advanced,
    /// Competitive athlete
    Elite,
}

impl ExperienceLevel {
    /// Wire name as used in prompts and JSON
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
            Self::Elite => "ELITE",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance unit for race distances and weekly volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceUnit {
    /// Meters
    Meters,
    /// Kilometers
    Kilometers,
    /// Statute miles
    Miles,
    /// Yards (pool swimming)
    Yards,
}

impl DistanceUnit {
    /// Wire name as used in prompts and JSON
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meters => "METERS",
            Self::Kilometers => "KILOMETERS",
            Self::Miles => "MILES",
            Self::Yards => "YARDS",
        }
    }
}

/// A distance with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Distance {
    /// Magnitude, never negative
    pub value: f64,
    /// Unit of `value`
    pub unit: DistanceUnit,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.as_str())
    }
}

/// Questionnaire submitted to request a generated training plan
///
/// Invariant: `start_date <= race_date`. A same-day plan is allowed and
/// yields a single one-day week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// Name of the target race
    pub race_name: String,
    /// Sport of the target race
    pub race_type: WorkoutType,
    /// Race distance
    pub race_distance: Distance,
    /// First day of training
    pub start_date: NaiveDate,
    /// Race day (last day of the plan)
    pub race_date: NaiveDate,
    /// Preferred rest days of the week
    #[serde(default)]
    pub rest_days: Vec<Weekday>,
    /// Athlete experience
    pub experience_level: ExperienceLevel,
    /// Goal finishing time, free-form (e.g. `3:30:00`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_time: Option<String>,
    /// Anything else the athlete wants the coach to know
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl ScheduleRequest {
    /// Check the date-range invariant
    ///
    /// # Errors
    ///
    /// Returns `InvalidRangeError` if the race date is before the start date.
    pub fn validate_range(&self) -> Result<(), InvalidRangeError> {
        if self.start_date > self.race_date {
            return Err(InvalidRangeError::new(self.start_date, self.race_date));
        }
        Ok(())
    }

    /// Rest-day preference rendered for prompts
    #[must_use]
    pub fn rest_days_label(&self) -> String {
        if self.rest_days.is_empty() {
            return "no preference".to_owned();
        }
        self.rest_days
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

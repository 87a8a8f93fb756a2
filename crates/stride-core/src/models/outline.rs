// ABOUTME: Day-by-day week outline produced by the week outline stage
// ABOUTME: Each day is either a rest day or a training day with intensity and theme
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::WorkoutType;

/// One day's planned role within a week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DayOutline {
    /// 1-indexed position within the week
    pub day_number: u32,
    /// Weekday name (e.g. "Monday")
    pub day_name: String,
    /// Calendar date; must match the partitioned day slot
    pub date: NaiveDate,
    /// Theme of the day
    pub day_description: String,
    /// Sport for training days; absent on rest days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<WorkoutType>,
    /// Intensity on a 0-10 scale (0 for rest)
    pub intensity_level: u8,
    /// Rest days never receive a workout
    pub is_rest_day: bool,
}

/// Generated outline for one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeekOutline {
    /// Detailed coach description of the week
    pub detailed_description: String,
    /// Days in ascending day-number order
    pub days: Vec<DayOutline>,
}

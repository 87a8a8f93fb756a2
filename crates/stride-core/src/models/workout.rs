// ABOUTME: Structured interval workout produced by the workout stage
// ABOUTME: A workout item is either a single interval or a repeat group, never both
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::schedule::WorkoutType;

/// Role of an interval within a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalType {
    /// Warm-up
    Warmup,
    /// Work interval
    Active,
    /// Cool-down
    Cooldown,
    /// Recovery between work intervals
    Rest,
}

/// How an interval's length is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationType {
    /// Elapsed time
    Time,
    /// Covered distance
    Distance,
    /// Until a heart rate is reached
    HeartRate,
    /// Until a calorie count is reached
    Calories,
}

/// Unit of an interval's duration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationUnit {
    /// Seconds
    Seconds,
    /// Minutes
    Minutes,
    /// Hours
    Hours,
    /// Meters
    Meters,
    /// Kilometers
    Kilometers,
    /// Miles
    Miles,
    /// Yards
    Yards,
    /// Beats per minute
    Bpm,
    /// Kilocalories
    Kcal,
}

impl DurationUnit {
    /// Whether this unit can measure the given duration type
    #[must_use]
    pub const fn measures(self, duration_type: DurationType) -> bool {
        match duration_type {
            DurationType::Time => matches!(self, Self::Seconds | Self::Minutes | Self::Hours),
            DurationType::Distance => matches!(
                self,
                Self::Meters | Self::Kilometers | Self::Miles | Self::Yards
            ),
            DurationType::HeartRate => matches!(self, Self::Bpm),
            DurationType::Calories => matches!(self, Self::Kcal),
        }
    }
}

/// Kind of intensity target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntensityType {
    /// No target
    None,
    /// Cadence (rpm / spm)
    Cadence,
    /// Heart rate (bpm)
    HeartRate,
    /// Power (watts)
    Power,
    /// Pace in minutes per kilometer
    PaceMinPerKm,
    /// Pace in minutes per mile
    PaceMinPerMile,
    /// Swim pace in seconds per 100 meters
    #[serde(rename = "PACE_SEC_PER_100M")]
    PaceSecPer100m,
}

/// An atomic workout segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Interval {
    /// Role of the interval
    #[serde(rename = "type")]
    pub interval_type: IntervalType,
    /// How the length is measured
    pub duration_type: DurationType,
    /// Length in `duration_unit`
    pub duration_value: f64,
    /// Unit of `duration_value`
    pub duration_unit: DurationUnit,
    /// Kind of intensity target
    pub intensity_type: IntensityType,
    /// Lower bound of the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_min: Option<f64>,
    /// Upper bound of the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity_max: Option<f64>,
}

/// N repetitions of an ordered set of intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepeatGroup {
    /// Number of repetitions
    pub repeats: u32,
    /// Intervals performed each repetition, in order
    pub intervals: Vec<Interval>,
    /// Optional rest after the whole group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_interval: Option<Interval>,
}

/// One item of a workout
///
/// Serialized as `{"interval": {...}}` or `{"repeatGroup": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkoutItem {
    /// A single interval
    Interval(Interval),
    /// A repeated block of intervals
    RepeatGroup(RepeatGroup),
}

/// A concrete, structured training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Workout {
    /// Short title
    pub title: String,
    /// Coach description and execution notes
    pub description: String,
    /// Sport
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    /// Items in execution order
    pub items: Vec<WorkoutItem>,
}

impl Workout {
    /// Total interval count with repeat groups expanded
    #[must_use]
    pub fn expanded_interval_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                WorkoutItem::Interval(_) => 1,
                WorkoutItem::RepeatGroup(group) => {
                    group.intervals.len() * group.repeats as usize
                        + usize::from(group.rest_interval.is_some())
                }
            })
            .sum()
    }
}

// ABOUTME: Week windows and the generated phase/week skeleton of a training plan
// ABOUTME: Skeleton wire types are strict (camelCase, SCREAMING enums, unknown fields rejected)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::schedule::Distance;

/// A contiguous date range of at most seven days, the unit of volume planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    /// 1-indexed position in the plan
    pub week_number: u32,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
}

impl WeekWindow {
    /// Number of calendar days covered (1..=7 for partitioned windows)
    #[must_use]
    pub fn len_days(&self) -> u64 {
        let span = self.end_date.signed_duration_since(self.start_date).num_days();
        u64::try_from(span).map_or(0, |days| days + 1)
    }

    /// Whether `date` falls inside the window
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// The day after this window ends
    #[must_use]
    pub fn next_start(&self) -> Option<NaiveDate> {
        self.end_date.checked_add_days(Days::new(1))
    }
}

/// Training objective of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseObjective {
    /// Aerobic foundation
    Base,
    /// Progressive load increase
    Build,
    /// Highest specific load
    Peak,
    /// Volume reduction before the race
    Taper,
    /// Planned recovery block
    Recovery,
    /// Race week
    Race,
}

impl PhaseObjective {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::Build => "BUILD",
            Self::Peak => "PEAK",
            Self::Taper => "TAPER",
            Self::Recovery => "RECOVERY",
            Self::Race => "RACE",
        }
    }
}

impl fmt::Display for PhaseObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary focus of a training week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekFocus {
    /// Long easy aerobic volume
    Endurance,
    /// Lactate threshold work
    Threshold,
    /// VO2max and speed work
    Speed,
    /// Strength and hills
    Strength,
    /// Race-pace specificity
    RaceSpecific,
    /// Reduced load to absorb training
    Recovery,
    /// Pre-race volume reduction
    Taper,
    /// Race week
    Race,
}

impl WeekFocus {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Endurance => "ENDURANCE",
            Self::Threshold => "THRESHOLD",
            Self::Speed => "SPEED",
            Self::Strength => "STRENGTH",
            Self::RaceSpecific => "RACE_SPECIFIC",
            Self::Recovery => "RECOVERY",
            Self::Taper => "TAPER",
            Self::Race => "RACE",
        }
    }
}

impl fmt::Display for WeekFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planned weekly duration volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DurationVolume {
    /// Total planned minutes
    pub minutes: f64,
}

/// A generated week inside a phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Week {
    /// Week number, copied from the corresponding `WeekWindow`
    pub week_number: u32,
    /// First day (inclusive)
    pub start_date: NaiveDate,
    /// Last day (inclusive)
    pub end_date: NaiveDate,
    /// Primary focus
    pub focus: WeekFocus,
    /// Coach description of the week
    pub description: String,
    /// Planned distance volume
    pub volume_distance: Distance,
    /// Planned duration volume
    pub volume_duration: DurationVolume,
}

impl Week {
    /// The calendar window this week covers
    #[must_use]
    pub const fn window(&self) -> WeekWindow {
        WeekWindow {
            week_number: self.week_number,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// A generated multi-week block with a single objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Phase {
    /// Display name (e.g. "Base Building")
    pub name: String,
    /// First day of the first week
    pub start_date: NaiveDate,
    /// Last day of the last week
    pub end_date: NaiveDate,
    /// Training objective
    pub objective: PhaseObjective,
    /// Coach description
    pub description: String,
    /// Weeks in ascending week-number order
    pub weeks: Vec<Week>,
}

/// Phase/week scaffold of a whole plan, produced by the skeleton stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Skeleton {
    /// Phases in calendar order
    pub phases: Vec<Phase>,
}

impl Skeleton {
    /// Every week across every phase, in skeleton order
    pub fn weeks(&self) -> impl Iterator<Item = &Week> {
        self.phases.iter().flat_map(|phase| phase.weeks.iter())
    }

    /// Total number of weeks
    #[must_use]
    pub fn week_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.weeks.len()).sum()
    }
}

// ABOUTME: Completed activity summary as supplied by a read-only activity history provider
// ABOUTME: Minimal subset of provider activity data needed to compare planned and completed volume
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schedule::WorkoutType;

/// A completed activity from an external history provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedActivity {
    /// Provider-specific identifier
    pub id: String,
    /// Activity title
    pub name: String,
    /// Sport, when it maps onto a plan workout type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<WorkoutType>,
    /// When the activity started (UTC)
    pub start_date: DateTime<Utc>,
    /// Elapsed duration in seconds
    pub duration_seconds: u64,
    /// Distance in meters, if the sport has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

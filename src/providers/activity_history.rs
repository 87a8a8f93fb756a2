// ABOUTME: Read-only completed activity history contract and week-window bucketing
// ABOUTME: Time ranges follow the date partitioner: window start inclusive, next window start exclusive
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Activity History
//!
//! Completed activities are not used for generation. They are bucketed into the
//! same week windows the planner uses so planned and completed volume can be
//! compared side by side.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::errors::AppResult;
use crate::models::{CompletedActivity, WeekWindow};

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Query parameters for fetching completed activities
///
/// `after` is inclusive and `before` is exclusive, both Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQueryParams {
    /// Maximum number of activities to return
    pub limit: Option<usize>,
    /// Number of activities to skip
    pub offset: Option<usize>,
    /// Only activities starting before this time
    pub before: Option<i64>,
    /// Only activities starting at or after this time
    pub after: Option<i64>,
}

impl ActivityQueryParams {
    /// Query params with timestamp filtering only
    #[must_use]
    pub const fn with_time_range(before: Option<i64>, after: Option<i64>) -> Self {
        Self {
            limit: None,
            offset: None,
            before,
            after,
        }
    }

    /// Time range covering every instant of a week window in UTC
    #[must_use]
    pub fn for_window(window: &WeekWindow) -> Self {
        let before = window
            .next_start()
            .map_or(DateTime::<Utc>::MAX_UTC.timestamp(), midnight_timestamp);
        Self::with_time_range(Some(before), Some(midnight_timestamp(window.start_date)))
    }

    /// Whether an activity starting at `started` falls inside the range
    #[must_use]
    pub fn matches(&self, started: DateTime<Utc>) -> bool {
        let at = started.timestamp();
        self.after.is_none_or(|after| at >= after) && self.before.is_none_or(|before| at < before)
    }
}

/// Read-only source of completed activities
#[async_trait]
pub trait ActivityHistoryProvider: Send + Sync {
    /// Provider name (e.g. "strava")
    fn name(&self) -> &'static str;

    /// Completed activities of `user_id` inside the query range, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the request.
    async fn activities(
        &self,
        user_id: &str,
        params: &ActivityQueryParams,
    ) -> AppResult<Vec<CompletedActivity>>;
}

/// Provider serving a fixed activity list, for tests and offline use
#[derive(Debug, Clone, Default)]
pub struct StaticActivityHistory {
    activities: Vec<CompletedActivity>,
}

impl StaticActivityHistory {
    /// Serve the given activities to every user
    #[must_use]
    pub fn new(mut activities: Vec<CompletedActivity>) -> Self {
        activities.sort_by_key(|activity| activity.start_date);
        Self { activities }
    }
}

#[async_trait]
impl ActivityHistoryProvider for StaticActivityHistory {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn activities(
        &self,
        _user_id: &str,
        params: &ActivityQueryParams,
    ) -> AppResult<Vec<CompletedActivity>> {
        Ok(self
            .activities
            .iter()
            .filter(|activity| params.matches(activity.start_date))
            .skip(params.offset.unwrap_or(0))
            .take(params.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

/// Completed volume inside one week window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowActivitySummary {
    /// Window the activities fall into
    pub window: WeekWindow,
    /// Number of activities
    pub activity_count: usize,
    /// Total elapsed seconds
    pub total_duration_seconds: u64,
    /// Total meters over activities that report a distance
    pub total_distance_meters: f64,
    /// Activity ids in start order
    pub activity_ids: Vec<String>,
}

/// Bucket activities into windows; activities outside every window are ignored
#[must_use]
pub fn summarize_by_window(
    windows: &[WeekWindow],
    activities: &[CompletedActivity],
) -> Vec<WindowActivitySummary> {
    windows
        .iter()
        .map(|window| {
            let range = ActivityQueryParams::for_window(window);
            let mut inside: Vec<&CompletedActivity> = activities
                .iter()
                .filter(|activity| range.matches(activity.start_date))
                .collect();
            inside.sort_by_key(|activity| activity.start_date);

            WindowActivitySummary {
                window: *window,
                activity_count: inside.len(),
                total_duration_seconds: inside.iter().map(|a| a.duration_seconds).sum(),
                total_distance_meters: inside.iter().filter_map(|a| a.distance_meters).sum(),
                activity_ids: inside.iter().map(|a| a.id.clone()).collect(),
            }
        })
        .collect()
}

// ABOUTME: External data providers consumed next to plan generation
// ABOUTME: Currently the read-only completed activity history contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Completed activity history and week-window bucketing
pub mod activity_history;

pub use activity_history::{
    summarize_by_window, ActivityHistoryProvider, ActivityQueryParams, StaticActivityHistory,
    WindowActivitySummary,
};

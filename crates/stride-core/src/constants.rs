// ABOUTME: Shared constants for plan generation, validation limits, and the HTTP surface
// ABOUTME: Pure data constants grouped by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Description placed on a week whose outline could not be generated
pub const FAILED_WEEK_DESCRIPTION: &str = "Failed to generate week outline";

/// Maximum days in a week window
pub const DAYS_PER_WEEK: u64 = 7;

/// Schema limits for generated objects
pub mod limits {
    /// Highest allowed day intensity
    pub const MAX_INTENSITY_LEVEL: u8 = 10;
    /// Highest allowed repeat count of a repeat group
    pub const MAX_REPEATS: u32 = 50;
    /// Highest allowed number of items in one workout
    pub const MAX_WORKOUT_ITEMS: usize = 40;
    /// Longest accepted free-text field, in characters
    pub const MAX_TEXT_LEN: usize = 4_000;
}

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Training plan collection
    pub const TRAINING_PLANS: &str = "/api/training-plans";
    /// Training plan generation trigger
    pub const TRAINING_PLANS_GENERATE: &str = "/api/training-plans/generate";
    /// Saved plan by id
    pub const TRAINING_PLAN_BY_ID: &str = "/api/training-plans/:id";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8088;
}

/// HTTP header carrying the opaque current user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Service name used in logs
pub const SERVICE_NAME: &str = "stride-planner";

// ABOUTME: Output schemas for the skeleton, week outline and workout generation stages
// ABOUTME: JSON schema descriptors sent to the backend plus local validation that never trusts them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stage Output Schemas
//!
//! Every object returned by a backend goes through two checks before any other
//! component sees it:
//!
//! 1. strict deserialization into the stage's wire type (camelCase fields,
//!    `UPPER_SNAKE_CASE` enums, unknown fields rejected)
//! 2. constraint checks (non-empty text and arrays, numeric ranges, unit and
//!    duration-type agreement, contiguous day numbering) that collect every
//!    violation instead of stopping at the first one
//!
//! The descriptor handed to the backend is only a decoding hint. Validation is
//! side-effect free, so validating an already validated object returns an
//! equal object.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::{SchemaValidationError, Stage};
use crate::models::{
    DayOutline, Interval, IntensityType, Phase, RepeatGroup, Skeleton, Week, WeekOutline, Workout,
    WorkoutItem,
};
use stride_core::constants::limits::{
    MAX_INTENSITY_LEVEL, MAX_REPEATS, MAX_TEXT_LEN, MAX_WORKOUT_ITEMS,
};
use stride_core::constants::DAYS_PER_WEEK;

// ============================================================================
// Schema Contract
// ============================================================================

/// Shape and constraints of one stage's structured output
pub trait OutputSchema: Send + Sync + 'static {
    /// Validated output type
    type Output: Serialize + DeserializeOwned + Send + 'static;

    /// Stage this schema belongs to
    const STAGE: Stage;

    /// JSON Schema document sent to backends that support constrained decoding
    fn descriptor() -> Value;

    /// Constraint checks on an already deserialized object
    fn check(output: &Self::Output, violations: &mut Violations);

    /// Validate a candidate JSON value
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError` listing every violation found.
    fn validate(candidate: Value) -> Result<Self::Output, SchemaValidationError> {
        let output: Self::Output = serde_json::from_value(candidate)
            .map_err(|e| SchemaValidationError::single(Self::STAGE, e.to_string()))?;
        let mut violations = Violations::default();
        Self::check(&output, &mut violations);
        violations.into_result(Self::STAGE)?;
        Ok(output)
    }

    /// Run an already validated object through validation again
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError` if the object no longer satisfies the schema.
    fn revalidate(output: &Self::Output) -> Result<Self::Output, SchemaValidationError> {
        let value = serde_json::to_value(output)
            .map_err(|e| SchemaValidationError::single(Self::STAGE, e.to_string()))?;
        Self::validate(value)
    }
}

/// Accumulator of constraint violations, addressed by JSON path
#[derive(Debug, Default)]
pub struct Violations {
    details: Vec<String>,
}

impl Violations {
    /// Record a violation at `path`
    pub fn push(&mut self, path: &str, problem: impl AsRef<str>) {
        self.details.push(format!("{path}: {}", problem.as_ref()));
    }

    /// Record a violation when `condition` does not hold
    pub fn require(&mut self, condition: bool, path: &str, problem: &str) {
        if !condition {
            self.push(path, problem);
        }
    }

    fn text(&mut self, value: &str, path: &str) {
        if value.trim().is_empty() {
            self.push(path, "must not be empty");
        } else if value.chars().count() > MAX_TEXT_LEN {
            self.push(path, format!("must be at most {MAX_TEXT_LEN} characters"));
        }
    }

    fn non_negative(&mut self, value: f64, path: &str) {
        self.require(
            value.is_finite() && value >= 0.0,
            path,
            "must be a finite number >= 0",
        );
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    fn into_result(self, stage: Stage) -> Result<(), SchemaValidationError> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError {
                stage,
                details: self.details,
            })
        }
    }
}

// ============================================================================
// Shared Descriptor Fragments
// ============================================================================

const DATE_FORMAT: &str = "date";

fn string_enum(values: &[&str]) -> Value {
    json!({"type": "string", "enum": values})
}

fn date_field() -> Value {
    json!({"type": "string", "format": DATE_FORMAT})
}

fn distance_descriptor() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["value", "unit"],
        "properties": {
            "value": {"type": "number", "minimum": 0},
            "unit": string_enum(&["METERS", "KILOMETERS", "MILES", "YARDS"])
        }
    })
}

fn workout_type_descriptor() -> Value {
    string_enum(&["RUN", "BIKE", "SWIM", "TRIATHLON"])
}

// ============================================================================
// Skeleton
// ============================================================================

/// Schema of the skeleton stage output
#[derive(Debug, Clone, Copy)]
pub struct SkeletonSchema;

impl SkeletonSchema {
    fn check_week(week: &Week, path: &str, violations: &mut Violations) {
        violations.require(week.week_number >= 1, &format!("{path}.weekNumber"), "must be >= 1");
        violations.require(
            week.start_date <= week.end_date,
            &format!("{path}.endDate"),
            "must not be before startDate",
        );
        violations.require(
            week.window().len_days() <= DAYS_PER_WEEK,
            &format!("{path}.endDate"),
            "week must span at most 7 days",
        );
        violations.text(&week.description, &format!("{path}.description"));
        violations.non_negative(
            week.volume_distance.value,
            &format!("{path}.volumeDistance.value"),
        );
        violations.non_negative(
            week.volume_duration.minutes,
            &format!("{path}.volumeDuration.minutes"),
        );
    }

    fn check_phase(phase: &Phase, path: &str, violations: &mut Violations) {
        violations.text(&phase.name, &format!("{path}.name"));
        violations.text(&phase.description, &format!("{path}.description"));
        violations.require(
            phase.start_date <= phase.end_date,
            &format!("{path}.endDate"),
            "must not be before startDate",
        );

        let (Some(first), Some(last)) = (phase.weeks.first(), phase.weeks.last()) else {
            violations.push(&format!("{path}.weeks"), "must not be empty");
            return;
        };
        violations.require(
            phase.start_date == first.start_date,
            &format!("{path}.startDate"),
            "must equal the startDate of the phase's first week",
        );
        violations.require(
            phase.end_date == last.end_date,
            &format!("{path}.endDate"),
            "must equal the endDate of the phase's last week",
        );
        for (index, week) in phase.weeks.iter().enumerate() {
            Self::check_week(week, &format!("{path}.weeks[{index}]"), violations);
        }
    }
}

impl OutputSchema for SkeletonSchema {
    type Output = Skeleton;

    const STAGE: Stage = Stage::Skeleton;

    fn descriptor() -> Value {
        let week = json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["weekNumber", "startDate", "endDate", "focus", "description", "volumeDistance", "volumeDuration"],
            "properties": {
                "weekNumber": {"type": "integer", "minimum": 1},
                "startDate": date_field(),
                "endDate": date_field(),
                "focus": string_enum(&["ENDURANCE", "THRESHOLD", "SPEED", "STRENGTH", "RACE_SPECIFIC", "RECOVERY", "TAPER", "RACE"]),
                "description": {"type": "string", "minLength": 1},
                "volumeDistance": distance_descriptor(),
                "volumeDuration": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["minutes"],
                    "properties": {"minutes": {"type": "number", "minimum": 0}}
                }
            }
        });
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["phases"],
            "properties": {
                "phases": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["name", "startDate", "endDate", "objective", "description", "weeks"],
                        "properties": {
                            "name": {"type": "string", "minLength": 1},
                            "startDate": date_field(),
                            "endDate": date_field(),
                            "objective": string_enum(&["BASE", "BUILD", "PEAK", "TAPER", "RECOVERY", "RACE"]),
                            "description": {"type": "string", "minLength": 1},
                            "weeks": {"type": "array", "minItems": 1, "items": week}
                        }
                    }
                }
            }
        })
    }

    fn check(output: &Skeleton, violations: &mut Violations) {
        if output.phases.is_empty() {
            violations.push("phases", "must not be empty");
        }
        for (index, phase) in output.phases.iter().enumerate() {
            Self::check_phase(phase, &format!("phases[{index}]"), violations);
        }
    }
}

// ============================================================================
// Week Outline
// ============================================================================

/// Schema of the week outline stage output
#[derive(Debug, Clone, Copy)]
pub struct WeekOutlineSchema;

impl WeekOutlineSchema {
    fn check_day(day: &DayOutline, position: usize, violations: &mut Violations) {
        let path = format!("days[{position}]");
        violations.require(
            day.day_number as usize == position + 1,
            &format!("{path}.dayNumber"),
            "days must be numbered 1, 2, 3... in order",
        );
        violations.text(&day.day_name, &format!("{path}.dayName"));
        violations.text(&day.day_description, &format!("{path}.dayDescription"));
        violations.require(
            day.intensity_level <= MAX_INTENSITY_LEVEL,
            &format!("{path}.intensityLevel"),
            "must be between 0 and 10",
        );
        if !day.is_rest_day {
            violations.require(
                day.workout_type.is_some(),
                &format!("{path}.workoutType"),
                "is required on training days",
            );
        }
    }
}

impl OutputSchema for WeekOutlineSchema {
    type Output = WeekOutline;

    const STAGE: Stage = Stage::WeekOutline;

    fn descriptor() -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["detailedDescription", "days"],
            "properties": {
                "detailedDescription": {"type": "string", "minLength": 1},
                "days": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": DAYS_PER_WEEK,
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["dayNumber", "dayName", "date", "dayDescription", "intensityLevel", "isRestDay"],
                        "properties": {
                            "dayNumber": {"type": "integer", "minimum": 1, "maximum": DAYS_PER_WEEK},
                            "dayName": {"type": "string", "minLength": 1},
                            "date": date_field(),
                            "dayDescription": {"type": "string", "minLength": 1},
                            "workoutType": workout_type_descriptor(),
                            "intensityLevel": {"type": "integer", "minimum": 0, "maximum": MAX_INTENSITY_LEVEL},
                            "isRestDay": {"type": "boolean"}
                        }
                    }
                }
            }
        })
    }

    fn check(output: &WeekOutline, violations: &mut Violations) {
        violations.text(&output.detailed_description, "detailedDescription");
        if output.days.is_empty() {
            violations.push("days", "must not be empty");
        }
        violations.require(
            output.days.len() as u64 <= DAYS_PER_WEEK,
            "days",
            "must contain at most 7 days",
        );
        for (position, day) in output.days.iter().enumerate() {
            Self::check_day(day, position, violations);
        }
    }
}

// ============================================================================
// Workout
// ============================================================================

/// Schema of the workout stage output
#[derive(Debug, Clone, Copy)]
pub struct WorkoutSchema;

impl WorkoutSchema {
    fn interval_descriptor() -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["type", "durationType", "durationValue", "durationUnit", "intensityType"],
            "properties": {
                "type": string_enum(&["WARMUP", "ACTIVE", "COOLDOWN", "REST"]),
                "durationType": string_enum(&["TIME", "DISTANCE", "HEART_RATE", "CALORIES"]),
                "durationValue": {"type": "number", "exclusiveMinimum": 0},
                "durationUnit": string_enum(&["SECONDS", "MINUTES", "HOURS", "METERS", "KILOMETERS", "MILES", "YARDS", "BPM", "KCAL"]),
                "intensityType": string_enum(&["NONE", "CADENCE", "HEART_RATE", "POWER", "PACE_MIN_PER_KM", "PACE_MIN_PER_MILE", "PACE_SEC_PER_100M"]),
                "intensityMin": {"type": "number", "minimum": 0},
                "intensityMax": {"type": "number", "minimum": 0}
            }
        })
    }

    fn check_interval(interval: &Interval, path: &str, violations: &mut Violations) {
        violations.require(
            interval.duration_value.is_finite() && interval.duration_value > 0.0,
            &format!("{path}.durationValue"),
            "must be a finite number > 0",
        );
        violations.require(
            interval.duration_unit.measures(interval.duration_type),
            &format!("{path}.durationUnit"),
            "does not match durationType",
        );
        for (bound, name) in [
            (interval.intensity_min, "intensityMin"),
            (interval.intensity_max, "intensityMax"),
        ] {
            if let Some(value) = bound {
                violations.non_negative(value, &format!("{path}.{name}"));
            }
        }
        if interval.intensity_type != IntensityType::None {
            violations.require(
                interval.intensity_min.is_some() || interval.intensity_max.is_some(),
                &format!("{path}.intensityMin"),
                "an intensity target needs intensityMin or intensityMax",
            );
        }
        if let (Some(min), Some(max)) = (interval.intensity_min, interval.intensity_max) {
            violations.require(
                min <= max,
                &format!("{path}.intensityMax"),
                "must not be below intensityMin",
            );
        }
    }

    fn check_repeat_group(group: &RepeatGroup, path: &str, violations: &mut Violations) {
        violations.require(
            (1..=MAX_REPEATS).contains(&group.repeats),
            &format!("{path}.repeats"),
            "must be between 1 and 50",
        );
        if group.intervals.is_empty() {
            violations.push(&format!("{path}.intervals"), "must not be empty");
        }
        for (index, interval) in group.intervals.iter().enumerate() {
            Self::check_interval(interval, &format!("{path}.intervals[{index}]"), violations);
        }
        if let Some(rest) = &group.rest_interval {
            Self::check_interval(rest, &format!("{path}.restInterval"), violations);
        }
    }
}

impl OutputSchema for WorkoutSchema {
    type Output = Workout;

    const STAGE: Stage = Stage::Workout;

    fn descriptor() -> Value {
        let interval = Self::interval_descriptor();
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["title", "description", "type", "items"],
            "properties": {
                "title": {"type": "string", "minLength": 1},
                "description": {"type": "string", "minLength": 1},
                "type": workout_type_descriptor(),
                "items": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": MAX_WORKOUT_ITEMS,
                    "items": {
                        "oneOf": [
                            {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["interval"],
                                "properties": {"interval": interval}
                            },
                            {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["repeatGroup"],
                                "properties": {
                                    "repeatGroup": {
                                        "type": "object",
                                        "additionalProperties": false,
                                        "required": ["repeats", "intervals"],
                                        "properties": {
                                            "repeats": {"type": "integer", "minimum": 1, "maximum": MAX_REPEATS},
                                            "intervals": {"type": "array", "minItems": 1, "items": interval},
                                            "restInterval": interval
                                        }
                                    }
                                }
                            }
                        ]
                    }
                }
            }
        })
    }

    fn check(output: &Workout, violations: &mut Violations) {
        violations.text(&output.title, "title");
        violations.text(&output.description, "description");
        if output.items.is_empty() {
            violations.push("items", "must not be empty");
        }
        violations.require(
            output.items.len() <= MAX_WORKOUT_ITEMS,
            "items",
            "has too many items",
        );
        for (index, item) in output.items.iter().enumerate() {
            match item {
                WorkoutItem::Interval(interval) => Self::check_interval(
                    interval,
                    &format!("items[{index}].interval"),
                    violations,
                ),
                WorkoutItem::RepeatGroup(group) => Self::check_repeat_group(
                    group,
                    &format!("items[{index}].repeatGroup"),
                    violations,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(value: f64, unit: &str) -> Value {
        json!({
            "type": "ACTIVE",
            "durationType": "TIME",
            "durationValue": value,
            "durationUnit": unit,
            "intensityType": "HEART_RATE",
            "intensityMin": 150,
            "intensityMax": 140
        })
    }

    #[test]
    fn test_workout_collects_every_violation() {
        let candidate = json!({
            "title": "",
            "description": "threshold session",
            "type": "RUN",
            "items": [
                {"interval": interval(0.0, "MINUTES")},
                {"repeatGroup": {"repeats": 0, "intervals": [interval(5.0, "METERS")]}}
            ]
        });
        let error = WorkoutSchema::validate(candidate).unwrap_err();
        assert_eq!(error.stage, Stage::Workout);
        let joined = error.details.join("\n");
        assert!(joined.contains("title: must not be empty"));
        assert!(joined.contains("items[0].interval.durationValue"));
        assert!(joined.contains("items[0].interval.intensityMax"));
        assert!(joined.contains("items[1].repeatGroup.repeats"));
        assert!(joined.contains("items[1].repeatGroup.intervals[0].durationUnit"));
    }

    #[test]
    fn test_lowercase_enum_is_rejected() {
        let candidate = json!({
            "phases": [{
                "name": "Base", "startDate": "2024-01-01", "endDate": "2024-01-07",
                "objective": "base", "description": "aerobic", "weeks": []
            }]
        });
        let error = SkeletonSchema::validate(candidate).unwrap_err();
        assert_eq!(error.details.len(), 1);
        assert!(error.details[0].contains("base"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let candidate = json!({"detailedDescription": "x", "days": [], "notes": "extra"});
        assert!(WeekOutlineSchema::validate(candidate).is_err());
    }

    #[test]
    fn test_outline_day_numbers_must_be_contiguous() {
        let day = |number: u32, date: &str| {
            json!({
                "dayNumber": number, "dayName": "Mon", "date": date, "dayDescription": "easy",
                "workoutType": "RUN", "intensityLevel": 3, "isRestDay": false
            })
        };
        let candidate = json!({
            "detailedDescription": "week",
            "days": [day(1, "2024-01-01"), day(3, "2024-01-02")]
        });
        let error = WeekOutlineSchema::validate(candidate).unwrap_err();
        assert_eq!(error.details.len(), 1);
        assert!(error.details[0].starts_with("days[1].dayNumber"));
    }
}

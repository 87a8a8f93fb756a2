// ABOUTME: Versioned prompt templates for the three plan generation stages
// ABOUTME: Embedded and directory-backed template stores with single-pass placeholder rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompt Templates
//!
//! Each stage reads one versioned template. Templates are plain text with
//! `{placeholder}` tokens drawn from a fixed, documented set per template.
//! Rendering makes one left-to-right pass: substituted values are never
//! re-scanned, and a token without a value fails the render.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::errors::TemplateError;

/// System prompt shared by every stage
pub const COACH_SYSTEM_PROMPT: &str = include_str!("coach_system.md");

const SKELETON_V1: &str = include_str!("skeleton.v1.txt");
const WEEK_OUTLINE_V1: &str = include_str!("week_outline.v1.txt");
const WORKOUT_V1: &str = include_str!("workout.v1.txt");

/// Matches `{identifier}`; JSON braces such as `{"a": 1}` never match
static PLACEHOLDER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").ok());

/// Identifier of a stage prompt template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateId {
    /// Phase/week skeleton prompt
    Skeleton,
    /// Day-by-day week outline prompt
    WeekOutline,
    /// Single workout prompt
    Workout,
}

impl TemplateId {
    /// Every template, in pipeline order
    pub const ALL: [Self; 3] = [Self::Skeleton, Self::WeekOutline, Self::Workout];

    /// Stable identifier used in file names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton",
            Self::WeekOutline => "week_outline",
            Self::Workout => "workout",
        }
    }

    /// Version of the placeholder contract
    #[must_use]
    pub const fn version(self) -> u32 {
        1
    }

    /// File name of this template inside a template directory
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.v{}.txt", self.as_str(), self.version())
    }

    /// Documented placeholders available to this template
    #[must_use]
    pub const fn placeholders(self) -> &'static [&'static str] {
        match self {
            Self::Skeleton => &[
                "raceName",
                "raceType",
                "raceDistance",
                "startDate",
                "raceDate",
                "experienceLevel",
                "goalTime",
                "restDays",
                "additionalNotes",
                "totalWeeks",
                "weeks",
            ],
            Self::WeekOutline => &[
                "raceName",
                "raceType",
                "experienceLevel",
                "goalTime",
                "restDays",
                "phaseName",
                "phaseObjective",
                "phaseDescription",
                "weekNumber",
                "weekStartDate",
                "weekEndDate",
                "weekFocus",
                "weekDescription",
                "volumeDistance",
                "volumeDuration",
                "dayCount",
                "daySlots",
            ],
            Self::Workout => &[
                "raceType",
                "experienceLevel",
                "goalTime",
                "additionalNotes",
                "phaseObjective",
                "weekFocus",
                "dayDate",
                "dayName",
                "dayDescription",
                "workoutType",
                "intensityLevel",
            ],
        }
    }

    const fn embedded(self) -> &'static str {
        match self {
            Self::Skeleton => SKELETON_V1,
            Self::WeekOutline => WEEK_OUTLINE_V1,
            Self::Workout => WORKOUT_V1,
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.v{}", self.as_str(), self.version())
    }
}

/// Named placeholder values for one render
#[derive(Debug, Clone, Default)]
pub struct PromptValues {
    values: BTreeMap<&'static str, String>,
}

impl PromptValues {
    /// Create an empty value map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl fmt::Display) -> Self {
        self.values.insert(name, value.to_string());
        self
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Render a template in a single pass over its `{placeholder}` tokens
///
/// # Errors
///
/// Returns `TemplateError::MissingPlaceholder` for the first token with no value.
pub fn render(id: TemplateId, text: &str, values: &PromptValues) -> Result<String, TemplateError> {
    let pattern = PLACEHOLDER_PATTERN
        .as_ref()
        .ok_or_else(|| TemplateError::Unavailable {
            template: id.to_string(),
            reason: "placeholder pattern failed to compile".to_owned(),
        })?;

    let mut rendered = String::with_capacity(text.len());
    let mut last = 0;
    for captures in pattern.captures_iter(text) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = values
            .get(name.as_str())
            .ok_or_else(|| TemplateError::MissingPlaceholder {
                template: id.to_string(),
                placeholder: name.as_str().to_owned(),
            })?;
        rendered.push_str(&text[last..whole.start()]);
        rendered.push_str(value);
        last = whole.end();
    }
    rendered.push_str(&text[last..]);
    Ok(rendered)
}

/// Source of stage prompt templates
pub trait TemplateStore: Send + Sync {
    /// Template text for the given identifier
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Unavailable` if the template cannot be provided.
    fn template(&self, id: TemplateId) -> Result<&str, TemplateError>;

    /// Render a template with the given values
    ///
    /// # Errors
    ///
    /// Returns a `TemplateError` if the template is unavailable or a placeholder has no value.
    fn render(&self, id: TemplateId, values: &PromptValues) -> Result<String, TemplateError> {
        render(id, self.template(id)?, values)
    }
}

/// Templates compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplateStore;

impl TemplateStore for EmbeddedTemplateStore {
    fn template(&self, id: TemplateId) -> Result<&str, TemplateError> {
        Ok(id.embedded())
    }
}

/// Templates read from `<dir>/<id>.v<version>.txt`, falling back to the embedded copy
#[derive(Debug, Clone)]
pub struct DirectoryTemplateStore {
    directory: PathBuf,
    templates: BTreeMap<TemplateId, String>,
}

impl DirectoryTemplateStore {
    /// Load every template from a directory once
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Unavailable` if a template file exists but cannot be read.
    pub fn load(directory: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let directory = directory.as_ref().to_path_buf();
        let mut templates = BTreeMap::new();

        for id in TemplateId::ALL {
            let path = directory.join(id.file_name());
            match fs::read_to_string(&path) {
                Ok(text) => {
                    info!(template = %id, path = %path.display(), "Loaded prompt template override");
                    templates.insert(id, text);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(template = %id, "No override found, using embedded template");
                }
                Err(e) => {
                    return Err(TemplateError::Unavailable {
                        template: id.to_string(),
                        reason: format!("{}: {e}", path.display()),
                    });
                }
            }
        }

        Ok(Self {
            directory,
            templates,
        })
    }

    /// Directory the overrides were loaded from
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether the given template came from the directory
    #[must_use]
    pub fn is_overridden(&self, id: TemplateId) -> bool {
        self.templates.contains_key(&id)
    }
}

impl TemplateStore for DirectoryTemplateStore {
    fn template(&self, id: TemplateId) -> Result<&str, TemplateError> {
        Ok(self
            .templates
            .get(&id)
            .map_or_else(|| id.embedded(), String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let values = PromptValues::new()
            .with("a", "{b}")
            .with("b", "nope");
        let rendered = render(TemplateId::Workout, "x {a} y", &values).unwrap();
        assert_eq!(rendered, "x {b} y");
    }

    #[test]
    fn test_prefix_names_do_not_collide() {
        let values = PromptValues::new()
            .with("week", "W")
            .with("weekNumber", "3");
        let rendered = render(TemplateId::Skeleton, "{weekNumber}/{week}", &values).unwrap();
        assert_eq!(rendered, "3/W");
    }

    #[test]
    fn test_missing_value_fails_loudly() {
        let error = render(TemplateId::Skeleton, "hi {raceName}", &PromptValues::new()).unwrap_err();
        assert_eq!(
            error,
            TemplateError::MissingPlaceholder {
                template: "skeleton.v1".to_owned(),
                placeholder: "raceName".to_owned(),
            }
        );
    }

    #[test]
    fn test_json_braces_are_left_alone() {
        let rendered = render(
            TemplateId::Workout,
            r#"{"title": "..."} {"items": []}"#,
            &PromptValues::new(),
        )
        .unwrap();
        assert_eq!(rendered, r#"{"title": "..."} {"items": []}"#);
    }

    #[test]
    fn test_embedded_templates_only_use_documented_placeholders() {
        let pattern = PLACEHOLDER_PATTERN.as_ref().unwrap();
        for id in TemplateId::ALL {
            for captures in pattern.captures_iter(id.embedded()) {
                let name = &captures[1];
                assert!(
                    id.placeholders().contains(&name),
                    "{id} uses undocumented placeholder {name}"
                );
            }
        }
    }
}

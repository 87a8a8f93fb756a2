// ABOUTME: Skeleton stage: groups the partitioned week windows into generated training phases
// ABOUTME: Rejects skeletons whose flattened weeks differ from the computed calendar
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::{or_unspecified, LlmStageGenerator, StageGenerator};
use crate::errors::{DateConsistencyError, GenerationError, Stage};
use crate::llm::prompts::{PromptValues, TemplateId};
use crate::llm::ModelSelector;
use crate::models::{ScheduleRequest, Skeleton, WeekWindow};
use crate::training_plan::schema::SkeletonSchema;

/// Everything the skeleton stage is allowed to see
#[derive(Debug, Clone)]
pub struct SkeletonContext {
    /// The questionnaire
    pub request: Arc<ScheduleRequest>,
    /// Fixed week boundaries the skeleton must reproduce
    pub windows: Vec<WeekWindow>,
}

impl SkeletonContext {
    fn prompt_values(&self) -> PromptValues {
        let request = &self.request;
        let weeks = self
            .windows
            .iter()
            .map(|window| {
                format!(
                    "- Week {}: {} to {} ({} days)",
                    window.week_number,
                    window.start_date,
                    window.end_date,
                    window.len_days()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        PromptValues::new()
            .with("raceName", &request.race_name)
            .with("raceType", request.race_type)
            .with("raceDistance", request.race_distance)
            .with("startDate", request.start_date)
            .with("raceDate", request.race_date)
            .with("experienceLevel", request.experience_level)
            .with("goalTime", or_unspecified(request.goal_time.as_deref()))
            .with("restDays", request.rest_days_label())
            .with(
                "additionalNotes",
                or_unspecified(request.additional_notes.as_deref()),
            )
            .with("totalWeeks", self.windows.len())
            .with("weeks", weeks)
    }
}

/// Check that a skeleton's weeks flatten back to exactly the computed windows
///
/// # Errors
///
/// Returns `DateConsistencyError` listing every week that was added, dropped,
/// renumbered or moved.
pub fn check_skeleton_dates(
    skeleton: &Skeleton,
    windows: &[WeekWindow],
) -> Result<(), DateConsistencyError> {
    let generated: Vec<WeekWindow> = skeleton.weeks().map(|week| week.window()).collect();
    let mut details = Vec::new();

    if generated.len() != windows.len() {
        details.push(format!(
            "expected {} weeks, skeleton contains {}",
            windows.len(),
            generated.len()
        ));
    }
    for (position, (got, expected)) in generated.iter().zip(windows).enumerate() {
        if got != expected {
            details.push(format!(
                "weeks[{position}]: expected week {} {}..{}, got week {} {}..{}",
                expected.week_number,
                expected.start_date,
                expected.end_date,
                got.week_number,
                got.start_date,
                got.end_date
            ));
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(DateConsistencyError {
            stage: Stage::Skeleton,
            details,
        })
    }
}

#[async_trait]
impl StageGenerator<SkeletonContext, Skeleton> for LlmStageGenerator {
    #[instrument(skip_all, fields(stage = "skeleton", weeks = context.windows.len()))]
    async fn generate(
        &self,
        context: &SkeletonContext,
        selector: &ModelSelector,
    ) -> Result<Skeleton, GenerationError> {
        let prompt = self
            .templates
            .render(TemplateId::Skeleton, &context.prompt_values())?;
        let skeleton = self
            .client
            .generate::<SkeletonSchema>(&prompt, selector)
            .await?;
        check_skeleton_dates(&skeleton, &context.windows)?;
        Ok(skeleton)
    }
}

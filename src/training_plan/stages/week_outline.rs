// ABOUTME: Week outline stage: turns one skeleton week into a day-by-day outline
// ABOUTME: Outline days must match the partitioned day slots in count and in date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::instrument;

use super::{or_unspecified, LlmStageGenerator, StageGenerator};
use crate::errors::{DateConsistencyError, GenerationError, SchemaValidationError, Stage};
use crate::llm::prompts::{PromptValues, TemplateId};
use crate::llm::ModelSelector;
use crate::models::{PhaseObjective, ScheduleRequest, Week, WeekOutline};
use crate::training_plan::calendar::weekday_name;
use crate::training_plan::schema::WeekOutlineSchema;

/// Everything the week outline stage is allowed to see
#[derive(Debug, Clone)]
pub struct WeekOutlineContext {
    /// The questionnaire
    pub request: Arc<ScheduleRequest>,
    /// Name of the enclosing phase
    pub phase_name: String,
    /// Objective of the enclosing phase
    pub phase_objective: PhaseObjective,
    /// Description of the enclosing phase
    pub phase_description: String,
    /// Skeleton week being outlined
    pub week: Week,
    /// Exact dates the outline must use, in order
    pub day_slots: Vec<NaiveDate>,
}

impl WeekOutlineContext {
    fn prompt_values(&self) -> PromptValues {
        let request = &self.request;
        let week = &self.week;
        let day_slots = self
            .day_slots
            .iter()
            .enumerate()
            .map(|(index, date)| format!("- Day {}: {date} ({})", index + 1, weekday_name(*date)))
            .collect::<Vec<_>>()
            .join("\n");

        PromptValues::new()
            .with("raceName", &request.race_name)
            .with("raceType", request.race_type)
            .with("experienceLevel", request.experience_level)
            .with("goalTime", or_unspecified(request.goal_time.as_deref()))
            .with("restDays", request.rest_days_label())
            .with("phaseName", &self.phase_name)
            .with("phaseObjective", self.phase_objective)
            .with("phaseDescription", &self.phase_description)
            .with("weekNumber", week.week_number)
            .with("weekStartDate", week.start_date)
            .with("weekEndDate", week.end_date)
            .with("weekFocus", week.focus)
            .with("weekDescription", &week.description)
            .with("volumeDistance", week.volume_distance)
            .with("volumeDuration", week.volume_duration.minutes)
            .with("dayCount", self.day_slots.len())
            .with("daySlots", day_slots)
    }
}

/// Check an outline's days against the partitioned day slots
///
/// A wrong number of days is a schema failure; a day carrying a date other
/// than its slot is a date consistency failure.
///
/// # Errors
///
/// Returns `GenerationError::SchemaValidation` or `GenerationError::DateConsistency`.
pub fn check_outline_dates(outline: &WeekOutline, slots: &[NaiveDate]) -> Result<(), GenerationError> {
    if outline.days.len() != slots.len() {
        return Err(SchemaValidationError::single(
            Stage::WeekOutline,
            format!(
                "days: expected exactly {} days, got {}",
                slots.len(),
                outline.days.len()
            ),
        )
        .into());
    }

    let details: Vec<String> = outline
        .days
        .iter()
        .zip(slots)
        .enumerate()
        .filter(|(_, (day, slot))| day.date != **slot)
        .map(|(position, (day, slot))| {
            format!("days[{position}].date: expected {slot}, got {}", day.date)
        })
        .collect();

    if details.is_empty() {
        Ok(())
    } else {
        Err(DateConsistencyError {
            stage: Stage::WeekOutline,
            details,
        }
        .into())
    }
}

#[async_trait]
impl StageGenerator<WeekOutlineContext, WeekOutline> for LlmStageGenerator {
    #[instrument(skip_all, fields(stage = "week_outline", week_number = context.week.week_number))]
    async fn generate(
        &self,
        context: &WeekOutlineContext,
        selector: &ModelSelector,
    ) -> Result<WeekOutline, GenerationError> {
        let prompt = self
            .templates
            .render(TemplateId::WeekOutline, &context.prompt_values())?;
        let outline = self
            .client
            .generate::<WeekOutlineSchema>(&prompt, selector)
            .await?;
        check_outline_dates(&outline, &context.day_slots)?;
        Ok(outline)
    }
}

// ABOUTME: Workout stage: turns one outlined training day into an interval-structured workout
// ABOUTME: The workout inherits its date from the day, so no calendar cross-check applies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use super::{or_unspecified, LlmStageGenerator, StageGenerator};
use crate::errors::GenerationError;
use crate::llm::prompts::{PromptValues, TemplateId};
use crate::llm::ModelSelector;
use crate::models::{DayOutline, PhaseObjective, ScheduleRequest, WeekFocus, Workout};
use crate::training_plan::schema::WorkoutSchema;

/// Everything the workout stage is allowed to see
#[derive(Debug, Clone)]
pub struct WorkoutContext {
    /// The questionnaire
    pub request: Arc<ScheduleRequest>,
    /// Objective of the enclosing phase
    pub phase_objective: PhaseObjective,
    /// Focus of the enclosing week
    pub week_focus: WeekFocus,
    /// Outline entry of the day
    pub day: DayOutline,
}

impl WorkoutContext {
    fn prompt_values(&self) -> PromptValues {
        let request = &self.request;
        let day = &self.day;

        PromptValues::new()
            .with("raceType", request.race_type)
            .with("experienceLevel", request.experience_level)
            .with("goalTime", or_unspecified(request.goal_time.as_deref()))
            .with(
                "additionalNotes",
                or_unspecified(request.additional_notes.as_deref()),
            )
            .with("phaseObjective", self.phase_objective)
            .with("weekFocus", self.week_focus)
            .with("dayDate", day.date)
            .with("dayName", &day.day_name)
            .with("dayDescription", &day.day_description)
            .with("workoutType", day.workout_type.unwrap_or(request.race_type))
            .with("intensityLevel", day.intensity_level)
    }
}

#[async_trait]
impl StageGenerator<WorkoutContext, Workout> for LlmStageGenerator {
    #[instrument(skip_all, fields(stage = "workout", date = %context.day.date))]
    async fn generate(
        &self,
        context: &WorkoutContext,
        selector: &ModelSelector,
    ) -> Result<Workout, GenerationError> {
        let prompt = self
            .templates
            .render(TemplateId::Workout, &context.prompt_values())?;
        self.client
            .generate::<WorkoutSchema>(&prompt, selector)
            .await
    }
}

// ABOUTME: Command-line training plan generator reading a schedule request from a JSON file
// ABOUTME: Writes the assembled plan as JSON; Ctrl-C cancels the run without partial output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stride Plan CLI
//!
//! ```text
//! stride-plan --request request.json --output plan.json --workout-model llama-3.1-8b-instant
//! ```

use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use stride_planner::{
    config::PlannerConfig,
    context::GenerationContext,
    errors::AppError,
    llm::{ModelSelection, ModelSelector},
    logging::{self, PlanTraceContext},
    models::ScheduleRequest,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "stride-plan")]
#[command(about = "Generate a periodized training plan from a schedule request")]
struct Args {
    /// Schedule request JSON file
    #[arg(short, long)]
    request: PathBuf,

    /// Write the plan here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model for the skeleton stage
    #[arg(long)]
    skeleton_model: Option<String>,

    /// Model for the week outline stage
    #[arg(long)]
    week_outline_model: Option<String>,

    /// Model for the workout stage
    #[arg(long)]
    workout_model: Option<String>,
}

fn override_model(selector: &mut ModelSelector, model: Option<String>) {
    if let Some(model) = model {
        selector.model = Some(model);
    }
}

fn models_for(args: &Args, defaults: &ModelSelection) -> ModelSelection {
    let mut models = defaults.clone();
    override_model(&mut models.skeleton, args.skeleton_model.clone());
    override_model(&mut models.week_outline, args.week_outline_model.clone());
    override_model(&mut models.workout, args.workout_model.clone());
    models
}

fn read_request(path: &Path) -> Result<ScheduleRequest, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::invalid_input(format!("Cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::invalid_input(format!("Invalid request in {}: {e}", path.display())))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let request = read_request(&args.request)?;

    let config = PlannerConfig::from_env()?;
    let generation = GenerationContext::from_config(&config)?;
    let models = models_for(&args, generation.default_models());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling plan generation");
            on_signal.cancel();
        }
    });

    let trace = PlanTraceContext::default();
    let plan = generation
        .orchestrator()
        .generate_training_plan(request, &models, &trace, &cancel)
        .await
        .map_err(AppError::from)?;

    if !plan.is_complete() {
        warn!(
            failed_weeks = plan.completeness.failed_weeks.len(),
            failed_days = plan.completeness.failed_days.len(),
            "Plan generated with gaps"
        );
    }

    let json = serde_json::to_string_pretty(&plan)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).map_err(|e| {
                AppError::internal(format!("Failed to write {}: {e}", path.display()))
            })?;
            info!(path = %path.display(), "Plan written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

// ABOUTME: HTTP server exposing training plan generation, saving and retrieval
// ABOUTME: Loads configuration from the environment and shuts down gracefully on Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Stride Planner Server Binary

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use stride_planner::{config::PlannerConfig, context::ServerContext, logging, routes};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "stride-server")]
#[command(about = "Stride Planner - AI training plan generation API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = PlannerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    let port = config.http_port;

    let context = ServerContext::from_config(config)?;
    let app = routes::router(context);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Stride planner listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

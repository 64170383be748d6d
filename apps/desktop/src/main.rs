use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    load_settings, HttpAnalysisService, SimulatedWearable, WorkflowController,
};
use tracing_subscriber::EnvFilter;

mod commands;
mod shell;
mod view;

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the PreventiveCare analysis service")]
struct Args {
    /// Settings file (defaults to ./preventive_care.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    analysis_url: Option<String>,
    #[arg(long)]
    health_url: Option<String>,
    #[arg(long)]
    sync_delay_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.analysis_url {
        settings.analysis_url = url;
    }
    if let Some(url) = args.health_url {
        settings.health_url = url;
    }
    if let Some(delay) = args.sync_delay_ms {
        settings.sync_delay_ms = delay;
    }
    settings.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!(analysis_url = %settings.analysis_url, "starting session");

    let controller = WorkflowController::new(
        Arc::new(HttpAnalysisService::from_settings(&settings)),
        Arc::new(SimulatedWearable::new(settings.sync_delay())),
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell::run(controller, stdin, std::io::stdout()).await
}

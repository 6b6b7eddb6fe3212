mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Notify;
use tracing::info;

use reprice_core::config::load_dotenv;
use reprice_core::Config;
use reprice_pipeline::{shutdown_signal, watch_loop, Pipeline, TriggerSource};
use reprice_rules::PricingEngine;

use crate::cli::CliArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config = match &args.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    }
    .context("failed to load configuration")?;
    args.apply(&mut config);
    config.log_summary();

    // Installed before any pass so an interrupt never lands mid-write.
    let shutdown = shutdown_signal().context("failed to install signal handlers")?;

    let engine = PricingEngine::with_default_rules().with_rounding(config.pricing.rounding);
    let mut pipeline = Pipeline::new(config.tables.clone(), engine);

    if args.once {
        let report = pipeline.run_pass().context("pricing pass failed")?;
        report.log_summary();
        return Ok(());
    }

    let trigger = Arc::new(Notify::new());
    let source = TriggerSource::start(
        &[&config.tables.products_file, &config.tables.sales_file],
        trigger.clone(),
    )
    .context("failed to start file watcher")?;
    info!(inputs = ?source.watched(), "watching input tables, press Ctrl-C to stop");

    watch_loop(&mut pipeline, trigger, config.watch.debounce(), shutdown).await;

    drop(source);
    Ok(())
}

//! immich-smart-albums — keeps Immich albums filled with the results of
//! saved metadata searches.
//!
//! Each configured album is paired with a `POST /api/search/metadata` query.
//! On every pass the search is run to completion (following page cursors),
//! compared with the album's current members, and any missing assets are
//! added in one bulk request. Nothing is ever removed from an album. Passes
//! repeat at a fixed interval until the process receives a shutdown signal.

#![warn(clippy::all)]

mod cli;
mod config;
mod immich;
mod scheduler;
mod shutdown;
mod sync;
mod systemd;
mod types;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use immich::ImmichClient;
use scheduler::PeriodicTask;
use sync::Reconciler;
use systemd::SystemdNotifier;

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config_path = config::expand_tilde(&cli.config);
    tracing::info!(path = %config_path.display(), "Loading configuration");
    let config = config::Config::load(&config_path, cli.api_key)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    tracing::info!(
        url = %config.url,
        albums = config.albums.len(),
        interval_secs = config.interval.as_secs(),
        "Configuration loaded"
    );
    if config.albums.is_empty() {
        tracing::warn!("No albums configured, nothing will be synced");
    }

    let http = immich::build_http_client(&config.api_key, config.request_timeout)
        .context("Failed to build HTTP client")?;
    let client = ImmichClient::new(config.url.clone(), Box::new(http));
    let reconciler = Reconciler::new(client, config.albums);

    let notifier = SystemdNotifier::new(cli.notify_systemd);
    notifier.notify_ready();

    if cli.once {
        let stats = reconciler.run_cycle().await;
        notifier.notify_stopping();
        if stats.errors > 0 {
            anyhow::bail!("{} of {} albums failed to sync", stats.errors, stats.albums);
        }
        return Ok(());
    }

    let shutdown_token = shutdown::install_signal_handler();
    let task = PeriodicTask::new(config.interval, shutdown_token);

    let reconciler = &reconciler;
    let runs = task
        .run(move || async move {
            let stats = reconciler.run_cycle().await;
            notifier.notify_status(&format!("Last pass: {stats}"));
        })
        .await;

    tracing::info!(passes = runs, "Stopped");
    notifier.notify_stopping();
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %format!("{e:#}"), "Fatal error");
        std::process::exit(1);
    }
}

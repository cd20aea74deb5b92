use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use steal_finder::AppConfig;
use steal_finder::cli::Cli;
use steal_finder::config::load_watches;
use steal_finder::plugins::NotifierPlugin;
use steal_finder::plugins::notifiers::DiscordNotifier;
use steal_finder::scheduler::PollScheduler;
use steal_finder::scraper::HttpFetcher;
use steal_finder::store::JsonSeenStore;
use steal_finder::utils::logging;
use steal_finder::watch_runner::WatchRunner;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {e:#}");
        std::process::exit(1);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting Steal Finder...");

    let mut config = AppConfig::from_env().context("load settings")?;
    cli.apply(&mut config);
    config.validate().context("invalid settings")?;

    let watches = load_watches(&config.paths.watches)
        .with_context(|| format!("load watch list from {}", config.paths.watches.display()))?;
    info!(watches = watches.len(), path = %config.paths.watches.display(), "Watch list loaded");

    let notifier = DiscordNotifier::new(config.discord.clone())?;
    notifier
        .test_connection()
        .await
        .with_context(|| format!("Discord channel {} is not reachable", config.discord.channel_id))?;
    info!(channel = %config.discord.channel_id, "Discord channel verified");

    let store = JsonSeenStore::load(&config.paths.seen).await;
    info!(path = %store.path().display(), entries = store.len().await, "Seen state ready");

    let fetcher = HttpFetcher::new(&config.scraper)?;
    let runner = WatchRunner::new(Arc::new(fetcher), Arc::new(notifier), Arc::new(store))
        .with_pacing(Duration::from_millis(config.scheduler.notify_pacing_ms));

    let scheduler = PollScheduler::new(
        Arc::new(runner),
        watches,
        Duration::from_secs(config.scheduler.poll_interval),
    );

    if cli.once {
        let report = scheduler.run_cycle().await;
        info!(
            failed = report.failed_watches,
            notified = report.notifications_sent,
            "Single cycle complete"
        );
        return Ok(());
    }

    tokio::select! {
        _ = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for shutdown signal")?;
            info!("Shutting down...");
        }
    }

    Ok(())
}

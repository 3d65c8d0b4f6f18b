use std::sync::Arc;

use clap::Parser;
use common::logger::init_logger;
use tokio::sync::watch;

use watcher::{
    cli::Cli,
    comparator::Comparator,
    config::AppConfig,
    market::probit::ProbitClient,
    metrics::CycleCounters,
    notify::TelegramNotifier,
    scheduler::{CycleScheduler, CycleSettings},
    snapshot::SnapshotStore,
};

/// Wires the quote source, notifier, comparator and store into a scheduler.
fn build_scheduler(cfg: &AppConfig, counters: CycleCounters) -> anyhow::Result<CycleScheduler> {
    let source = ProbitClient::new(cfg.quote_url.clone(), cfg.request_timeout)?;

    let notifier = TelegramNotifier::new(
        cfg.telegram_url.clone(),
        cfg.tg_token.clone(),
        cfg.tg_chat_id,
        cfg.request_timeout,
    )?;

    let comparator = Comparator::new(cfg.change_min, Arc::new(notifier), counters.clone());

    Ok(CycleScheduler::new(
        Arc::new(source),
        comparator,
        SnapshotStore::new(),
        CycleSettings {
            scope: cfg.watch_scope.clone(),
            interval: cfg.poll_interval,
            max_concurrency: cfg.max_concurrency,
        },
        counters,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_logger("watcher", is_production);

    let cfg = AppConfig::try_from(Cli::parse())?;
    tracing::info!(config = ?cfg, "Starting quote watcher...");

    let counters = CycleCounters::default();
    let scheduler = build_scheduler(&cfg, counters.clone())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            // Dropping the sender would stop the scheduler, so hold it forever.
            tracing::error!(error = ?e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    scheduler.run(shutdown_rx).await;

    tracing::info!(
        cycles = CycleCounters::read(&counters.cycles),
        fetch_failures = CycleCounters::read(&counters.fetch_failures),
        notifications_sent = CycleCounters::read(&counters.notifications_sent),
        delivery_failures = CycleCounters::read(&counters.delivery_failures),
        "quote watcher stopped"
    );

    Ok(())
}

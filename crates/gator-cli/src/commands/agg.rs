use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::info;

use gator_core::{
    feed::FeedFetcher,
    scheduler::{SchedulerEvent, SchedulerService},
    storage::Database,
    AppConfig,
};

/// Start the aggregation loop; returns after Ctrl+C
pub async fn run(db: Database, config: &AppConfig, interval: Duration) -> Result<()> {
    let fetcher = FeedFetcher::new(config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(line) = describe(&event) {
                println!("{}", line);
            }
        }
    });

    println!("Collecting feeds every {:?}. Press Ctrl+C to stop.", interval);

    SchedulerService::new(Arc::new(db), Arc::new(fetcher))
        .with_event_sender(event_tx)
        .run(interval, shutdown_rx)
        .await;

    // The scheduler owned the sender, so the printer drains and exits
    printer.await.ok();
    println!("Stopped.");

    Ok(())
}

/// Console line for a scheduler event
///
/// Failed cycles are already reported through `tracing`, so they print nothing here.
fn describe(event: &SchedulerEvent) -> Option<String> {
    match event {
        SchedulerEvent::Idle => Some("No feeds to fetch.".to_string()),
        SchedulerEvent::FeedIngested { feed, report } => Some(format!(
            "{}: {} new posts ({} already known)",
            feed, report.inserted, report.duplicates
        )),
        SchedulerEvent::Error { .. } => None,
    }
}

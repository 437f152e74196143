use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::feed::FeedSource;
use crate::ingest::IngestReport;
use crate::storage::FeedStore;

use super::tasks::{scrape_next_feed, CycleOutcome};

/// Events emitted by the scheduler after every cycle
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// There was no feed to fetch
    Idle,
    /// A feed was fetched and ingested
    FeedIngested { feed: String, report: IngestReport },
    /// The cycle failed; the loop carries on
    Error { message: String },
}

/// Background aggregation loop
///
/// One cycle per tick, one feed per cycle, never two cycles at once.
pub struct SchedulerService {
    store: Arc<dyn FeedStore>,
    source: Arc<dyn FeedSource>,
    event_tx: Option<mpsc::UnboundedSender<SchedulerEvent>>,
}

impl SchedulerService {
    /// Create a new scheduler service
    pub fn new(store: Arc<dyn FeedStore>, source: Arc<dyn FeedSource>) -> Self {
        Self {
            store,
            source,
            event_tx: None,
        }
    }

    /// Set the event sender for cycle notifications
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Send an event to the listener (if event channel is configured)
    fn send_event(&self, event: SchedulerEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event).is_err() {
                warn!("Failed to send scheduler event: receiver dropped");
            }
        }
    }

    /// Run cycles every `interval` until shutdown is signalled
    ///
    /// The first cycle starts immediately. A cycle that overruns the interval
    /// pushes the next tick back instead of triggering a burst. Shutdown is
    /// observed between cycles; an in-flight fetch is never cancelled.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!("Aggregator started: one feed every {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Aggregator received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        info!("Aggregator stopped");
    }

    /// Run a single cycle, reporting instead of propagating failures
    pub async fn run_cycle(&self) {
        match scrape_next_feed(self.store.as_ref(), self.source.as_ref()).await {
            Ok(CycleOutcome::Idle) => {
                debug!("Nothing to fetch this cycle");
                self.send_event(SchedulerEvent::Idle);
            }
            Ok(CycleOutcome::Ingested { feed, report }) => {
                self.send_event(SchedulerEvent::FeedIngested {
                    feed: feed.name,
                    report,
                });
            }
            Err(e) => {
                error!("Aggregation cycle failed: {}", e);
                self.send_event(SchedulerEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }
}

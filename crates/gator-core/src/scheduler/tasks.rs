use crate::feed::{Feed, FeedSource};
use crate::ingest::{ingest, IngestReport};
use crate::storage::FeedStore;
use crate::{Error, Result};

/// Result of one select → mark → fetch → ingest cycle
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// No feeds are registered
    Idle,
    /// A feed was fetched and its items ingested
    Ingested { feed: Feed, report: IngestReport },
}

/// Run one aggregation cycle against the least recently fetched feed
///
/// The feed is stamped before the network fetch, so when the fetch fails the
/// next cycle moves on to another feed. Per-item storage failures are counted
/// in the report; only selection, stamping and fetching surface as errors.
pub async fn scrape_next_feed<S, F>(store: &S, source: &F) -> Result<CycleOutcome>
where
    S: FeedStore + ?Sized,
    F: FeedSource + ?Sized,
{
    let Some(feed) = store.next_feed_to_fetch().await? else {
        tracing::debug!("No feed to fetch");
        return Ok(CycleOutcome::Idle);
    };

    store.mark_feed_fetched(feed.id).await?;

    tracing::info!("Fetching feed '{}' from {}", feed.name, feed.url);

    let doc = source.fetch(&feed.url).await.map_err(|e| Error::FeedFetch {
        feed: feed.name.clone(),
        source: Box::new(e),
    })?;

    let report = ingest(store, &feed, &doc).await;

    tracing::info!(
        "Feed '{}': {} new posts, {} already known, {} failed",
        feed.name,
        report.inserted,
        report.duplicates,
        report.failed + report.invalid
    );

    Ok(CycleOutcome::Ingested { feed, report })
}

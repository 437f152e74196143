use uuid::Uuid;

use super::pubdate::parse_pub_date;
use crate::feed::{Feed, NewPost, RawFeedItem, RssDocument};
use crate::storage::FeedStore;

/// What happened to the items of one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Items seen in the document
    pub processed: u32,
    /// Items stored as new posts
    pub inserted: u32,
    /// Items whose URL was already stored
    pub duplicates: u32,
    /// Items without a link to key them by
    pub invalid: u32,
    /// Items the store refused for any other reason
    pub failed: u32,
}

/// Turn a raw item into a post candidate
///
/// Returns `None` when the item has no link, since the link is the post's
/// identity.
pub fn build_post(feed_id: Uuid, item: &RawFeedItem) -> Option<NewPost> {
    let url = item.link.trim();
    if url.is_empty() {
        return None;
    }

    let title = match item.title.trim() {
        "" => "Untitled".to_string(),
        title => title.to_string(),
    };

    let description = match item.description.trim() {
        "" => None,
        description => Some(description.to_string()),
    };

    Some(NewPost {
        feed_id,
        title,
        url: url.to_string(),
        description,
        published_at: parse_pub_date(&item.pub_date),
    })
}

/// Store every item of `doc` as a post of `feed`, in document order
///
/// Known URLs are skipped quietly. Other storage failures are logged and
/// counted, and the remaining items are still attempted.
pub async fn ingest<S>(store: &S, feed: &Feed, doc: &RssDocument) -> IngestReport
where
    S: FeedStore + ?Sized,
{
    let mut report = IngestReport::default();

    for item in &doc.channel.items {
        report.processed += 1;

        let Some(post) = build_post(feed.id, item) else {
            tracing::warn!("Feed '{}': skipping item '{}' without a link", feed.name, item.title);
            report.invalid += 1;
            continue;
        };

        match store.create_post(&post).await {
            Ok(_) => report.inserted += 1,
            Err(e) if e.is_duplicate_post() => {
                tracing::debug!("Feed '{}': already have {}", feed.name, post.url);
                report.duplicates += 1;
            }
            Err(e) => {
                tracing::error!("Feed '{}': failed to store post '{}': {}", feed.name, post.title, e);
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::feed::{NewFeed, Post, RssChannel};
    use crate::storage::{Database, FeedRepository, PostRepository, UserRepository};
    use crate::{Error, Result};

    fn item(title: &str, link: &str, pub_date: &str) -> RawFeedItem {
        RawFeedItem {
            title: title.to_string(),
            link: link.to_string(),
            description: String::new(),
            pub_date: pub_date.to_string(),
        }
    }

    fn document(items: Vec<RawFeedItem>) -> RssDocument {
        RssDocument {
            channel: RssChannel {
                title: "X".to_string(),
                items,
                ..Default::default()
            },
        }
    }

    async fn setup() -> (Database, Feed) {
        let db = Database::new_in_memory().await.unwrap();
        let user = UserRepository::new(&db).create("lane").await.unwrap();
        let feed = FeedRepository::new(&db)
            .create(&NewFeed {
                url: "https://x/rss".to_string(),
                name: "x".to_string(),
                user_id: user.id,
            })
            .await
            .unwrap();
        (db, feed)
    }

    #[test]
    fn test_build_post_normalizes_fields() {
        let feed_id = Uuid::new_v4();
        let raw = RawFeedItem {
            title: "  Hello  ".to_string(),
            link: " https://x/a ".to_string(),
            description: "   ".to_string(),
            pub_date: "Mon, 02 Jan 2006 15:04:05 +0000".to_string(),
        };

        let post = build_post(feed_id, &raw).unwrap();
        assert_eq!(post.feed_id, feed_id);
        assert_eq!(post.title, "Hello");
        assert_eq!(post.url, "https://x/a");
        assert!(post.description.is_none());
        assert!(post.published_at.is_some());

        let described = RawFeedItem {
            description: "<p>Body</p>".to_string(),
            ..raw.clone()
        };
        assert_eq!(
            build_post(feed_id, &described).unwrap().description.as_deref(),
            Some("<p>Body</p>")
        );

        assert_eq!(build_post(feed_id, &item("", "https://x/b", "")).unwrap().title, "Untitled");
        assert!(build_post(feed_id, &item("No link", "  ", "")).is_none());
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let (db, feed) = setup().await;
        let doc = document(vec![
            item("A", "https://x/a", "Mon, 02 Jan 2006 15:04:05 -0700"),
            item("B", "https://x/b", ""),
        ]);

        let first = ingest(&db, &feed, &doc).await;
        assert_eq!(first.processed, 2);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.duplicates, 0);

        let second = ingest(&db, &feed, &doc).await;
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 2);
        assert_eq!(second.failed, 0);

        assert_eq!(PostRepository::new(&db).count_for_feed(feed.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_bad_dates_do_not_reject_items() {
        let (db, feed) = setup().await;
        let doc = document(vec![
            item("Empty", "https://x/empty", ""),
            item("Garbage", "https://x/garbage", "sometime last week"),
            item("Overflow", "https://x/overflow", "Fri, 31 Dec +262142 23:00:00 PST"),
        ]);

        let report = ingest(&db, &feed, &doc).await;
        assert_eq!(report.inserted, 3);

        let repo = PostRepository::new(&db);
        for url in ["https://x/empty", "https://x/garbage", "https://x/overflow"] {
            let post = repo.find_by_url(url).await.unwrap().unwrap();
            assert!(post.published_at.is_none());
        }
    }

    #[tokio::test]
    async fn test_duplicates_within_one_document() {
        let (db, feed) = setup().await;
        let doc = document(vec![
            item("First", "https://x/a", ""),
            item("Second", "https://x/a", ""),
            item("", "", ""),
        ]);

        let report = ingest(&db, &feed, &doc).await;
        assert_eq!(
            report,
            IngestReport {
                processed: 3,
                inserted: 1,
                duplicates: 1,
                invalid: 1,
                failed: 0,
            }
        );

        let stored = PostRepository::new(&db).find_by_url("https://x/a").await.unwrap().unwrap();
        assert_eq!(stored.title, "First");
    }

    /// Refuses one URL with a storage error and accepts everything else
    struct FlakyStore {
        broken_url: String,
        stored: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FeedStore for FlakyStore {
        async fn next_feed_to_fetch(&self) -> Result<Option<Feed>> {
            Ok(None)
        }

        async fn mark_feed_fetched(&self, _feed_id: Uuid) -> Result<()> {
            Ok(())
        }

        async fn create_post(&self, post: &NewPost) -> Result<Post> {
            if post.url == self.broken_url {
                return Err(Error::Database(sqlx::Error::PoolTimedOut));
            }
            self.stored.lock().unwrap().push(post.url.clone());
            Ok(Post {
                id: Uuid::new_v4(),
                feed_id: post.feed_id,
                title: post.title.clone(),
                url: post.url.clone(),
                description: post.description.clone(),
                published_at: post.published_at,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_storage_error_does_not_abort_batch() {
        let (_db, feed) = setup().await;
        let store = FlakyStore {
            broken_url: "https://x/b".to_string(),
            stored: Mutex::new(Vec::new()),
        };
        let doc = document(vec![
            item("A", "https://x/a", ""),
            item("B", "https://x/b", ""),
            item("C", "https://x/c", ""),
        ]);

        let report = ingest(&store, &feed, &doc).await;
        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(*store.stored.lock().unwrap(), vec!["https://x/a", "https://x/c"]);
    }
}

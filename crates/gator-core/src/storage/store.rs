use async_trait::async_trait;
use uuid::Uuid;

use super::{Database, FeedRepository, PostRepository};
use crate::feed::{Feed, NewPost, Post};
use crate::Result;

/// The slice of persistence the aggregation loop depends on
///
/// Selection and stamping are separate calls: a feed is stamped before its
/// fetch starts, so a failed or hung fetch still moves the rotation on.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// The never-fetched or least recently fetched feed, if any exist
    async fn next_feed_to_fetch(&self) -> Result<Option<Feed>>;

    /// Record that a fetch of this feed is starting now
    async fn mark_feed_fetched(&self, feed_id: Uuid) -> Result<()>;

    /// Store a post; a known URL fails with `Error::DuplicatePost`
    async fn create_post(&self, post: &NewPost) -> Result<Post>;
}

#[async_trait]
impl FeedStore for Database {
    async fn next_feed_to_fetch(&self) -> Result<Option<Feed>> {
        FeedRepository::new(self).next_to_fetch().await
    }

    async fn mark_feed_fetched(&self, feed_id: Uuid) -> Result<()> {
        FeedRepository::new(self).mark_fetched(feed_id).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        PostRepository::new(self).create(post).await
    }
}

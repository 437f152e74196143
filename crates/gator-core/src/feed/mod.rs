mod fetcher;
mod models;
mod parser;

pub use fetcher::{normalize_feed_url, FeedFetcher, FeedSource};
pub use models::{
    Feed, FeedFollow, FeedWithOwner, NewFeed, NewPost, Post, RawFeedItem, RssChannel, RssDocument,
};
pub use parser::parse_rss;

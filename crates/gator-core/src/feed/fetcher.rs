use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Proxy};
use url::Url;

use super::models::RssDocument;
use super::parser::parse_rss;
use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_FEED_BYTES: u64 = 5 * 1024 * 1024;
const ACCEPT_FEED: &str =
    "application/rss+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.5";

/// Canonical form of a user-supplied feed URL
///
/// Every command that stores or looks up a feed by URL goes through this, so
/// `https://Example.com` and `https://example.com/` name the same feed.
pub fn normalize_feed_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        scheme => Err(Error::InvalidInput(format!(
            "unsupported URL scheme '{}': {}",
            scheme, raw
        ))),
    }
}

/// Anything that can turn a feed URL into a parsed RSS document
///
/// The scheduler only talks to this trait, so a failing or canned source can
/// stand in for the network.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RssDocument>;
}

/// HTTP feed fetcher
///
/// Makes a single attempt per call. A failed fetch is retried only when the
/// scheduler comes back to the same feed.
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a new feed fetcher with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(
            config.sync.request_timeout_secs,
            &config.sync.user_agent,
            &config.sync.proxy_url,
        )?;

        Ok(Self { client })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, user_agent: &str, proxy_url: &Option<String>) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .default_headers(Self::build_headers())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        builder.build().map_err(Error::Http)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_FEED));
        headers
    }

    /// Fetch a feed's raw bytes
    pub async fn fetch_raw(&self, url: &str) -> Result<Bytes> {
        // Reject garbage before it reaches the HTTP client
        Url::parse(url)?;

        tracing::debug!("Fetching feed from: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {} for URL: {}", status, url)));
        }

        if let Some(length) = response.content_length() {
            ensure_content_size(length, url)?;
        }

        let bytes = response.bytes().await?;
        ensure_content_size(bytes.len() as u64, url)?;

        Ok(bytes)
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<RssDocument> {
        let content = self.fetch_raw(url).await?;
        parse_rss(&content)
    }
}

fn ensure_content_size(size: u64, url: &str) -> Result<()> {
    if size > MAX_FEED_BYTES {
        return Err(Error::Fetch(format!(
            "Feed too large ({} bytes) for URL: {}",
            size, url
        )));
    }
    Ok(())
}

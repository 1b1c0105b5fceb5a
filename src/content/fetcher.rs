//! Bounded-concurrency page fetching
//!
//! Retrieves candidate pages behind a per-request semaphore and reduces
//! them to clean text. A failed fetch degrades to an `ok=false` page and
//! is never retried within the request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::search::CandidateUrl;

use super::config::FetchConfig;
use super::extractor::extract_page_text;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page fetch error types
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Request timed out
    #[error("Timeout fetching: {0}")]
    Timeout(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// HTTP non-success status
    #[error("HTTP {0} for: {1}")]
    HttpStatus(u16, String),

    /// URL is unsafe (localhost, private IP, non-http scheme)
    #[error("Unsafe URL blocked: {0}")]
    UnsafeUrl(String),
}

/// One fetched (or failed) page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the page came from
    pub url: String,
    /// Clean extracted text; empty when `ok` is false
    pub text: String,
    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,
    /// Whether the fetch and extraction succeeded
    pub ok: bool,
}

impl FetchedPage {
    fn failed(url: &str) -> Self {
        Self {
            url: url.to_string(),
            text: String::new(),
            fetched_at: Utc::now(),
            ok: false,
        }
    }
}

/// Raw page retrieval, separated so tests can instrument it
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the body of `url`; only 2xx responses succeed
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Production page source backed by reqwest
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    /// Create a source with the given per-request timeout
    ///
    /// Uses a browser User-Agent and follows up to 5 redirects; several
    /// review hosts reject obvious bot agents.
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16(), url.to_string()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::HttpError(e.to_string()))
    }
}

/// Fetches candidate pages with bounded concurrency
pub struct PageFetcher {
    source: Arc<dyn PageSource>,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a fetcher backed by HTTP
    pub fn new(config: FetchConfig) -> Self {
        let source = Arc::new(HttpPageSource::new(config.fetch_timeout_secs));
        Self { source, config }
    }

    /// Create a fetcher with an explicit page source (used by tests)
    pub fn with_source(source: Arc<dyn PageSource>, config: FetchConfig) -> Self {
        Self { source, config }
    }

    /// Fetch the top-ranked candidates concurrently
    ///
    /// Only the first `max_pages` candidates are attempted; the rest are
    /// discarded. Concurrency is capped by a semaphore scoped to this
    /// batch. Results come back in rank order, failures included as
    /// `ok=false` pages.
    pub async fn fetch_all(&self, candidates: &[CandidateUrl]) -> Vec<FetchedPage> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));

        let fetches = candidates.iter().take(self.config.max_pages).map(|c| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return FetchedPage::failed(&c.url),
                };
                self.fetch_one(&c.url).await
            }
        });

        let pages = join_all(fetches).await;

        debug!(
            "Fetched {}/{} pages successfully",
            pages.iter().filter(|p| p.ok).count(),
            pages.len()
        );

        pages
    }

    async fn fetch_one(&self, url: &str) -> FetchedPage {
        if !is_safe_url(url) {
            warn!("Blocked unsafe URL: {}", url);
            return FetchedPage::failed(url);
        }

        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let html = match tokio::time::timeout(timeout, self.source.get(url)).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                warn!("Page fetch failed: {}", e);
                return FetchedPage::failed(url);
            }
            Err(_) => {
                warn!("Page fetch timed out: {}", url);
                return FetchedPage::failed(url);
            }
        };

        let text = extract_page_text(&html, self.config.max_chars_per_page);
        if text.is_empty() {
            return FetchedPage::failed(url);
        }

        FetchedPage {
            url: url.to_string(),
            text,
            fetched_at: Utc::now(),
            ok: true,
        }
    }
}

/// Check if a URL is safe to fetch (http/https, no localhost/private hosts)
pub fn is_safe_url(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    if !["http", "https"].contains(&parsed.scheme()) {
        return false;
    }

    match parsed.host_str() {
        Some(host) => !is_private_host(&host.to_lowercase()),
        None => false,
    }
}

fn is_private_host(host: &str) -> bool {
    if host == "localhost" || host == "0.0.0.0" || host.starts_with("127.") {
        return true;
    }
    if host.starts_with("192.168.") || host.starts_with("10.") || host.starts_with("169.254.") {
        return true;
    }
    // 172.16.0.0/12
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some((octet, _)) = rest.split_once('.') {
            if let Ok(n) = octet.parse::<u8>() {
                return (16..=31).contains(&n);
            }
        }
    }
    false
}

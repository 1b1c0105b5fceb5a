// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DuckDuckGo search provider
//!
//! Web search via DuckDuckGo's HTML interface. No API key required; this
//! is the free backend behind the reddit-scoped and fallback review
//! queries. Sensitive to anti-bot throttling, hence the browser
//! User-Agent and the aggregator-level backoff handling.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::provider::SearchProvider;
use super::types::{SearchError, SearchHit, SearchSource};

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// DuckDuckGo search provider (no API key required)
pub struct DuckDuckGoProvider {
    client: Client,
}

impl DuckDuckGoProvider {
    /// Create a new DuckDuckGo provider
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(DDG_HTML_URL)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout { timeout_ms: 10000 }
                } else {
                    SearchError::ApiError {
                        status: 0,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        // DDG throttles scrapers with a 202 challenge page
        if status == 429 || status == 202 {
            return Err(SearchError::RateLimited {
                retry_after_secs: 30,
            });
        }

        if !status.is_success() {
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: "DuckDuckGo request failed".to_string(),
            });
        }

        let html = response.text().await.map_err(|e| SearchError::ApiError {
            status: 0,
            message: e.to_string(),
        })?;

        Ok(parse_result_links(&html, num_results))
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    fn source(&self) -> SearchSource {
        SearchSource::DuckDuckGo
    }

    fn is_available(&self) -> bool {
        true // No API key needed
    }
}

/// Parse result links out of the DuckDuckGo HTML page
///
/// Results sit in `<a class="result__a" href="...">` anchors, with the
/// snippet in a sibling `result__snippet` anchor. Anchor hrefs are DDG
/// redirect URLs wrapping the target in a `uddg=` parameter.
fn parse_result_links(html: &str, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for block in html.split("class=\"result__a\"").skip(1) {
        if hits.len() >= max_results {
            break;
        }

        let Some(url) = anchor_href(block).map(unwrap_redirect) else {
            continue;
        };
        if url.is_empty() {
            continue;
        }

        let snippet = block
            .split_once("class=\"result__snippet\"")
            .and_then(|(_, rest)| rest.split_once('>'))
            .and_then(|(_, rest)| rest.split_once("</a>"))
            .map(|(text, _)| strip_tags(text))
            .filter(|s| !s.is_empty());

        hits.push(SearchHit { url, snippet });
    }

    hits
}

/// Extract the href attribute value from the first anchor in `block`
fn anchor_href(block: &str) -> Option<&str> {
    let (_, rest) = block.split_once("href=\"")?;
    let (href, _) = rest.split_once('"')?;
    Some(href)
}

/// Unwrap a DuckDuckGo redirect URL to the target it points at
///
/// Redirects look like `//duckduckgo.com/l/?uddg=https%3A%2F%2F...&rut=..`;
/// direct http(s) hrefs pass through unchanged.
fn unwrap_redirect(href: &str) -> String {
    if let Some((_, rest)) = href.split_once("uddg=") {
        let encoded = rest.split('&').next().unwrap_or(rest);
        percent_decode(encoded)
    } else if href.starts_with("http") {
        href.to_string()
    } else {
        String::new()
    }
}

/// Minimal percent-decoding for redirect targets
fn percent_decode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => out.push(byte as char),
                    Err(_) => {
                        out.push('%');
                        out.push_str(&hex);
                    }
                }
            }
            '+' => out.push(' '),
            _ => out.push(c),
        }
    }

    out
}

/// Strip tags and decode the few entities DDG snippets use
fn strip_tags(s: &str) -> String {
    let mut text = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search aggregation across providers
//!
//! Fans out review-shaped queries to the paid and free providers
//! concurrently, merges their hits in priority order with exact-URL
//! dedup, and degrades softly: provider failures cost results, never the
//! request.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::query::Query;

use super::config::SearchConfig;
use super::duckduckgo::DuckDuckGoProvider;
use super::provider::SearchProvider;
use super::serper::SerperProvider;
use super::types::{CandidateUrl, SearchHit, SearchSource};

/// Merges candidate URLs from the configured search providers
pub struct SearchAggregator {
    paid: Option<Arc<dyn SearchProvider>>,
    free: Arc<dyn SearchProvider>,
    config: SearchConfig,
}

impl SearchAggregator {
    /// Create an aggregator from configuration
    ///
    /// Serper is enabled when an API key is configured; DuckDuckGo is
    /// always available as the free backend.
    pub fn from_config(config: SearchConfig) -> Self {
        let paid: Option<Arc<dyn SearchProvider>> = match &config.serper_api_key {
            Some(key) => {
                debug!("Serper provider enabled");
                Some(Arc::new(SerperProvider::new(key.clone())))
            }
            None => None,
        };

        Self {
            paid,
            free: Arc::new(DuckDuckGoProvider::new()),
            config,
        }
    }

    /// Create an aggregator with explicit providers (used by tests)
    pub fn new(
        paid: Option<Arc<dyn SearchProvider>>,
        free: Arc<dyn SearchProvider>,
        config: SearchConfig,
    ) -> Self {
        Self { paid, free, config }
    }

    /// Collect candidate URLs for a product query
    ///
    /// Never fails: whatever providers respond within their timeouts is
    /// merged; an empty vector means the request degrades to the
    /// no-corpus path downstream.
    pub async fn search(&self, query: &Query) -> Vec<CandidateUrl> {
        let n = self.config.results_per_provider;
        let product = query.product_name();
        let paid_q = paid_query(product);
        let reddit_q = reddit_query(product);

        let paid_call = async {
            match &self.paid {
                Some(p) if p.is_available() => {
                    self.call_provider(p.as_ref(), &paid_q, n).await
                }
                _ => (Vec::new(), false),
            }
        };
        let free_call = self.call_provider(self.free.as_ref(), &reddit_q, n);

        let ((paid_hits, _), (mut free_hits, free_abandoned)) =
            tokio::join!(paid_call, free_call);

        // Sequential fallback when the free backend came back thin; the
        // backoff keeps the shared free tier under anti-bot thresholds.
        // An abandoned (rate-limited twice) provider is not called again
        // within this request.
        if !free_abandoned && free_hits.len() < self.config.free_target_hits {
            debug!(
                "Free provider returned {} hits (target {}), trying fallback query",
                free_hits.len(),
                self.config.free_target_hits
            );
            tokio::time::sleep(Duration::from_millis(self.config.fallback_backoff_ms)).await;
            let (extra, _) = self
                .call_provider(self.free.as_ref(), &fallback_query(product), n)
                .await;
            free_hits.extend(extra);
        }

        let paid_source = self
            .paid
            .as_ref()
            .map(|p| p.source())
            .unwrap_or(SearchSource::Serper);

        let candidates = merge_hits(vec![
            (paid_source, paid_hits),
            (self.free.source(), free_hits),
        ]);

        info!(
            "Search aggregation produced {} candidate URLs for '{}'",
            candidates.len(),
            product
        );

        candidates
    }

    /// Provider availability for the health endpoint
    pub fn provider_status(&self) -> Vec<(&'static str, bool)> {
        let paid = match &self.paid {
            Some(p) => (p.name(), p.is_available()),
            None => ("serper", false),
        };
        vec![paid, (self.free.name(), self.free.is_available())]
    }

    /// Call one provider with its timeout and rate-limit handling
    ///
    /// Returns the hits (empty on failure) and whether the provider was
    /// abandoned for the remainder of the request after its single
    /// rate-limit retry also failed.
    async fn call_provider(
        &self,
        provider: &dyn SearchProvider,
        query: &str,
        num_results: usize,
    ) -> (Vec<SearchHit>, bool) {
        let timeout = Duration::from_secs(self.config.provider_timeout_secs);

        let error = match tokio::time::timeout(timeout, provider.search(query, num_results)).await
        {
            Ok(Ok(hits)) => {
                debug!("Provider {} returned {} hits", provider.name(), hits.len());
                return (hits, false);
            }
            Ok(Err(e)) => e,
            Err(_) => {
                warn!(
                    "Search provider {} timed out after {}s",
                    provider.name(),
                    self.config.provider_timeout_secs
                );
                return (Vec::new(), false);
            }
        };

        if !error.is_rate_limited() {
            warn!("Search provider {} failed: {}", provider.name(), error);
            return (Vec::new(), false);
        }

        // Exactly one retry after a longer backoff, then abandon.
        warn!(
            "Search provider {} rate limited, retrying once: {}",
            provider.name(),
            error
        );
        tokio::time::sleep(Duration::from_millis(self.config.rate_limit_backoff_ms)).await;

        match tokio::time::timeout(timeout, provider.search(query, num_results)).await {
            Ok(Ok(hits)) => (hits, false),
            Ok(Err(e)) => {
                warn!(
                    "Search provider {} failed after rate-limit retry, abandoned: {}",
                    provider.name(),
                    e
                );
                (Vec::new(), true)
            }
            Err(_) => {
                warn!(
                    "Search provider {} timed out after rate-limit retry, abandoned",
                    provider.name()
                );
                (Vec::new(), true)
            }
        }
    }
}

/// Merge provider hit lists in priority order, deduplicating by exact URL
///
/// First-seen wins, so the paid provider's ordering ranks ahead without
/// excluding URLs only the free backend found.
fn merge_hits(groups: Vec<(SearchSource, Vec<SearchHit>)>) -> Vec<CandidateUrl> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    for (source, hits) in groups {
        for hit in hits {
            if seen.insert(hit.url.clone()) {
                candidates.push(CandidateUrl {
                    rank: candidates.len(),
                    url: hit.url,
                    source,
                });
            }
        }
    }

    candidates
}

/// Review-focused query for the paid keyword-search provider
fn paid_query(product: &str) -> String {
    format!("{} real user reviews pros and cons", product)
}

/// Reddit-scoped review query for the free provider
fn reddit_query(product: &str) -> String {
    format!("{} review site:reddit.com", product)
}

/// Korean-language fallback query widens coverage when English results run thin
fn fallback_query(product: &str) -> String {
    format!("{} 실사용 후기 단점", product)
}

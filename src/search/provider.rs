// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;

use super::types::{SearchError, SearchHit, SearchSource};

/// Trait for implementing search providers
///
/// The aggregator fans out to providers concurrently and merges their
/// results; a provider only has to turn one query string into hits.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a web search
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `num_results` - Maximum number of results to return
    ///
    /// # Returns
    /// A vector of hits or an error
    async fn search(&self, query: &str, num_results: usize)
        -> Result<Vec<SearchHit>, SearchError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;

    /// Which source tag the provider's hits carry
    fn source(&self) -> SearchSource;

    /// Check if the provider is usable (has API key, etc.)
    fn is_available(&self) -> bool;
}

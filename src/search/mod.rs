// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Review-source discovery
//!
//! Turns a product query into a ranked, deduplicated list of candidate
//! URLs by fanning out to search providers:
//! - Serper.dev (paid, priority ranking) when an API key is configured
//! - DuckDuckGo HTML (free) with a reddit-scoped review query, plus an
//!   alternate-language fallback when results run thin
//!
//! Providers fail independently; the aggregator never raises.

pub mod aggregator;
pub mod config;
pub mod duckduckgo;
pub mod provider;
pub mod serper;
pub mod types;

// Re-export commonly used types
pub use aggregator::SearchAggregator;
pub use config::SearchConfig;
pub use provider::SearchProvider;
pub use types::{CandidateUrl, SearchError, SearchHit, SearchSource};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for review-source discovery

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which backend produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Serper.dev keyword-search API (paid)
    Serper,
    /// DuckDuckGo HTML interface (free)
    DuckDuckGo,
}

impl SearchSource {
    /// Stable lowercase name for logs and the health endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serper => "serper",
            Self::DuckDuckGo => "duckduckgo",
        }
    }
}

/// A single raw hit from a search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// URL of the result
    pub url: String,
    /// Snippet/description if the provider supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A deduplicated, ranked page-fetch candidate
///
/// Produced by the aggregator's merge; lives only for one request.
#[derive(Debug, Clone)]
pub struct CandidateUrl {
    /// URL to fetch
    pub url: String,
    /// First provider that returned this URL
    pub source: SearchSource,
    /// Merge position; lower fetches first
    pub rank: usize,
}

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Rate limited by the search provider
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// API error from the search provider
    #[error("Search API error: {status} - {message}")]
    ApiError {
        /// HTTP status code (0 for transport errors)
        status: u16,
        /// Error message
        message: String,
    },

    /// Search request timed out
    #[error("Search timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// No API key configured for the provider
    #[error("No API key configured for {provider}")]
    NoApiKey {
        /// Name of the provider missing its key
        provider: &'static str,
    },
}

impl SearchError {
    /// Whether this failure signals provider-side rate limiting
    ///
    /// Detected by status code or by message substring, since free
    /// backends report throttling in the body rather than the status.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ApiError { status: 429, .. } => true,
            Self::ApiError { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("rate limit") || lower.contains("too many requests")
            }
            _ => false,
        }
    }
}

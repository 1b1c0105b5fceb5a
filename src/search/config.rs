// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for review-source discovery

use std::env;

/// Configuration for the search aggregation stage
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Serper.dev API key (paid provider disabled when absent)
    pub serper_api_key: Option<String>,
    /// Results requested from each provider
    pub results_per_provider: usize,
    /// Per-provider call timeout in seconds
    pub provider_timeout_secs: u64,
    /// Minimum free-provider hits before the fallback query is skipped
    pub free_target_hits: usize,
    /// Backoff before the sequential fallback query, in milliseconds
    pub fallback_backoff_ms: u64,
    /// Backoff before the single rate-limit retry, in milliseconds
    pub rate_limit_backoff_ms: u64,
}

impl SearchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            serper_api_key: env::var("SERPER_API_KEY").ok().filter(|k| !k.is_empty()),
            results_per_provider: env::var("SEARCH_RESULTS_PER_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
            provider_timeout_secs: env::var("SEARCH_PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            free_target_hits: env::var("SEARCH_FREE_TARGET_HITS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6),
            fallback_backoff_ms: env::var("SEARCH_FALLBACK_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            rate_limit_backoff_ms: env::var("SEARCH_RATE_LIMIT_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.results_per_provider == 0 {
            return Err("results_per_provider must be at least 1".to_string());
        }
        if self.provider_timeout_secs == 0 {
            return Err("provider_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            serper_api_key: None,
            results_per_provider: 6,
            provider_timeout_secs: 10,
            free_target_hits: 6,
            fallback_backoff_ms: 2000,
            rate_limit_backoff_ms: 5000,
        }
    }
}

//! Configuration for page fetching and corpus assembly

use std::env;

/// Configuration for page fetching
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum candidate URLs attempted per request (default: 10)
    pub max_pages: usize,
    /// Maximum concurrent in-flight fetches (default: 5)
    pub max_concurrent: usize,
    /// Per-fetch timeout in seconds (default: 15)
    pub fetch_timeout_secs: u64,
    /// Maximum characters kept per page (default: 2500)
    pub max_chars_per_page: usize,
}

impl FetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            max_pages: env::var("FETCH_MAX_PAGES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10)
                .min(12),
            max_concurrent: env::var("FETCH_MAX_CONCURRENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            max_chars_per_page: env::var("FETCH_MAX_CHARS_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2500),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pages == 0 {
            return Err("max_pages must be at least 1".to_string());
        }
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be at least 1".to_string());
        }
        if self.max_chars_per_page < 100 {
            return Err("max_chars_per_page must be at least 100".to_string());
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_concurrent: 5,
            fetch_timeout_secs: 15,
            max_chars_per_page: 2500,
        }
    }
}

/// Configuration for corpus assembly
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Total character budget across all pages (default: 15000)
    pub max_total_chars: usize,
    /// Minimum page text length; shorter texts are treated as noise (default: 60)
    pub min_page_chars: usize,
    /// Require product-name keyword overlap before including a page
    pub strict_relevance: bool,
    /// Fraction of product-name tokens that must appear in strict mode (default: 0.7)
    pub min_token_overlap: f64,
}

impl CorpusConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            max_total_chars: env::var("CORPUS_MAX_TOTAL_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15000),
            min_page_chars: env::var("CORPUS_MIN_PAGE_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            strict_relevance: env::var("CORPUS_STRICT_RELEVANCE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            min_token_overlap: env::var("CORPUS_MIN_TOKEN_OVERLAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.7),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_total_chars < 1000 {
            return Err("max_total_chars must be at least 1000".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_token_overlap) {
            return Err("min_token_overlap must be between 0 and 1".to_string());
        }
        Ok(())
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            max_total_chars: 15000,
            min_page_chars: 60,
            strict_relevance: false,
            min_token_overlap: 0.7,
        }
    }
}

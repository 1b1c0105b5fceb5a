// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Serper.dev search provider
//!
//! Keyword search over Google results via the Serper API. The paid,
//! highest-quality provider; its hits rank ahead of the free backends.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::provider::SearchProvider;
use super::types::{SearchError, SearchHit, SearchSource};

const SERPER_API_URL: &str = "https://google.serper.dev/search";

/// Serper.dev search provider
pub struct SerperProvider {
    api_key: String,
    client: Client,
}

impl SerperProvider {
    /// Create a new Serper provider
    ///
    /// # Arguments
    /// * `api_key` - Serper API key
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { api_key, client }
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(SERPER_API_URL)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&json!({ "q": query, "num": num_results.min(10) }))
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

        if status == 429 {
            return Err(SearchError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if status == 401 || status == 403 {
            return Err(SearchError::NoApiKey { provider: "serper" });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: SerperResponse = response.json().await.map_err(|e| SearchError::ApiError {
            status: 0,
            message: format!("JSON parse error: {}", e),
        })?;

        // Organic results carry `link`; entries without one are skipped
        Ok(data
            .organic
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| {
                r.link.map(|link| SearchHit {
                    url: link,
                    snippet: r.snippet,
                })
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "serper"
    }

    fn source(&self) -> SearchSource {
        SearchSource::Serper
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    organic: Option<Vec<SerperResult>>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    link: Option<String>,
    snippet: Option<String>,
}

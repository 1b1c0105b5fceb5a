// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared mock collaborators for the pipeline test suite

use async_trait::async_trait;
use fabstir_review_node::analysis::{
    AiError, AiProvider, AnalysisOrchestrator, Generation,
};
use fabstir_review_node::api::{ProgressEvent, ProgressSender};
use fabstir_review_node::cache::ResultCache;
use fabstir_review_node::content::{
    CorpusConfig, FetchConfig, FetchError, PageFetcher, PageSource,
};
use fabstir_review_node::pipeline::Pipeline;
use fabstir_review_node::query::Query;
use fabstir_review_node::search::{
    SearchAggregator, SearchConfig, SearchError, SearchHit, SearchProvider, SearchSource,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Search provider returning a fixed hit list, counting its calls
pub struct StaticSearchProvider {
    pub hits: Vec<SearchHit>,
    pub calls: Arc<AtomicUsize>,
}

impl StaticSearchProvider {
    pub fn new(urls: &[&str]) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(Self {
            hits: urls
                .iter()
                .map(|u| SearchHit {
                    url: u.to_string(),
                    snippet: None,
                })
                .collect(),
            calls: calls.clone(),
        });
        (provider, calls)
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    async fn search(
        &self,
        _query: &str,
        _num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }

    fn source(&self) -> SearchSource {
        SearchSource::DuckDuckGo
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Page source serving a fixed url -> html map; unknown urls 404
pub struct MapPageSource {
    pub pages: HashMap<String, String>,
}

impl MapPageSource {
    pub fn new(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, body)| {
                    (
                        url.to_string(),
                        format!("<html><body><p>{}</p></body></html>", body),
                    )
                })
                .collect(),
        })
    }
}

#[async_trait]
impl PageSource for MapPageSource {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus(404, url.to_string()))
    }
}

/// Page source tracking the maximum number of concurrent in-flight calls
pub struct CountingPageSource {
    pub in_flight: AtomicUsize,
    pub max_in_flight: Arc<AtomicUsize>,
    pub total_calls: AtomicUsize,
}

impl CountingPageSource {
    pub fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: max_in_flight.clone(),
            total_calls: AtomicUsize::new(0),
        });
        (source, max_in_flight)
    }
}

#[async_trait]
impl PageSource for CountingPageSource {
    async fn get(&self, _url: &str) -> Result<String, FetchError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!(
            "<html><body><p>{}</p></body></html>",
            "a synthetic review body long enough to clear the corpus noise \
             threshold, with several sentences of plausible reviewer detail"
        ))
    }
}

/// AI provider with a fixed outcome, recording calls and prompts
pub struct StubAi {
    pub name: &'static str,
    pub response: Option<String>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl StubAi {
    pub fn succeeding(
        name: &'static str,
        text: &str,
        calls: Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: Some(text.to_string()),
            calls,
            prompts: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn failing(name: &'static str, calls: Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: None,
            calls,
            prompts: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for StubAi {
    async fn generate(&self, prompt: &str) -> Result<Generation, AiError> {
        self.calls.lock().unwrap().push(self.name);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.response {
            Some(text) => Ok(Generation {
                text: text.clone(),
                model: format!("{}-model", self.name),
            }),
            None => Err(AiError::ApiError {
                status: 500,
                message: "provider down".to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Search config with backoffs collapsed and the fallback ladder disabled
pub fn test_search_config() -> SearchConfig {
    SearchConfig {
        free_target_hits: 0,
        fallback_backoff_ms: 1,
        rate_limit_backoff_ms: 1,
        ..SearchConfig::default()
    }
}

/// Assemble a pipeline from mock collaborators
pub fn build_pipeline(
    search: Arc<dyn SearchProvider>,
    source: Arc<dyn PageSource>,
    ai: Vec<Arc<dyn AiProvider>>,
    cache: Arc<ResultCache>,
) -> Pipeline {
    build_pipeline_with_fetch_config(search, source, ai, cache, FetchConfig::default())
}

/// Assemble a pipeline with an explicit fetch configuration
pub fn build_pipeline_with_fetch_config(
    search: Arc<dyn SearchProvider>,
    source: Arc<dyn PageSource>,
    ai: Vec<Arc<dyn AiProvider>>,
    cache: Arc<ResultCache>,
    fetch_config: FetchConfig,
) -> Pipeline {
    Pipeline::new(
        SearchAggregator::new(None, search, test_search_config()),
        PageFetcher::with_source(source, fetch_config),
        AnalysisOrchestrator::new(ai, 5),
        cache,
        CorpusConfig::default(),
    )
}

/// Run the pipeline for `product` and collect every emitted event
pub async fn collect_events(pipeline: &Pipeline, product: &str) -> Vec<ProgressEvent> {
    let query = Query::parse(product).unwrap();
    let (progress, mut rx) = ProgressSender::channel(32);

    pipeline.run(query, progress).await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

/// A review body long enough to clear the corpus noise threshold
pub fn review_body(detail: &str) -> String {
    format!(
        "Longtime owners report that the product {} and overall holds up well \
         after months of daily use according to multiple reviews.",
        detail
    )
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_review_node::{
    analysis::{AnalysisConfig, AnalysisOrchestrator},
    api::{self, ApiConfig, AppState},
    cache::{ResultCache, DEFAULT_CAPACITY, DEFAULT_TTL_SECS},
    content::{CorpusConfig, FetchConfig, PageFetcher},
    pipeline::Pipeline,
    search::{SearchAggregator, SearchConfig},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("🚀 Starting Fabstir Review Node...");
    println!("📦 Version: {}\n", env!("CARGO_PKG_VERSION"));

    let search_config = SearchConfig::from_env();
    let fetch_config = FetchConfig::from_env();
    let corpus_config = CorpusConfig::from_env();
    let analysis_config = AnalysisConfig::from_env();
    let api_config = ApiConfig::from_env();

    for result in [
        search_config.validate(),
        fetch_config.validate(),
        corpus_config.validate(),
        analysis_config.validate(),
    ] {
        if let Err(e) = result {
            anyhow::bail!("Invalid configuration: {}", e);
        }
    }

    if !analysis_config.has_any_provider() {
        warn!("No AI provider API key configured; every analysis will fail");
    }
    if search_config.serper_api_key.is_none() {
        warn!("SERPER_API_KEY not set; running on free search providers only");
    }

    let cache = Arc::new(ResultCache::new(
        Duration::from_secs(DEFAULT_TTL_SECS),
        DEFAULT_CAPACITY,
    ));

    let pipeline = Arc::new(Pipeline::new(
        SearchAggregator::from_config(search_config),
        PageFetcher::new(fetch_config),
        AnalysisOrchestrator::from_config(&analysis_config),
        cache.clone(),
        corpus_config,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], api_config.port));
    let state = Arc::new(AppState::new(pipeline, cache, &api_config));

    api::serve(state, addr).await
}

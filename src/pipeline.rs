// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request analysis pipeline
//!
//! Drives one request end to end: cache lookup, search aggregation, page
//! fetching, corpus assembly, AI analysis, cache insertion — emitting
//! progress events throughout. A failed progress send means the client
//! disconnected, and the remaining stages are skipped.

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::{AnalysisOrchestrator, SourceKind};
use crate::api::progress::ProgressSender;
use crate::cache::ResultCache;
use crate::content::{corpus, CorpusConfig, PageFetcher};
use crate::query::Query;
use crate::search::SearchAggregator;

/// Fixed terminal error message; vendor error text never reaches clients
const EXHAUSTED_MESSAGE: &str =
    "All AI providers are currently unavailable. Please try again later.";

/// The per-request analysis driver
///
/// Holds the shared stage components; each request runs on its own task
/// with its own progress sender.
pub struct Pipeline {
    aggregator: SearchAggregator,
    fetcher: PageFetcher,
    orchestrator: AnalysisOrchestrator,
    cache: Arc<ResultCache>,
    corpus_config: CorpusConfig,
}

impl Pipeline {
    /// Assemble a pipeline from its stage components
    pub fn new(
        aggregator: SearchAggregator,
        fetcher: PageFetcher,
        orchestrator: AnalysisOrchestrator,
        cache: Arc<ResultCache>,
        corpus_config: CorpusConfig,
    ) -> Self {
        Self {
            aggregator,
            fetcher,
            orchestrator,
            cache,
            corpus_config,
        }
    }

    /// Run one analysis request to its terminal event
    ///
    /// Emits exactly one terminal event: 100% with the answer, or -1 with
    /// `error` when the AI chain is exhausted. Early returns mean the
    /// client went away and nobody is listening.
    pub async fn run(&self, query: Query, mut progress: ProgressSender) {
        let request_id = Uuid::new_v4();
        info!(
            "[{}] Analysis request for '{}'",
            request_id,
            query.product_name()
        );

        if !progress.stage(5, "🔎 Checking cached analyses...").await {
            return;
        }

        if let Some(cached) = self.cache.get(query.normalized_key()) {
            info!("[{}] Cache hit for '{}'", request_id, query.normalized_key());
            progress
                .done(
                    format!("✅ Analysis loaded from cache ({})", cached.model_used),
                    cached.text,
                )
                .await;
            return;
        }

        if !progress
            .stage(20, "🌐 Scanning search providers for review sources...")
            .await
        {
            return;
        }

        let candidates = self.aggregator.search(&query).await;

        if !progress
            .stage(
                50,
                format!(
                    "📦 Extracting content from {} candidate sources...",
                    candidates.len()
                ),
            )
            .await
        {
            return;
        }

        let pages = self.fetcher.fetch_all(&candidates).await;
        let corpus = corpus::build(&pages, &query, &self.corpus_config);

        if corpus.is_empty() {
            info!(
                "[{}] Empty corpus, degrading to model-knowledge analysis",
                request_id
            );
        }

        if !progress
            .stage(80, "🧠 Generating the review analysis report...")
            .await
        {
            return;
        }

        match self.orchestrator.analyze(&query, &corpus).await {
            Ok(result) => {
                // Knowledge-only results are not tied to fresh web
                // evidence and are never cached.
                if result.source_kind == SourceKind::Corpus {
                    self.cache.put(query.normalized_key(), result.clone());
                }

                info!(
                    "[{}] Analysis complete via {} ({} sources)",
                    request_id,
                    result.model_used,
                    corpus.source_count()
                );
                progress
                    .done(
                        format!("✅ Analysis complete ({})", result.model_used),
                        result.text,
                    )
                    .await;
            }
            Err(e) => {
                error!("[{}] Analysis failed: {}", request_id, e);
                progress.failed(EXHAUSTED_MESSAGE).await;
            }
        }
    }

    /// Search provider availability for the health endpoint
    pub fn search_status(&self) -> Vec<(&'static str, bool)> {
        self.aggregator.provider_status()
    }

    /// AI provider availability for the health endpoint
    pub fn ai_status(&self) -> Vec<(&'static str, bool)> {
        self.orchestrator.provider_status()
    }

    /// True when at least one AI provider can serve requests
    pub fn any_ai_available(&self) -> bool {
        self.orchestrator.any_available()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AI analysis orchestration
//!
//! Builds the analysis prompt and drives the provider fallback chain:
//! providers are tried strictly in priority order, every failure class
//! advances to the next, and only full-chain exhaustion surfaces as an
//! error.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::content::Corpus;
use crate::query::Query;

use super::config::AnalysisConfig;
use super::gemini::GeminiProvider;
use super::openai_compat::OpenAiCompatProvider;
use super::provider::AiProvider;
use super::types::{AnalysisError, AnalysisResult, SourceKind};

/// Marker embedded in the prompt when no corpus could be assembled
pub const NO_EXTERNAL_DATA_MARKER: &str = "[no external review data]";

/// Drives the AI provider fallback chain
pub struct AnalysisOrchestrator {
    providers: Vec<Arc<dyn AiProvider>>,
    timeout: Duration,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator with explicit providers in priority order
    pub fn new(providers: Vec<Arc<dyn AiProvider>>, timeout_secs: u64) -> Self {
        Self {
            providers,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Create an orchestrator from configuration
    ///
    /// Chain order is fixed: Gemini, then Groq, then OpenRouter.
    /// Providers without keys are constructed but report unavailable, so
    /// the health endpoint can still list them.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let providers: Vec<Arc<dyn AiProvider>> = vec![
            Arc::new(GeminiProvider::new(
                config.gemini_api_key.clone().unwrap_or_default(),
                config.gemini_model.clone(),
            )),
            Arc::new(OpenAiCompatProvider::groq(
                config.groq_api_key.clone().unwrap_or_default(),
                config.groq_model.clone(),
            )),
            Arc::new(OpenAiCompatProvider::openrouter(
                config.openrouter_api_key.clone().unwrap_or_default(),
                config.openrouter_model.clone(),
            )),
        ];

        Self::new(providers, config.generate_timeout_secs)
    }

    /// Produce the analysis for a query and its corpus
    ///
    /// # Returns
    /// The first successful provider's result, or
    /// [`AnalysisError::AllProvidersExhausted`] when every provider fails.
    pub async fn analyze(
        &self,
        query: &Query,
        corpus: &Corpus,
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = build_prompt(query, corpus);
        let source_kind = if corpus.is_empty() {
            SourceKind::ModelKnowledge
        } else {
            SourceKind::Corpus
        };

        for provider in &self.providers {
            if !provider.is_available() {
                debug!("Skipping unavailable AI provider: {}", provider.name());
                continue;
            }

            debug!("Trying AI provider: {}", provider.name());

            match tokio::time::timeout(self.timeout, provider.generate(&prompt)).await {
                Ok(Ok(generation)) => {
                    info!(
                        "Analysis complete via {} ({} chars)",
                        provider.name(),
                        generation.text.len()
                    );
                    return Ok(AnalysisResult {
                        model_used: generation.model,
                        text: generation.text,
                        source_kind,
                    });
                }
                Ok(Err(e)) => {
                    warn!(
                        "AI provider {} failed: {}, trying next",
                        provider.name(),
                        e
                    );
                }
                Err(_) => {
                    warn!(
                        "AI provider {} timed out after {}s, trying next",
                        provider.name(),
                        self.timeout.as_secs()
                    );
                }
            }
        }

        Err(AnalysisError::AllProvidersExhausted)
    }

    /// Provider availability for the health endpoint
    pub fn provider_status(&self) -> Vec<(&'static str, bool)> {
        self.providers
            .iter()
            .map(|p| (p.name(), p.is_available()))
            .collect()
    }

    /// True when at least one provider can be called
    pub fn any_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }
}

/// Build the analysis prompt
///
/// Embeds the corpus, or the no-external-data marker with instructions to
/// flag the whole report as model knowledge.
fn build_prompt(query: &Query, corpus: &Corpus) -> String {
    let instructions = format!(
        "Summarize what real users report about the product '{}'. \
         Ignore advertising copy and sponsored content, and ignore mentions of \
         other or similarly named products. Write an objective report of the \
         genuine complaints and praise, and end with an overall rating from 1 to 10.",
        query.product_name()
    );

    if corpus.is_empty() {
        format!(
            "{}\n\nReview data:\n{}\n\nNo external review data could be collected \
             for this request. Answer from your own knowledge of the product, and \
             state clearly that the report is based on model knowledge rather than \
             fresh user reviews.",
            instructions, NO_EXTERNAL_DATA_MARKER
        )
    } else {
        format!("{}\n\nReview data:\n{}", instructions, corpus.text())
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for AI analysis

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether an analysis was grounded in fetched evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Grounded in the fetched review corpus
    Corpus,
    /// Produced from model knowledge alone (empty corpus)
    ModelKnowledge,
}

/// The final analysis for one product query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Model identifier of the provider that succeeded
    pub model_used: String,
    /// The analysis text
    pub text: String,
    /// Evidence grounding of the analysis
    pub source_kind: SourceKind,
}

/// Raw output of one successful provider call
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text
    pub text: String,
    /// Model identifier, for observability
    pub model: String,
}

/// Errors from a single AI provider call
///
/// Every variant classifies as "advance to the next provider"; none abort
/// the fallback chain.
#[derive(Debug, Error)]
pub enum AiError {
    /// API error from the provider
    #[error("AI API error: {status} - {message}")]
    ApiError {
        /// HTTP status code (0 for transport errors)
        status: u16,
        /// Error message
        message: String,
    },

    /// Response arrived but carried no usable text
    ///
    /// Covers missing nested fields and moderation/safety rejections.
    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse {
        /// Provider that produced the response
        provider: &'static str,
        /// What was missing or rejected
        reason: String,
    },

    /// No API key configured for the provider
    #[error("No API key configured for {provider}")]
    NoApiKey {
        /// Provider missing its key
        provider: &'static str,
    },
}

/// Errors from the analysis orchestration
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Every configured AI provider failed
    #[error("All AI providers exhausted")]
    AllProvidersExhausted,
}

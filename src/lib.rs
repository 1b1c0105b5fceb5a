// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod cache;
pub mod content;
pub mod pipeline;
pub mod query;
pub mod search;

// Re-export main types
pub use analysis::{
    AiProvider, AnalysisConfig, AnalysisError, AnalysisOrchestrator, AnalysisResult, SourceKind,
};
pub use api::{ApiConfig, AppState, ProgressEvent, ProgressSender, RateLimiter};
pub use cache::ResultCache;
pub use content::{CorpusConfig, FetchConfig, FetchedPage, PageFetcher, PageSource};
pub use pipeline::Pipeline;
pub use query::{Query, ValidationError};
pub use search::{CandidateUrl, SearchAggregator, SearchConfig, SearchProvider};

//! Page content acquisition and corpus assembly
//!
//! Turns ranked candidate URLs into the bounded evidence corpus:
//!
//! ```text
//! CandidateUrls → PageFetcher → HTML → extractor → clean text
//!                                                     ↓
//!                                       corpus::build → Corpus
//! ```
//!
//! Fetching is semaphore-bounded per request batch; failures degrade to
//! `ok=false` pages that the corpus builder skips.

pub mod config;
pub mod corpus;
pub mod extractor;
pub mod fetcher;

pub use config::{CorpusConfig, FetchConfig};
pub use corpus::Corpus;
pub use extractor::extract_page_text;
pub use fetcher::{FetchError, FetchedPage, HttpPageSource, PageFetcher, PageSource};

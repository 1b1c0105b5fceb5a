//! Corpus assembly from fetched pages
//!
//! Selects usable page texts and concatenates them, labeled per source,
//! into one bounded evidence blob for the analysis prompt.

use tracing::debug;

use crate::query::Query;

use super::config::CorpusConfig;
use super::fetcher::FetchedPage;

/// The bounded, concatenated evidence for one analysis request
///
/// Immutable after construction. An empty corpus is a recognized degraded
/// mode: the orchestrator falls back to the model-knowledge prompt path.
#[derive(Debug, Clone)]
pub struct Corpus {
    text: String,
    source_count: usize,
}

impl Corpus {
    /// The concatenated evidence text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of pages that contributed
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// True when no page survived filtering
    pub fn is_empty(&self) -> bool {
        self.source_count == 0
    }
}

/// Build the corpus from fetched pages
///
/// Pages are taken in rank order. A page is excluded when it failed, is
/// shorter than the noise threshold, or (in strict mode) shows too little
/// product-name keyword overlap. Each accepted text is truncated to the
/// remaining total budget; once the budget is exhausted later pages are
/// dropped entirely.
pub fn build(pages: &[FetchedPage], query: &Query, config: &CorpusConfig) -> Corpus {
    let mut text = String::new();
    let mut source_count = 0;

    for page in pages {
        if !page.ok {
            continue;
        }
        if page.text.chars().count() < config.min_page_chars {
            debug!("Skipping noise page ({} chars): {}", page.text.len(), page.url);
            continue;
        }
        if config.strict_relevance && !is_relevant(&page.text, query, config.min_token_overlap) {
            debug!("Skipping off-target page: {}", page.url);
            continue;
        }

        let used = text.chars().count();
        if used >= config.max_total_chars {
            break;
        }

        let label = format!("[source {}] ", source_count + 1);
        let separator = if text.is_empty() { "" } else { "\n\n" };
        let overhead = label.chars().count() + separator.chars().count();
        let remaining = config.max_total_chars - used;
        if remaining <= overhead {
            break;
        }

        let fragment: String = page.text.chars().take(remaining - overhead).collect();
        text.push_str(separator);
        text.push_str(&label);
        text.push_str(&fragment);
        source_count += 1;
    }

    debug!(
        "Corpus built from {} sources, {} chars",
        source_count,
        text.chars().count()
    );

    Corpus { text, source_count }
}

/// Keyword-overlap relevance check
///
/// Accepts a page when at least `min_overlap` of the product-name tokens
/// appear in its text. Catches off-target pages about similarly-named
/// models without requiring the exact full name.
fn is_relevant(page_text: &str, query: &Query, min_overlap: f64) -> bool {
    let tokens = query.name_tokens();
    if tokens.is_empty() {
        return true;
    }

    let haystack = page_text.to_lowercase();
    let present = tokens.iter().filter(|t| haystack.contains(**t)).count();

    (present as f64 / tokens.len() as f64) >= min_overlap
}

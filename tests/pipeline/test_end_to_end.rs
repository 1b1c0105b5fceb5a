// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end pipeline scenarios with mock collaborators

use super::common::*;
use fabstir_review_node::analysis::{AiProvider, NO_EXTERNAL_DATA_MARKER};
use fabstir_review_node::cache::ResultCache;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fresh_cache() -> Arc<ResultCache> {
    Arc::new(ResultCache::new(Duration::from_secs(3600), 100))
}

#[tokio::test]
async fn test_happy_path_produces_answer_from_fetched_corpus() {
    let (search, _) = StaticSearchProvider::new(&[
        "https://a.example.com/review",
        "https://b.example.com/review",
        "https://c.example.com/review",
    ]);
    // Two of three candidates fetch successfully
    let source = MapPageSource::new(&[
        ("https://a.example.com/review", &review_body("has great battery life")),
        ("https://b.example.com/review", &review_body("suffers from app sync issues")),
    ]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "Verdict: 8/10, well liked.", calls);

    let pipeline = build_pipeline(search, source, vec![ai.clone()], fresh_cache());
    let events = collect_events(&pipeline, "Widget X200").await;

    let last = events.last().unwrap();
    assert_eq!(last.p, 100);
    assert_eq!(last.answer.as_deref(), Some("Verdict: 8/10, well liked."));
    assert!(events.iter().all(|e| e.p != -1));

    // The prompt embedded both fetched sources, not the marker
    let prompts = ai.seen_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[source 1]"));
    assert!(prompts[0].contains("[source 2]"));
    assert!(prompts[0].contains("battery life"));
    assert!(!prompts[0].contains(NO_EXTERNAL_DATA_MARKER));
}

#[tokio::test]
async fn test_zero_search_results_degrades_to_model_knowledge() {
    let (search, _) = StaticSearchProvider::new(&[]);
    let source = MapPageSource::new(&[]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "From what I know: solid device.", calls);
    let cache = fresh_cache();

    let pipeline = build_pipeline(search, source, vec![ai.clone()], cache.clone());
    let events = collect_events(&pipeline, "Widget X200").await;

    // The chain still runs and succeeds on the no-external-data prompt
    let last = events.last().unwrap();
    assert_eq!(last.p, 100);
    assert_eq!(last.answer.as_deref(), Some("From what I know: solid device."));

    let prompts = ai.seen_prompts();
    assert!(prompts[0].contains(NO_EXTERNAL_DATA_MARKER));

    // Knowledge-only results are never cached
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_all_ai_providers_failing_yields_error_terminal() {
    let (search, _) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("works"))]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Arc<dyn AiProvider>> = vec![
        StubAi::failing("first", calls.clone()),
        StubAi::failing("second", calls.clone()),
    ];
    let cache = fresh_cache();

    let pipeline = build_pipeline(search, source, providers, cache.clone());
    let events = collect_events(&pipeline, "Widget X200").await;

    let last = events.last().unwrap();
    assert_eq!(last.p, -1);
    assert_eq!(last.error, Some(true));
    assert!(last.answer.is_none());

    // Both providers were tried before giving up; nothing was cached
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_fallback_reports_the_provider_that_succeeded() {
    let (search, _) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("is fine"))]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Arc<dyn AiProvider>> = vec![
        StubAi::failing("first", calls.clone()),
        StubAi::succeeding("second", "Backup provider verdict: 7/10.", calls.clone()),
    ];

    let pipeline = build_pipeline(search, source, providers, fresh_cache());
    let events = collect_events(&pipeline, "Widget X200").await;

    let last = events.last().unwrap();
    assert_eq!(last.answer.as_deref(), Some("Backup provider verdict: 7/10."));
    // Completion message names the successful provider's model
    assert!(last.m.contains("second-model"));
    // Strict invocation order: first before second
    assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn test_failed_fetches_do_not_fail_the_request() {
    // Search finds candidates but every fetch 404s
    let (search, _) = StaticSearchProvider::new(&[
        "https://gone.example.com/a",
        "https://gone.example.com/b",
    ]);
    let source = MapPageSource::new(&[]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "Model-knowledge verdict.", calls);

    let pipeline = build_pipeline(search, source, vec![ai.clone()], fresh_cache());
    let events = collect_events(&pipeline, "Widget X200").await;

    assert_eq!(events.last().unwrap().p, 100);
    // No page survived, so the prompt fell back to the marker
    assert!(ai.seen_prompts()[0].contains(NO_EXTERNAL_DATA_MARKER));
}

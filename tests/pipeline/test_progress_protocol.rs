// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Progress stream ordering and terminal-event guarantees

use super::common::*;
use fabstir_review_node::analysis::AiProvider;
use fabstir_review_node::cache::ResultCache;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fresh_cache() -> Arc<ResultCache> {
    Arc::new(ResultCache::new(Duration::from_secs(3600), 100))
}

fn assert_single_terminal(events: &[fabstir_review_node::api::ProgressEvent]) {
    let terminal_count = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminal_count, 1, "expected exactly one terminal event");
    assert!(
        events.last().unwrap().is_terminal(),
        "terminal event must be last"
    );
}

#[tokio::test]
async fn test_success_stream_is_monotonic_with_single_terminal() {
    let (search, _) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("is good"))]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "Report.", calls);

    let pipeline = build_pipeline(search, source, vec![ai], fresh_cache());
    let events = collect_events(&pipeline, "Widget X200").await;

    assert!(events.len() >= 3);
    assert_single_terminal(&events);

    let percents: Vec<i32> = events.iter().map(|e| e.p).collect();
    for pair in percents.windows(2) {
        assert!(pair[1] >= pair[0], "percent regressed: {:?}", percents);
    }
}

#[tokio::test]
async fn test_error_stream_ends_with_sentinel_only() {
    let (search, _) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("works"))]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let providers: Vec<Arc<dyn AiProvider>> = vec![StubAi::failing("only", calls)];

    let pipeline = build_pipeline(search, source, providers, fresh_cache());
    let events = collect_events(&pipeline, "Widget X200").await;

    assert_single_terminal(&events);
    let last = events.last().unwrap();
    assert_eq!(last.p, -1);
    assert_eq!(last.error, Some(true));

    // All intermediate events are still monotonic non-negative percents
    for event in &events[..events.len() - 1] {
        assert!(event.p >= 0);
        assert!(event.error.is_none());
    }
}

#[tokio::test]
async fn test_cache_hit_emits_exactly_two_events() {
    let (search, _) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("is solid"))]);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "Cached verdict.", calls);
    let cache = fresh_cache();

    let pipeline = build_pipeline(search, source, vec![ai], cache);

    // Prime the cache with a full cycle
    let first = collect_events(&pipeline, "Widget X200").await;
    assert_eq!(first.last().unwrap().p, 100);

    // Second run: one low-percent cache event plus the terminal
    let second = collect_events(&pipeline, "Widget X200").await;
    assert_eq!(second.len(), 2);
    assert!(second[0].p < 100);
    assert_eq!(second[1].p, 100);
    assert_eq!(second[1].answer.as_deref(), Some("Cached verdict."));
}

#[tokio::test]
async fn test_disconnected_client_aborts_pipeline() {
    use fabstir_review_node::api::ProgressSender;
    use fabstir_review_node::query::Query;

    let (search, search_calls) = StaticSearchProvider::new(&["https://a.example.com/"]);
    let source = MapPageSource::new(&[("https://a.example.com/", &review_body("fine"))]);
    let ai_calls = Arc::new(Mutex::new(Vec::new()));
    let ai = StubAi::succeeding("primary", "Report.", ai_calls.clone());

    let pipeline = build_pipeline(search, source, vec![ai], fresh_cache());

    // Drop the receiver before running: the first stage send fails and
    // the pipeline must stop before doing any search or AI work.
    let (progress, rx) = ProgressSender::channel(32);
    drop(rx);
    pipeline
        .run(Query::parse("Widget X200").unwrap(), progress)
        .await;

    assert_eq!(search_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(ai_calls.lock().unwrap().is_empty());
}

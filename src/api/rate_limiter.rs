// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-client sliding-window rate limiting
//!
//! Admission control for the analyze endpoint. Each client (request source
//! address) gets a trailing-window request log; expired timestamps are
//! pruned lazily on that client's next call, not by a background sweep.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default trailing window length
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Default admitted requests per client per window
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Map size past which fully-idle clients are swept during `admit`
const IDLE_SWEEP_THRESHOLD: usize = 1024;

/// Sliding-window request admission, keyed by client identifier
pub struct RateLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_requests` - Admits allowed per client within the window
    /// * `window` - Trailing window length
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Decide whether a request from `client_id` is admitted
    ///
    /// On admission the current timestamp is recorded against the client.
    /// Rejected callers get no retry here; the endpoint answers 429.
    pub async fn admit(&self, client_id: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let cutoff = Instant::now() - self.window;

        // Bounded cleanup: once the map grows past the threshold, drop
        // clients whose windows are empty after pruning.
        if windows.len() > IDLE_SWEEP_THRESHOLD {
            windows.retain(|_, window| {
                while window.front().is_some_and(|t| *t < cutoff) {
                    window.pop_front();
                }
                !window.is_empty()
            });
        }

        let window = windows.entry(client_id.to_string()).or_default();
        while window.front().is_some_and(|t| *t < cutoff) {
            window.pop_front();
        }

        if window.len() >= self.max_requests {
            return false;
        }

        window.push_back(Instant::now());
        true
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// Requests currently counted against `client_id`
    pub async fn current_count(&self, client_id: &str) -> usize {
        self.windows
            .lock()
            .await
            .get(client_id)
            .map(|w| w.len())
            .unwrap_or(0)
    }
}

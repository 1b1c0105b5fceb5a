// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! TTL-based caching of completed analyses
//!
//! Memoizes the final [`AnalysisResult`] per normalized product key so a
//! repeated query within the TTL skips the whole search/fetch/AI cycle.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::analysis::AnalysisResult;

/// Default time-to-live for cached analyses
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Default maximum number of cached analyses
pub const DEFAULT_CAPACITY: usize = 100;

/// TTL + capacity-bounded cache of completed analyses
///
/// Eviction is oldest-by-insertion, not least-recently-used: a `put` at
/// capacity removes the single entry with the earliest `inserted_at`.
/// Failed analyses are never cached.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

struct CacheEntry {
    value: AnalysisResult,
    inserted_at: Instant,
}

impl ResultCache {
    /// Create a new cache
    ///
    /// # Arguments
    /// * `ttl` - Entry time-to-live
    /// * `capacity` - Maximum number of entries
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Get a cached analysis for a normalized product key
    ///
    /// Returns None if absent or expired; expired entries are purged here
    /// rather than by a background sweep.
    pub fn get(&self, key: &str) -> Option<AnalysisResult> {
        let mut entries = match self.entries.write() {
            Ok(e) => e,
            Err(_) => return None,
        };

        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() > self.ttl => {}
            Some(entry) => return Some(entry.value.clone()),
            None => return None,
        }

        entries.remove(key);
        None
    }

    /// Insert a completed analysis
    ///
    /// Evicts the oldest-inserted entry first when at capacity.
    pub fn put(&self, key: &str, value: AnalysisResult) {
        let mut entries = match self.entries.write() {
            Ok(e) => e,
            Err(_) => return,
        };

        if entries.len() >= self.capacity && !entries.contains_key(key) {
            Self::evict_oldest(&mut entries);
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently stored (including not-yet-purged expired ones)
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(e) => e.len(),
            Err(_) => 0,
        }
    }

    /// True when the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_oldest(entries: &mut HashMap<String, CacheEntry>) {
        if let Some(oldest_key) = entries
            .iter()
            .min_by_key(|(_, v)| v.inserted_at)
            .map(|(k, _)| k.clone())
        {
            entries.remove(&oldest_key);
        }
    }
}

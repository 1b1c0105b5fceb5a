// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API surface
//!
//! The analyze SSE endpoint, its progress protocol, per-client rate
//! limiting, and the health probe.

pub mod progress;
pub mod rate_limiter;
pub mod server;

// Re-export commonly used types
pub use progress::{ProgressEvent, ProgressSender};
pub use rate_limiter::RateLimiter;
pub use server::{create_router, serve, ApiConfig, AppState, HealthResponse};

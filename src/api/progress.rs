// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Incremental progress protocol for the analyze stream
//!
//! The pipeline task pushes [`ProgressEvent`]s onto a bounded channel; the
//! SSE writer drains the other end. Percent values are non-decreasing per
//! stream, except the `-1` sentinel on the single terminal error event.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Percent value of the terminal error event
pub const ERROR_PERCENT: i32 = -1;

/// One frame of the analyze progress stream
///
/// Wire shape: `{"p": int, "m": string, "answer"?: string, "error"?: bool}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Progress percent, 0-100, or -1 for the terminal error event
    pub p: i32,
    /// Human-readable status message
    pub m: String,
    /// Final analysis text; present only on the 100% terminal event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Present (true) only on the terminal error event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

impl ProgressEvent {
    /// An advisory intermediate event
    pub fn stage(percent: i32, message: impl Into<String>) -> Self {
        Self {
            p: percent,
            m: message.into(),
            answer: None,
            error: None,
        }
    }

    /// The successful terminal event carrying the analysis
    pub fn done(message: impl Into<String>, answer: String) -> Self {
        Self {
            p: 100,
            m: message.into(),
            answer: Some(answer),
            error: None,
        }
    }

    /// The terminal error event
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            p: ERROR_PERCENT,
            m: message.into(),
            answer: None,
            error: Some(true),
        }
    }

    /// True for either terminal form
    pub fn is_terminal(&self) -> bool {
        self.p == 100 || self.p == ERROR_PERCENT
    }
}

/// Sending half of one request's progress stream
///
/// Enforces percent monotonicity: a stage percent lower than the last
/// emitted value is raised to it. The terminal methods consume the sender,
/// so a stream cannot emit two terminal events or anything after one.
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
    last_percent: i32,
}

impl ProgressSender {
    /// Create a sender/receiver pair with the given channel capacity
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            Self {
                tx,
                last_percent: 0,
            },
            rx,
        )
    }

    /// Emit an intermediate event
    ///
    /// Returns false when the receiver is gone (client disconnected); the
    /// pipeline uses that as its cancellation signal.
    pub async fn stage(&mut self, percent: i32, message: impl Into<String>) -> bool {
        let percent = percent.max(self.last_percent);
        self.last_percent = percent;
        self.tx
            .send(ProgressEvent::stage(percent, message))
            .await
            .is_ok()
    }

    /// Emit the successful terminal event
    pub async fn done(self, message: impl Into<String>, answer: String) -> bool {
        self.tx
            .send(ProgressEvent::done(message, answer))
            .await
            .is_ok()
    }

    /// Emit the terminal error event
    pub async fn failed(self, message: impl Into<String>) -> bool {
        self.tx.send(ProgressEvent::failed(message)).await.is_ok()
    }
}

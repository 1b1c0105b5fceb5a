// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Product query validation and normalization
//!
//! All input validation happens once, here, at ingress. Downstream
//! components receive an already-validated [`Query`] and never re-check it.

use serde::Serialize;
use thiserror::Error;

/// Maximum product name length in Unicode code points
const MAX_NAME_CODE_POINTS: usize = 100;

/// Substrings rejected in product names (matched case-insensitively)
const DENYLIST: &[&str] = &[
    "<script",
    "javascript:",
    "--",
    ";",
    "<iframe",
    "onerror=",
];

/// Errors from query validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Product name is empty after trimming
    #[error("Product name is empty")]
    Empty,

    /// Product name exceeds the length bound
    #[error("Product name exceeds {max} characters")]
    TooLong {
        /// Maximum allowed length in code points
        max: usize,
    },

    /// Product name contains control characters
    #[error("Product name contains control characters")]
    ControlCharacters,

    /// Product name contains a denylisted sequence
    #[error("Product name contains a disallowed sequence: {marker}")]
    DisallowedSequence {
        /// The denylisted marker that matched
        marker: String,
    },
}

/// A validated analysis request
///
/// `normalized_key` is the lowercased, trimmed product name and is the
/// bucketing key for both the result cache and rate limiting.
#[derive(Debug, Clone, Serialize)]
pub struct Query {
    product_name: String,
    normalized_key: String,
}

impl Query {
    /// Validate and normalize a raw product name
    ///
    /// # Arguments
    /// * `raw` - The product name as received from the client
    ///
    /// # Returns
    /// A validated `Query`, or the first validation failure
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.chars().count() > MAX_NAME_CODE_POINTS {
            return Err(ValidationError::TooLong {
                max: MAX_NAME_CODE_POINTS,
            });
        }

        if trimmed.chars().any(|c| c.is_control()) {
            return Err(ValidationError::ControlCharacters);
        }

        let normalized = trimmed.to_lowercase();
        for marker in DENYLIST {
            if normalized.contains(marker) {
                return Err(ValidationError::DisallowedSequence {
                    marker: (*marker).to_string(),
                });
            }
        }

        Ok(Self {
            product_name: trimmed.to_string(),
            normalized_key: normalized,
        })
    }

    /// The product name as entered (trimmed)
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// The lowercased key used for cache and rate-limit bucketing
    pub fn normalized_key(&self) -> &str {
        &self.normalized_key
    }

    /// Whitespace-split tokens of the normalized name
    ///
    /// Used by the strict relevance filter to measure keyword overlap.
    pub fn name_tokens(&self) -> Vec<&str> {
        self.normalized_key.split_whitespace().collect()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AI provider trait definition

use async_trait::async_trait;

use super::types::{AiError, Generation};

/// Trait for implementing AI text-generation providers
///
/// The orchestrator iterates providers in priority order until one
/// returns a generation; a provider only has to turn a prompt into text.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<Generation, AiError>;

    /// Get the provider name for logging and the health endpoint
    fn name(&self) -> &'static str;

    /// Check if the provider is usable (has API key, etc.)
    fn is_available(&self) -> bool;
}

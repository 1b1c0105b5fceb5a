// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the AI analysis stage

use std::env;

/// Configuration for AI providers and the fallback chain
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Gemini API key (provider disabled when absent)
    pub gemini_api_key: Option<String>,
    /// Gemini model identifier
    pub gemini_model: String,
    /// Groq API key (provider disabled when absent)
    pub groq_api_key: Option<String>,
    /// Groq model identifier
    pub groq_model: String,
    /// OpenRouter API key (provider disabled when absent)
    pub openrouter_api_key: Option<String>,
    /// OpenRouter model identifier
    pub openrouter_model: String,
    /// Per-provider generation timeout in seconds; generation is slow
    pub generate_timeout_secs: u64,
}

impl AnalysisConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            groq_model: env::var("GROQ_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string()),
            openrouter_api_key: env::var("OPENROUTER_KEY").ok().filter(|k| !k.is_empty()),
            openrouter_model: env::var("OPENROUTER_MODEL")
                .unwrap_or_else(|_| "deepseek/deepseek-chat".to_string()),
            generate_timeout_secs: env::var("AI_GENERATE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.generate_timeout_secs == 0 {
            return Err("generate_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Check if any AI provider is configured
    pub fn has_any_provider(&self) -> bool {
        self.gemini_api_key.is_some()
            || self.groq_api_key.is_some()
            || self.openrouter_api_key.is_some()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            groq_api_key: None,
            groq_model: "llama3-70b-8192".to_string(),
            openrouter_api_key: None,
            openrouter_model: "deepseek/deepseek-chat".to_string(),
            generate_timeout_secs: 60,
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google Gemini provider
//!
//! First in the fallback chain. Response nesting is unwrapped defensively:
//! candidates, content and parts can all be absent, especially on safety
//! rejections, and must surface as a provider failure rather than a panic.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::AiProvider;
use super::types::{AiError, Generation};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const MAX_OUTPUT_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.4;

/// Google Gemini provider
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key
    /// * `model` - Model identifier, e.g. `gemini-1.5-flash`
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(75))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model,
            client,
        }
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<Generation, AiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            GEMINI_BASE_URL, self.model
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::ApiError {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(AiError::NoApiKey { provider: "gemini" });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: GeminiResponse = response.json().await.map_err(|e| AiError::ApiError {
            status: 0,
            message: format!("JSON parse error: {}", e),
        })?;

        let text = extract_text(&data).ok_or_else(|| AiError::MalformedResponse {
            provider: "gemini",
            reason: rejection_reason(&data),
        })?;

        Ok(Generation {
            text,
            model: self.model.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Best-effort text extraction from a Gemini response
///
/// Concatenates whatever parts carry text in the first candidate; returns
/// None when no text exists anywhere in the expected nesting.
fn extract_text(response: &GeminiResponse) -> Option<String> {
    let candidate = response.candidates.as_ref()?.first()?;
    let parts = candidate.content.as_ref()?.parts.as_ref()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Human-readable reason for a content-free response
fn rejection_reason(response: &GeminiResponse) -> String {
    response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.finish_reason.clone())
        .map(|reason| format!("no text in response (finish reason: {})", reason))
        .unwrap_or_else(|| "no candidates in response".to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

// Every level of the response is optional: moderation rejections drop
// content, some error shapes drop candidates entirely.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible chat-completions provider
//!
//! Groq and OpenRouter speak the same chat-completions wire shape; one
//! client parameterized by endpoint, key and model covers both backup
//! positions of the fallback chain.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::AiProvider;
use super::types::{AiError, Generation};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.4;

/// Chat-completions provider for OpenAI-compatible vendors
pub struct OpenAiCompatProvider {
    name: &'static str,
    endpoint: &'static str,
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiCompatProvider {
    /// Groq backend (first backup)
    pub fn groq(api_key: String, model: String) -> Self {
        Self::new("groq", GROQ_API_URL, api_key, model)
    }

    /// OpenRouter backend (final backup)
    pub fn openrouter(api_key: String, model: String) -> Self {
        Self::new("openrouter", OPENROUTER_API_URL, api_key, model)
    }

    fn new(name: &'static str, endpoint: &'static str, api_key: String, model: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(75))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name,
            endpoint,
            api_key,
            model,
            client,
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiCompatProvider {
    async fn generate(&self, prompt: &str) -> Result<Generation, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::ApiError {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(AiError::NoApiKey {
                provider: self.name,
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: ChatResponse = response.json().await.map_err(|e| AiError::ApiError {
            status: 0,
            message: format!("JSON parse error: {}", e),
        })?;

        let text = extract_content(&data).ok_or(AiError::MalformedResponse {
            provider: self.name,
            reason: "no message content in choices".to_string(),
        })?;

        Ok(Generation {
            text,
            model: self.model.clone(),
        })
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Best-effort content extraction from a chat-completions response
fn extract_content(response: &ChatResponse) -> Option<String> {
    response
        .choices
        .as_ref()?
        .first()?
        .message
        .as_ref()?
        .content
        .clone()
        .filter(|c| !c.is_empty())
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// Optional at every level; vendors differ in which fields survive errors
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

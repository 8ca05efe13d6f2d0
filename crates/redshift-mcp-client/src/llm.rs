//! The LLM seam and its Gemini implementation.
//!
//! The rest of the client treats the model as an opaque text-completion
//! oracle behind [`CompletionOracle`], which keeps chat-turn logic
//! testable with a scripted stand-in.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Opaque text-completion oracle.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    /// Complete `prompt` into raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, ClientError>;
}

// API request types

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

/// Client for the Gemini generateContent REST API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ClientError::Llm(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionOracle for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Llm(format!(
                "Gemini API error: {} - {}",
                status, body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Llm(e.to_string()))?;

        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Llm("no text in model response".to_string()))
    }
}

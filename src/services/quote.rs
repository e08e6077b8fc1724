// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Comforting-quote generation via Gemini.

use crate::models::Emotion;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Returned whenever generation fails.
pub const FALLBACK_QUOTE: &str =
    "The best way to predict the future is to create it. - Abraham Lincoln";

/// Text generation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("no text in response")]
    EmptyResult,

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, GEMINI_API_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        Some(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Malformed(e.to_string()))?;

        parsed.text().ok_or(GeneratorError::EmptyResult)
    }
}

/// Builds quote prompts and never fails.
#[derive(Clone)]
pub struct QuoteService {
    generator: Arc<dyn TextGenerator>,
}

impl QuoteService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Short comforting quote for the user, or `FALLBACK_QUOTE`.
    pub async fn generate(&self, emotion: &Emotion, original_text: &str) -> String {
        let prompt = build_prompt(emotion, original_text);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::warn!(emotion = %emotion, "Quote generator returned empty text");
                    FALLBACK_QUOTE.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, emotion = %emotion, "Quote generation failed, using fallback");
                FALLBACK_QUOTE.to_string()
            }
        }
    }
}

pub fn build_prompt(emotion: &Emotion, original_text: &str) -> String {
    format!(
        "A user is feeling '{emotion}' and wrote this: '{original_text}'. \
         Generate a short, comforting, and original quote for them that is under 25 words. \
         Do not include quotation marks in your response."
    )
}

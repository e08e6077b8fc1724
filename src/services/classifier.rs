// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text emotion classification via the Hugging Face Inference API.

use crate::models::Emotion;
use async_trait::async_trait;
use serde::Deserialize;

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Classifier errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("no labels returned")]
    EmptyResult,

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Text in, single emotion label out.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Emotion, ClassifierError>;
}

/// Remote text-classification pipeline hosted on Hugging Face.
#[derive(Clone)]
pub struct HfEmotionClassifier {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_token: Option<String>,
}

impl HfEmotionClassifier {
    pub fn new(model: String, api_token: Option<String>) -> Self {
        Self::with_base_url(model, api_token, HF_INFERENCE_URL.to_string())
    }

    pub fn with_base_url(model: String, api_token: Option<String>, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_token,
        }
    }
}

/// One `{label, score}` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Single inputs come back nested or flat depending on the pipeline.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            ClassificationResponse::Nested(batches) => {
                batches.into_iter().next().unwrap_or_default()
            }
            ClassificationResponse::Flat(scores) => scores,
        }
    }
}

/// Highest-scoring label.
pub fn top_label(scores: &[LabelScore]) -> Option<&LabelScore> {
    scores.iter().max_by(|a, b| a.score.total_cmp(&b.score))
}

#[async_trait]
impl EmotionClassifier for HfEmotionClassifier {
    async fn classify(&self, text: &str) -> Result<Emotion, ClassifierError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let body = serde_json::json!({
            "inputs": text,
            "options": { "wait_for_model": true }
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ClassificationResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        let scores = parsed.into_scores();
        let top = top_label(&scores).ok_or(ClassifierError::EmptyResult)?;

        tracing::debug!(label = %top.label, score = top.score, "Classified text");
        Ok(Emotion::from_label(&top.label))
    }
}

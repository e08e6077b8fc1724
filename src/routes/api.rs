// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API routes: emotion prediction and music recommendations.

use crate::error::{AppError, Result};
use crate::middleware::auth::SessionContext;
use crate::models::{Emotion, Track};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Routes open to anyone.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict))
}

/// Routes that need a session.
/// The session middleware is applied in routes/mod.rs for these routes.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/recommend", post(recommend))
}

// ─── Prediction ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(max = 2000, message = "Text must be at most 2000 characters"))]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub input_text: String,
    pub detected_emotion: Emotion,
    pub recommended_quote: String,
}

/// Classify the text and pair it with a quote.
async fn predict(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let request = parse_body(body)?;
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No text provided".to_string()))?;

    let emotion = state.classifier.classify(&text).await?;
    let quote = state.quotes.generate(&emotion, &text).await;

    tracing::info!(emotion = %emotion, chars = text.chars().count(), "Predicted emotion");

    Ok(Json(PredictResponse {
        input_text: text,
        detected_emotion: emotion,
        recommended_quote: quote,
    }))
}

// ─── Recommendations ─────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(max = 64, message = "Emotion must be at most 64 characters"))]
    pub emotion: Option<String>,
}

/// Tracks matching the emotion, seeded by the user's top artists.
async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
    body: std::result::Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<Vec<Track>>> {
    // Refresh check comes first: no valid token means 401 regardless of body
    let token = state
        .tokens
        .get_token(&session.session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let request = parse_body(body)?;
    let emotion = request
        .emotion
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Emotion not provided".to_string()))?;
    let emotion = Emotion::from_label(&emotion);

    let tracks = state
        .recommender
        .recommend(&emotion, &token.access_token)
        .await?;

    tracing::info!(emotion = %emotion, count = tracks.len(), "Recommended tracks");
    Ok(Json(tracks))
}

/// Turn extractor and validation failures into 400s.
fn parse_body<T: Validate>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    let Json(request) =
        body.map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(request)
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MoodMate API Server
//!
//! Classifies how a user feels, answers with a comforting quote, and
//! recommends Spotify tracks for the mood.

use moodmate::{
    config::Config,
    db::SqliteDb,
    services::{GeminiClient, HfEmotionClassifier, QuoteService, SpotifyClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting MoodMate");

    // Open user database
    let db = SqliteDb::open(&config.database_path)?;
    tracing::info!(path = %config.database_path, "User database ready");

    // External collaborators, built once and shared read-only
    let classifier = Arc::new(HfEmotionClassifier::new(
        config.classifier_model.clone(),
        config.hf_api_token.clone(),
    ));
    tracing::info!(model = %config.classifier_model, "Emotion classifier configured");

    let quotes = QuoteService::new(Arc::new(GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_model.clone(),
    )));
    tracing::info!(model = %config.gemini_model, "Quote generator configured");

    let music = Arc::new(SpotifyClient::new(
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
        config.spotify_redirect_uri.clone(),
    ));

    // Build shared state
    let port = config.port;
    let state = Arc::new(AppState::new(config, db, classifier, quotes, music));

    // Build router
    let app = moodmate::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moodmate=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

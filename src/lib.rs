// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MoodMate: music and words for how you feel
//!
//! This crate provides the backend that classifies the emotion in a piece
//! of text, asks Gemini for a comforting quote, and requests Spotify
//! recommendations biased toward that emotion.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SqliteDb;
use services::{
    EmotionClassifier, MusicService, QuoteService, RecommendationService, SessionStore,
    TokenService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SqliteDb,
    pub classifier: Arc<dyn EmotionClassifier>,
    pub quotes: QuoteService,
    pub music: Arc<dyn MusicService>,
    pub tokens: TokenService,
    pub recommender: RecommendationService,
}

impl AppState {
    /// Wire the services around the injected collaborators.
    pub fn new(
        config: Config,
        db: SqliteDb,
        classifier: Arc<dyn EmotionClassifier>,
        quotes: QuoteService,
        music: Arc<dyn MusicService>,
    ) -> Self {
        let tokens = TokenService::new(SessionStore::new(), music.clone(), db.clone());
        let recommender = RecommendationService::new(music.clone());

        Self {
            config,
            db,
            classifier,
            quotes,
            music,
            tokens,
            recommender,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        self.tokens.sessions()
    }
}

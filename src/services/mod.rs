// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod classifier;
pub mod quote;
pub mod recommend;
pub mod spotify;
pub mod tokens;

pub use classifier::{EmotionClassifier, HfEmotionClassifier};
pub use quote::{GeminiClient, QuoteService, TextGenerator};
pub use recommend::RecommendationService;
pub use spotify::{MusicService, SpotifyClient};
pub use tokens::{SessionStore, TokenService};

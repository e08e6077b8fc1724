// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emotion-biased track recommendations.

use crate::error::AppError;
use crate::models::{Emotion, Track};
use crate::services::spotify::{
    MusicError, MusicService, RecommendationQuery, SpotifyTrack, TimeRange,
};
use std::sync::Arc;

/// Used when the user has no top artists: Coldplay, Daft Punk, Queen.
pub const FALLBACK_SEED_ARTISTS: [&str; 3] = [
    "4gzpq5DPGxSnKTe4SA8HAU",
    "4tZwfgrHOc3mvqYlEYSvVi",
    "1dfeR4HaWDbWqFHLkxsg1d",
];

/// Spotify accepts at most 5 seeds per request.
pub const MAX_SEED_ARTISTS: usize = 5;
pub const RECOMMENDATION_LIMIT: u32 = 10;

/// Maps an emotion to Spotify recommendations seeded by the user's taste.
#[derive(Clone)]
pub struct RecommendationService {
    music: Arc<dyn MusicService>,
}

impl RecommendationService {
    pub fn new(music: Arc<dyn MusicService>) -> Self {
        Self { music }
    }

    /// Recommend up to 10 tracks for `emotion`.
    ///
    /// A rejected recommendation request yields an empty list; transport
    /// failures and top-artist lookup failures propagate.
    pub async fn recommend(
        &self,
        emotion: &Emotion,
        access_token: &str,
    ) -> Result<Vec<Track>, AppError> {
        let mut seed_artists = self.seed_artists(access_token).await?;
        seed_artists.truncate(MAX_SEED_ARTISTS);

        let targets = emotion.audio_targets();
        let query = RecommendationQuery {
            seed_artists,
            limit: RECOMMENDATION_LIMIT,
            target_valence: targets.valence,
            target_energy: targets.energy,
        };

        tracing::debug!(
            emotion = %emotion,
            seeds = ?query.seed_artists,
            target_valence = query.target_valence,
            target_energy = query.target_energy,
            "Requesting recommendations"
        );

        let tracks = match self.music.recommendations(access_token, &query).await {
            Ok(tracks) => tracks,
            Err(MusicError::Rejected { status, message }) => {
                tracing::warn!(status, error = %message, "Spotify rejected recommendation request");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(shape_tracks(tracks))
    }

    /// Top short-term artists, then medium-term, then the fixed fallback.
    pub async fn seed_artists(&self, access_token: &str) -> Result<Vec<String>, AppError> {
        for time_range in [TimeRange::ShortTerm, TimeRange::MediumTerm] {
            let artists = self
                .music
                .top_artists(access_token, time_range, MAX_SEED_ARTISTS as u32)
                .await?;

            if !artists.is_empty() {
                return Ok(artists.into_iter().map(|a| a.id).collect());
            }
            tracing::debug!(time_range = time_range.as_str(), "No top artists");
        }

        Ok(FALLBACK_SEED_ARTISTS.iter().map(|id| id.to_string()).collect())
    }
}

/// Drop null entries and flatten the rest into `Track`s.
pub fn shape_tracks(tracks: Vec<Option<SpotifyTrack>>) -> Vec<Track> {
    tracks
        .into_iter()
        .flatten()
        .take(RECOMMENDATION_LIMIT as usize)
        .map(|track| Track {
            primary_artist_name: track
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            external_url: track.external_urls.spotify.unwrap_or_default(),
            album_art_url: track
                .album
                .images
                .into_iter()
                .next()
                .map(|i| i.url)
                .unwrap_or_default(),
            name: track.name,
        })
        .collect()
}

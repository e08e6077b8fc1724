// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify Web API client.
//!
//! Handles:
//! - Authorization URL construction and code exchange
//! - Token refresh
//! - Current user profile
//! - Top artists and recommendations

use crate::models::TokenInfo;
use crate::time_utils::now_epoch_secs;
use async_trait::async_trait;
use serde::Deserialize;

const ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const API_URL: &str = "https://api.spotify.com/v1";

/// OAuth scopes requested at login.
pub const SCOPES: &str = "user-read-recently-played user-top-read";

/// Music service errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MusicError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Time window for the user's top artists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
        }
    }
}

/// Parameters for `GET /recommendations`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub seed_artists: Vec<String>,
    pub limit: u32,
    pub target_valence: f64,
    pub target_energy: f64,
}

/// Operations the app needs from the music service.
///
/// `SpotifyClient` is the production implementation; tests inject fakes.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// URL the browser is redirected to for login.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, MusicError>;

    /// Obtain a new access token from a refresh token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenInfo, MusicError>;

    async fn current_user(&self, access_token: &str) -> Result<SpotifyProfile, MusicError>;

    async fn top_artists(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<SpotifyArtist>, MusicError>;

    /// Track recommendations. Entries may be `null` in the upstream payload.
    async fn recommendations(
        &self,
        access_token: &str,
        query: &RecommendationQuery,
    ) -> Result<Vec<Option<SpotifyTrack>>, MusicError>;
}

/// Spotify API client.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    accounts_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl SpotifyClient {
    /// Create a new Spotify client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self::with_base_urls(
            client_id,
            client_secret,
            redirect_uri,
            ACCOUNTS_URL.to_string(),
            API_URL.to_string(),
        )
    }

    /// Client against alternate accounts and API hosts.
    pub fn with_base_urls(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        accounts_url: String,
        api_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// POST to the token endpoint with client credentials.
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<SpotifyTokenResponse, MusicError> {
        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| MusicError::Unavailable(format!("Token request failed: {}", e)))?;

        check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, MusicError> {
        let response = self
            .http
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| MusicError::Unavailable(e.to_string()))?;

        check_response_json(response).await
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/authorize?\
             client_id={}&\
             response_type=code&\
             redirect_uri={}&\
             scope={}&\
             state={}",
            self.accounts_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, MusicError> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;

        let refresh_token = response.refresh_token.ok_or_else(|| {
            MusicError::Malformed("Token exchange response has no refresh_token".to_string())
        })?;

        Ok(TokenInfo {
            access_token: response.access_token,
            refresh_token,
            expires_at: now_epoch_secs() + response.expires_in,
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenInfo, MusicError> {
        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        // Spotify only rotates the refresh token sometimes.
        Ok(TokenInfo {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
            expires_at: now_epoch_secs() + response.expires_in,
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<SpotifyProfile, MusicError> {
        self.get_json("/me", access_token, &[]).await
    }

    async fn top_artists(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<SpotifyArtist>, MusicError> {
        let page: SpotifyPage<SpotifyArtist> = self
            .get_json(
                "/me/top/artists",
                access_token,
                &[
                    ("limit", limit.to_string()),
                    ("time_range", time_range.as_str().to_string()),
                ],
            )
            .await?;
        Ok(page.items)
    }

    async fn recommendations(
        &self,
        access_token: &str,
        query: &RecommendationQuery,
    ) -> Result<Vec<Option<SpotifyTrack>>, MusicError> {
        let response: SpotifyRecommendations = self
            .get_json(
                "/recommendations",
                access_token,
                &[
                    ("seed_artists", query.seed_artists.join(",")),
                    ("limit", query.limit.to_string()),
                    ("target_valence", query.target_valence.to_string()),
                    ("target_energy", query.target_energy.to_string()),
                ],
            )
            .await?;
        Ok(response.tracks)
    }
}

/// Check response status and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, MusicError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Spotify rate limit hit (429)");
        }

        return Err(MusicError::Rejected {
            status: status.as_u16(),
            message: body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| MusicError::Malformed(format!("JSON parse error: {}", e)))
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
struct SpotifyTokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SpotifyPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
struct SpotifyRecommendations {
    #[serde(default)]
    tracks: Vec<Option<SpotifyTrack>>,
}

/// Current user profile (`GET /me`).
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyProfile {
    pub id: String,
    pub display_name: Option<String>,
}

impl SpotifyProfile {
    /// Display name, falling back to the account ID when unset.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Artist object (only the fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Track object from the recommendations endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtistRef>,
    #[serde(default)]
    pub external_urls: SpotifyExternalUrls,
    #[serde(default)]
    pub album: SpotifyAlbum,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyArtistRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

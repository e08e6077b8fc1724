//! User and token models.

use serde::{Deserialize, Serialize};

/// Seconds before expiry at which an access token is treated as expired.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// User row stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal row ID
    pub id: i64,
    /// Spotify account ID (unique)
    pub spotify_id: String,
    /// Display name shown on the home page
    pub display_name: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Access token expiry (Unix timestamp)
    pub token_expires_at: Option<i64>,
}

/// Access/refresh token pair for the music service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp after which the access token is rejected.
    pub expires_at: i64,
}

impl TokenInfo {
    /// True when the token expires within the refresh margin of `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at - now < TOKEN_REFRESH_MARGIN_SECS
    }
}

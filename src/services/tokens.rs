// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-scoped Spotify token storage and proactive refresh.

use crate::db::SqliteDb;
use crate::error::AppError;
use crate::models::TokenInfo;
use crate::services::spotify::MusicService;
use crate::time_utils::now_epoch_secs;
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

/// Sessions older than this are dropped.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Server-side state for one browser session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Option<TokenInfo>,
    /// Spotify account the session belongs to.
    pub account_id: Option<String>,
    pub created_at: i64,
}

/// In-process session map keyed by random session ID.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session and return its ID. Expired sessions are pruned.
    pub fn create(&self, token: TokenInfo, account_id: String) -> Result<String, AppError> {
        let now = now_epoch_secs();
        self.sessions
            .retain(|_, session| now - session.created_at < SESSION_TTL_SECS);

        let session_id = new_session_id()?;
        self.sessions.insert(
            session_id.clone(),
            Session {
                token: Some(token),
                account_id: Some(account_id),
                created_at: now,
            },
        );
        Ok(session_id)
    }

    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Replace the session's token. No-op if the session is gone.
    pub fn set_token(&self, session_id: &str, token: TokenInfo) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.token = Some(token);
        }
    }

    pub fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.remove(session_id).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Hex-encoded 32 random bytes.
pub fn new_session_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Random session ID generation failed")))?;
    Ok(hex::encode(bytes))
}

/// Hands out valid access tokens for a session, refreshing when needed.
#[derive(Clone)]
pub struct TokenService {
    sessions: SessionStore,
    music: Arc<dyn MusicService>,
    db: SqliteDb,
}

impl TokenService {
    pub fn new(sessions: SessionStore, music: Arc<dyn MusicService>, db: SqliteDb) -> Self {
        Self {
            sessions,
            music,
            db,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Get a token for the session that is valid for at least another minute.
    ///
    /// Returns `None` when the session has no token (not logged in).
    pub async fn get_token(&self, session_id: &str) -> Result<Option<TokenInfo>, AppError> {
        self.get_token_at(session_id, now_epoch_secs()).await
    }

    /// `get_token` with an explicit clock.
    pub async fn get_token_at(
        &self,
        session_id: &str,
        now: i64,
    ) -> Result<Option<TokenInfo>, AppError> {
        // Clone out of the map so no shard lock is held across the refresh.
        let Some(session) = self.sessions.get(session_id) else {
            return Ok(None);
        };
        let Some(token) = session.token else {
            return Ok(None);
        };

        if !token.is_expired_at(now) {
            return Ok(Some(token));
        }

        tracing::info!(
            account_id = ?session.account_id,
            expires_at = token.expires_at,
            "Access token expiring, refreshing"
        );

        let refreshed = self
            .music
            .refresh_access_token(&token.refresh_token)
            .await
            .map_err(|e| AppError::TokenRefresh(e.to_string()))?;

        self.sessions.set_token(session_id, refreshed.clone());

        if let Some(account_id) = session.account_id.as_deref() {
            match self.db.update_tokens(account_id, &refreshed).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(account_id, "No user row for refreshed tokens");
                }
                Err(e) => {
                    tracing::warn!(error = %e, account_id, "Failed to persist refreshed tokens, continuing anyway");
                }
            }
        }

        tracing::info!(account_id = ?session.account_id, "Token refreshed");
        Ok(Some(refreshed))
    }
}

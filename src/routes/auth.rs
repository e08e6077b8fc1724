// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spotify OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, session_cookie, session_id_from_jar};
use crate::AppState;

use hmac::{Hmac, Mac};
use sha2::Sha256;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Cookie binding the OAuth `state` to the browser that started the flow.
pub const OAUTH_NONCE_COOKIE: &str = "moodmate_oauth_nonce";

/// How long a login attempt stays valid.
pub const OAUTH_STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
}

/// Start OAuth flow - redirect to Spotify authorization.
async fn login(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<(CookieJar, Redirect)> {
    let mut nonce = [0u8; 16];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Random nonce generation failed")))?;
    let nonce = hex::encode(nonce);

    let oauth_state = sign_oauth_state(&nonce, now_millis()?, &state.config.session_signing_key)?;
    let auth_url = state.music.authorize_url(&oauth_state);

    tracing::info!(
        client_id = %state.config.spotify_client_id,
        "Starting OAuth flow, redirecting to Spotify"
    );

    let jar = jar.add(nonce_cookie(nonce, state.config.secure_cookies()));
    Ok((jar, Redirect::temporary(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, upsert user, start session.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let secure = state.config.secure_cookies();
    let expected_nonce = jar.get(OAUTH_NONCE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(nonce_cookie(String::new(), secure));

    // User denied access (or Spotify failed) - go home with the reason
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Spotify");
        let redirect = format!("/?error={}", urlencoding::encode(&error));
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let nonce = params
        .state
        .as_deref()
        .and_then(|s| verify_oauth_state(s, &state.config.session_signing_key, now_millis().ok()?))
        .ok_or_else(|| AppError::BadRequest("Invalid or expired OAuth state".to_string()))?;

    let nonce_matches = expected_nonce
        .map(|expected| bool::from(expected.as_bytes().ct_eq(nonce.as_bytes())))
        .unwrap_or(false);
    if !nonce_matches {
        tracing::warn!("OAuth state nonce does not match this browser");
        return Err(AppError::BadRequest(
            "OAuth state does not match this browser".to_string(),
        ));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    // Any previous session in this browser is replaced
    if let Some(old_session) = session_id_from_jar(&jar, &state.config.session_signing_key) {
        state.sessions().remove(&old_session);
    }

    tracing::info!("Exchanging authorization code for tokens");
    let tokens = state.music.exchange_code(&code).await?;
    let profile = state.music.current_user(&tokens.access_token).await?;

    let user = state
        .db
        .upsert_user(&profile.id, profile.name(), &tokens)
        .await?;

    let session_id = state.sessions().create(tokens, user.spotify_id.clone())?;
    let jwt = create_session_jwt(&session_id, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(
        spotify_id = %user.spotify_id,
        display_name = %user.display_name,
        "OAuth successful, user stored and session started"
    );

    let jar = jar.add(session_cookie(jwt, secure));
    Ok((jar, Redirect::temporary("/")))
}

/// Logout - drop the server-side session and the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(session_id) = session_id_from_jar(&jar, &state.config.session_signing_key) {
        if let Some(session) = state.sessions().remove(&session_id) {
            tracing::info!(account_id = ?session.account_id, "Session ended");
        }
    }

    let jar = jar.remove(session_cookie(String::new(), state.config.secure_cookies()));
    (jar, Redirect::temporary("/"))
}

fn nonce_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_NONCE_COOKIE, value))
        .path("/callback")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::milliseconds(OAUTH_STATE_MAX_AGE_MS as i64))
        .build()
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Build the signed OAuth `state`: base64url("nonce|timestamp_hex|signature_hex").
pub fn sign_oauth_state(nonce: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", nonce, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed_state = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify signature and age of the OAuth `state`, returning its nonce.
pub fn verify_oauth_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let nonce = parts[0];
    let timestamp_hex = parts[1];
    let signature = hex::decode(parts[2]).ok()?;

    let payload = format!("{}|{}", nonce, timestamp_hex);
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let timestamp = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(timestamp) > OAUTH_STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}

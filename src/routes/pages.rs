// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered home page.

use crate::error::Result;
use crate::middleware::auth::session_id_from_jar;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

#[derive(Deserialize)]
pub struct IndexParams {
    /// OAuth error forwarded by `/callback`.
    #[serde(default)]
    error: Option<String>,
}

/// Home page, greeting the logged-in user by display name.
async fn index(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<IndexParams>,
) -> Result<Html<String>> {
    let display_name = match current_account(&state, &jar) {
        Some(account_id) => state.db.get_user(&account_id).await?.map(|u| u.display_name),
        None => None,
    };

    Ok(Html(render_index(
        display_name.as_deref(),
        params.error.as_deref(),
    )))
}

/// Spotify account of the request's session, if any.
fn current_account(state: &AppState, jar: &CookieJar) -> Option<String> {
    let session_id = session_id_from_jar(jar, &state.config.session_signing_key)?;
    state.sessions().get(&session_id)?.account_id
}

pub fn render_index(display_name: Option<&str>, login_error: Option<&str>) -> String {
    let account = match display_name {
        Some(name) => format!(
            r#"<p class="greeting">Hello, {}! <a href="/logout">Log out</a></p>"#,
            escape_html(name)
        ),
        None => r#"<p class="greeting"><a href="/login">Log in with Spotify</a> to get music recommendations.</p>"#
            .to_string(),
    };

    let error = login_error
        .map(|e| {
            format!(
                r#"<p class="error">Spotify login failed: {}</p>"#,
                escape_html(e)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>MoodMate</title>
</head>
<body>
<main>
<h1>MoodMate</h1>
{account}
{error}
<form id="mood-form">
<textarea id="mood-text" rows="4" placeholder="How are you feeling today?"></textarea>
<button type="submit">Share</button>
</form>
<section id="result-container" hidden>
<p>Detected emotion: <strong id="detected-emotion"></strong></p>
<blockquote id="recommended-quote"></blockquote>
</section>
<section id="music-container" hidden>
<h2>Music for your mood</h2>
<div id="music-list"></div>
</section>
</main>
<script src="/static/script.js"></script>
</body>
</html>
"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

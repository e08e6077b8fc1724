// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use moodmate::config::Config;
use moodmate::db::SqliteDb;
use moodmate::middleware::auth::{create_session_jwt, SESSION_COOKIE};
use moodmate::models::{Emotion, TokenInfo};
use moodmate::routes::create_router;
use moodmate::services::classifier::{ClassifierError, EmotionClassifier};
use moodmate::services::quote::{GeneratorError, QuoteService, TextGenerator};
use moodmate::services::spotify::{
    MusicError, MusicService, RecommendationQuery, SpotifyAlbum, SpotifyArtist, SpotifyArtistRef,
    SpotifyExternalUrls, SpotifyImage, SpotifyProfile, SpotifyTrack, TimeRange,
};
use moodmate::time_utils::now_epoch_secs;
use moodmate::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_ACCOUNT: &str = "spotify_user_1";

// ─── Fakes ───────────────────────────────────────────────────

/// Classifier returning a fixed label, or failing.
pub struct FakeClassifier {
    pub result: Result<Emotion, ClassifierError>,
    pub inputs: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn returning(emotion: Emotion) -> Self {
        Self {
            result: Ok(emotion),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ClassifierError::Unavailable("connection refused".to_string())),
            inputs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EmotionClassifier for FakeClassifier {
    async fn classify(&self, text: &str) -> Result<Emotion, ClassifierError> {
        self.inputs.lock().unwrap().push(text.to_string());
        self.result.clone()
    }
}

/// Generator returning fixed text, or failing.
pub struct FakeGenerator(pub Result<String, GeneratorError>);

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
        self.0.clone()
    }
}

/// How the fake answers `/recommendations`.
#[derive(Clone)]
pub enum RecommendationBehavior {
    Tracks(Vec<Option<SpotifyTrack>>),
    Reject,
    Unavailable,
}

/// Scriptable in-memory Spotify.
pub struct FakeMusic {
    pub short_term: Vec<String>,
    pub medium_term: Vec<String>,
    pub behavior: RecommendationBehavior,
    pub refresh_fails: bool,
    pub top_artists_fail: bool,
    pub profile_name: Option<String>,
    pub queries: Mutex<Vec<RecommendationQuery>>,
    pub top_artist_calls: Mutex<Vec<TimeRange>>,
    pub refresh_calls: AtomicUsize,
    pub exchanged_codes: Mutex<Vec<String>>,
}

impl Default for FakeMusic {
    fn default() -> Self {
        Self {
            short_term: vec!["artist_a".to_string(), "artist_b".to_string()],
            medium_term: Vec::new(),
            behavior: RecommendationBehavior::Tracks(vec![Some(track("Fix You"))]),
            refresh_fails: false,
            top_artists_fail: false,
            profile_name: Some("Alice".to_string()),
            queries: Mutex::new(Vec::new()),
            top_artist_calls: Mutex::new(Vec::new()),
            refresh_calls: AtomicUsize::new(0),
            exchanged_codes: Mutex::new(Vec::new()),
        }
    }
}

impl FakeMusic {
    pub fn last_query(&self) -> RecommendationQuery {
        self.queries
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no recommendation request recorded")
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MusicService for FakeMusic {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.example.test/authorize?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, MusicError> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        Ok(TokenInfo {
            access_token: format!("access_for_{code}"),
            refresh_token: format!("refresh_for_{code}"),
            expires_at: now_epoch_secs() + 3600,
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenInfo, MusicError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.refresh_fails {
            return Err(MusicError::Rejected {
                status: 400,
                message: "invalid_grant".to_string(),
            });
        }
        Ok(TokenInfo {
            access_token: "refreshed_access".to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at: now_epoch_secs() + 3600,
        })
    }

    async fn current_user(&self, _access_token: &str) -> Result<SpotifyProfile, MusicError> {
        Ok(SpotifyProfile {
            id: TEST_ACCOUNT.to_string(),
            display_name: self.profile_name.clone(),
        })
    }

    async fn top_artists(
        &self,
        _access_token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<SpotifyArtist>, MusicError> {
        self.top_artist_calls.lock().unwrap().push(time_range);
        if self.top_artists_fail {
            return Err(MusicError::Unavailable("connection reset".to_string()));
        }
        let ids = match time_range {
            TimeRange::ShortTerm => &self.short_term,
            TimeRange::MediumTerm => &self.medium_term,
        };
        Ok(ids
            .iter()
            .take(limit as usize)
            .map(|id| SpotifyArtist {
                id: id.clone(),
                name: format!("{id} name"),
            })
            .collect())
    }

    async fn recommendations(
        &self,
        _access_token: &str,
        query: &RecommendationQuery,
    ) -> Result<Vec<Option<SpotifyTrack>>, MusicError> {
        self.queries.lock().unwrap().push(query.clone());
        match &self.behavior {
            RecommendationBehavior::Tracks(tracks) => Ok(tracks.clone()),
            RecommendationBehavior::Reject => Err(MusicError::Rejected {
                status: 404,
                message: "no recommendations".to_string(),
            }),
            RecommendationBehavior::Unavailable => {
                Err(MusicError::Unavailable("connection reset".to_string()))
            }
        }
    }
}

pub fn track(name: &str) -> SpotifyTrack {
    SpotifyTrack {
        name: name.to_string(),
        artists: vec![SpotifyArtistRef {
            name: "Coldplay".to_string(),
        }],
        external_urls: SpotifyExternalUrls {
            spotify: Some(format!("https://open.spotify.com/track/{name}")),
        },
        album: SpotifyAlbum {
            images: vec![SpotifyImage {
                url: format!("https://i.scdn.co/image/{name}"),
            }],
        },
    }
}

// ─── App Builders ────────────────────────────────────────────

pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub music: Arc<FakeMusic>,
    pub classifier: Arc<FakeClassifier>,
}

/// Create a test app with offline fakes for every collaborator.
pub fn create_test_app() -> TestApp {
    create_test_app_with(
        FakeMusic::default(),
        FakeClassifier::returning(Emotion::Sadness),
        FakeGenerator(Ok("This too shall pass.".to_string())),
    )
}

pub fn create_test_app_with(
    music: FakeMusic,
    classifier: FakeClassifier,
    generator: FakeGenerator,
) -> TestApp {
    let config = Config::test_default();
    let db = SqliteDb::open_in_memory().expect("in-memory database");
    let music = Arc::new(music);
    let classifier = Arc::new(classifier);
    let quotes = QuoteService::new(Arc::new(generator));

    let state = Arc::new(AppState::new(
        config,
        db,
        classifier.clone(),
        quotes,
        music.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        music,
        classifier,
    }
}

/// Store a user and start a session for them. Returns the `Cookie` header value.
pub async fn login(state: &AppState, expires_in: i64) -> String {
    login_with_session_id(state, expires_in).await.0
}

/// Like `login`, also returning the server-side session ID.
pub async fn login_with_session_id(state: &AppState, expires_in: i64) -> (String, String) {
    let tokens = TokenInfo {
        access_token: "session_access".to_string(),
        refresh_token: "session_refresh".to_string(),
        expires_at: now_epoch_secs() + expires_in,
    };
    state
        .db
        .upsert_user(TEST_ACCOUNT, "Alice", &tokens)
        .await
        .expect("upsert user");
    let session_id = state
        .sessions()
        .create(tokens, TEST_ACCOUNT.to_string())
        .expect("create session");
    let jwt = create_session_jwt(&session_id, &state.config.session_signing_key).expect("jwt");
    (format!("{SESSION_COOKIE}={jwt}"), session_id)
}

// ─── Request Helpers ─────────────────────────────────────────

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("local server");
    });
    format!("http://{addr}")
}


pub fn post_json(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

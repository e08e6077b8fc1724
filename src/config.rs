//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use ring::rand::{SecureRandom, SystemRandom};
use std::env;

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5000/callback";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_CLASSIFIER_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";
const SESSION_KEY_LEN: usize = 64;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Spotify OAuth client ID (public)
    pub spotify_client_id: String,
    /// Registered Spotify redirect URI, pointing at `/callback`
    pub spotify_redirect_uri: String,
    /// Gemini model used for quotes
    pub gemini_model: String,
    /// Hugging Face model used for emotion classification
    pub classifier_model: String,
    /// SQLite database file
    pub database_path: String,
    /// Directory served under `/static`
    pub static_dir: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Spotify OAuth client secret
    pub spotify_client_secret: String,
    /// Google AI Studio key for Gemini
    pub google_api_key: String,
    /// Hugging Face Inference API token (anonymous access if unset)
    pub hf_api_token: Option<String>,
    /// Signing key for session cookies and OAuth state (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_signing_key = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().as_bytes().to_vec(),
            _ => {
                tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
                random_key()?
            }
        };

        Ok(Self {
            spotify_client_id: required("SPOTIFY_CLIENT_ID")?,
            spotify_redirect_uri: env::var("SPOTIFY_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            classifier_model: env::var("CLASSIFIER_MODEL")
                .unwrap_or_else(|_| DEFAULT_CLASSIFIER_MODEL.to_string()),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "moodmate.db".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),

            spotify_client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            google_api_key: required("GOOGLE_API_KEY")?,
            hf_api_token: env::var("HF_API_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            session_signing_key,
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            spotify_client_id: "test_client_id".to_string(),
            spotify_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            database_path: ":memory:".to_string(),
            static_dir: "static".to_string(),
            port: 5000,
            spotify_client_secret: "test_secret".to_string(),
            google_api_key: "test_google_key".to_string(),
            hf_api_token: None,
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.spotify_redirect_uri.starts_with("https://")
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn random_key() -> Result<Vec<u8>, ConfigError> {
    let mut key = vec![0u8; SESSION_KEY_LEN];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| ConfigError::Random)?;
    Ok(key)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Failed to generate session signing key")]
    Random,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations on the `users` table.
//!
//! Every write is a single statement, so each upsert is atomic on its own.
//! Statements run on tokio's blocking pool.

use crate::error::AppError;
use crate::models::{TokenInfo, User};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    spotify_id TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    access_token TEXT,
    refresh_token TEXT,
    token_expires_at INTEGER
);
";

const USER_COLUMNS: &str =
    "id, spotify_id, display_name, access_token, refresh_token, token_expires_at";

/// SQLite database handle, cheap to clone.
#[derive(Clone)]
pub struct SqliteDb {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    /// Open (or create) the database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database (tests).
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Database(format!("Failed to apply schema: {}", e)))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard: MutexGuard<'_, Connection> = conn
                .lock()
                .map_err(|_| AppError::Database("Database connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Database task failed: {}", e)))?
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Spotify account ID.
    pub async fn get_user(&self, spotify_id: &str) -> Result<Option<User>, AppError> {
        let spotify_id = spotify_id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE spotify_id = ?1"),
                params![spotify_id],
                row_to_user,
            )
            .optional()
            .map_err(|e| AppError::Database(e.to_string()))
        })
        .await
    }

    /// Create the user on first login, otherwise refresh name and tokens.
    pub async fn upsert_user(
        &self,
        spotify_id: &str,
        display_name: &str,
        tokens: &TokenInfo,
    ) -> Result<User, AppError> {
        let spotify_id = spotify_id.to_string();
        let display_name = display_name.to_string();
        let tokens = tokens.clone();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO users (spotify_id, display_name, access_token, refresh_token, token_expires_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT(spotify_id) DO UPDATE SET \
                         display_name = excluded.display_name, \
                         access_token = excluded.access_token, \
                         refresh_token = excluded.refresh_token, \
                         token_expires_at = excluded.token_expires_at \
                     RETURNING {USER_COLUMNS}"
                ),
                params![
                    spotify_id,
                    display_name,
                    tokens.access_token,
                    tokens.refresh_token,
                    tokens.expires_at
                ],
                row_to_user,
            )
            .map_err(|e| AppError::Database(e.to_string()))
        })
        .await
    }

    /// Store refreshed tokens. Returns false if the user does not exist.
    pub async fn update_tokens(
        &self,
        spotify_id: &str,
        tokens: &TokenInfo,
    ) -> Result<bool, AppError> {
        let spotify_id = spotify_id.to_string();
        let tokens = tokens.clone();
        self.with_conn(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE users SET access_token = ?1, refresh_token = ?2, token_expires_at = ?3 \
                     WHERE spotify_id = ?4",
                    params![
                        tokens.access_token,
                        tokens.refresh_token,
                        tokens.expires_at,
                        spotify_id
                    ],
                )
                .map_err(|e| AppError::Database(e.to_string()))?;
            Ok(updated > 0)
        })
        .await
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        spotify_id: row.get(1)?,
        display_name: row.get(2)?,
        access_token: row.get(3)?,
        refresh_token: row.get(4)?,
        token_expires_at: row.get(5)?,
    })
}

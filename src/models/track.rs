// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recommended track returned by `/recommend`.

use serde::{Deserialize, Serialize};

/// A single recommended track, shaped for the page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(rename = "artist")]
    pub primary_artist_name: String,
    #[serde(rename = "url")]
    pub external_url: String,
    /// Empty when the album has no artwork.
    #[serde(rename = "album_art")]
    pub album_art_url: String,
}

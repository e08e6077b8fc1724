// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emotion labels and their audio-feature targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Emotion label produced by the classifier.
///
/// Parsing never fails: labels outside the known set are kept verbatim
/// in `Other` so they can still be echoed back and mapped to the neutral
/// recommendation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Surprise,
    Disgust,
    Neutral,
    Other(String),
}

impl Emotion {
    /// Parse a classifier or client label (case-insensitive, trimmed).
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "joy" => Emotion::Joy,
            "sadness" => Emotion::Sadness,
            "anger" => Emotion::Anger,
            "fear" => Emotion::Fear,
            "love" => Emotion::Love,
            "surprise" => Emotion::Surprise,
            "disgust" => Emotion::Disgust,
            "neutral" => Emotion::Neutral,
            _ => Emotion::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Love => "love",
            Emotion::Surprise => "surprise",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
            Emotion::Other(label) => label,
        }
    }

    /// Target valence/energy used to bias recommendations.
    pub fn audio_targets(&self) -> AudioTargets {
        match self {
            Emotion::Joy => AudioTargets::new(0.8, 0.8),
            Emotion::Sadness => AudioTargets::new(0.2, 0.3),
            Emotion::Anger => AudioTargets::new(0.4, 0.9),
            Emotion::Fear => AudioTargets::new(0.3, 0.4),
            Emotion::Love => AudioTargets::new(0.7, 0.6),
            Emotion::Surprise => AudioTargets::new(0.7, 0.7),
            Emotion::Disgust | Emotion::Neutral | Emotion::Other(_) => AudioTargets::NEUTRAL,
        }
    }
}

impl From<String> for Emotion {
    fn from(label: String) -> Self {
        Emotion::from_label(&label)
    }
}

impl From<Emotion> for String {
    fn from(emotion: Emotion) -> Self {
        emotion.as_str().to_string()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spotify tunable track attributes, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioTargets {
    pub valence: f64,
    pub energy: f64,
}

impl AudioTargets {
    pub const NEUTRAL: AudioTargets = AudioTargets {
        valence: 0.5,
        energy: 0.5,
    };

    pub const fn new(valence: f64, energy: f64) -> Self {
        Self { valence, energy }
    }
}

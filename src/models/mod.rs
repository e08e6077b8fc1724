// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod emotion;
pub mod track;
pub mod user;

pub use emotion::{AudioTargets, Emotion};
pub use track::Track;
pub use user::{TokenInfo, User};

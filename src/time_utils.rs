// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::Utc;

/// Current time as a Unix timestamp in seconds.
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

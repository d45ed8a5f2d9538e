// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Millisecond-precision UTC timestamps.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// An ISO-8601 UTC timestamp truncated to millisecond precision, as required
/// by the persisted-state wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().round_subsecs(3))
    }

    pub fn from_epoch_ms(ms: u64) -> Self {
        let dt = DateTime::<Utc>::from_timestamp_millis(ms as i64).unwrap_or_else(Utc::now);
        Self(dt.round_subsecs(3))
    }

    pub fn epoch_ms(&self) -> u64 {
        self.0.timestamp_millis().max(0) as u64
    }

    pub fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.round_subsecs(3))
    }
}

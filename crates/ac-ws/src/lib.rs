// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! WebSocket fan-out: the dashboard channel, per-worker terminal channels,
//! and the git-diff channel (§4.F). Subscribes to the session/worker
//! manager's in-process event bus rather than being referenced by it,
//! breaking the obvious cycle between the two (§9).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod dashboard;
mod diff;
mod error;
mod router;
mod state;
mod terminal;

pub use error::{Result, WsError};
pub use router::router;
pub use state::{WsState, SEND_TIMEOUT};

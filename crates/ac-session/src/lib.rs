// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Session/worker manager: the central object composing PTY supervision,
//! ring-buffer/activity tracking, and persistence into session lifecycle
//! operations, with an in-process dashboard event bus for the WebSocket
//! fan-out to subscribe to.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod callbacks;
mod error;
mod events;
mod manager;
mod requests;

pub use callbacks::WorkerCallbacks;
pub use error::{Result, SessionError};
pub use events::{DashboardEvent, SessionSnapshot, WorkerSnapshot};
pub use manager::SessionManager;
pub use requests::{CreateSessionRequest, CreateWorkerRequest};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Shared state handed to every WebSocket handler.

use std::sync::Arc;
use std::time::Duration;

use ac_session::SessionManager;
use ac_storage::Store;

/// A slow or wedged consumer is dropped after this long; the session
/// manager's broadcast sends and PTY forwarding are never blocked by a
/// reader that stops draining its socket.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct WsState {
    pub sessions: Arc<SessionManager>,
    pub store: Arc<Store>,
}

impl WsState {
    pub fn new(sessions: Arc<SessionManager>, store: Arc<Store>) -> Self {
        Self { sessions, store }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Shared state for the HTTP route handlers.

use std::sync::Arc;

use ac_git::WorktreeCoordinator;
use ac_jobs::JobQueue;
use ac_session::SessionManager;
use ac_storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub sessions: Arc<SessionManager>,
    pub worktrees: Arc<WorktreeCoordinator>,
    pub jobs: JobQueue,
}

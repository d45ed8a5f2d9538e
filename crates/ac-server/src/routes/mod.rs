// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! HTTP route wiring for the repository/worktree/job surface.

mod jobs;
mod repositories;
mod sessions;
mod worktrees;

#[cfg(test)]
mod test_support;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/repositories", get(repositories::list).post(repositories::create))
        .route("/api/repositories/:id", delete(repositories::delete).patch(repositories::patch))
        .route("/api/repositories/:id/worktrees", get(worktrees::list).post(worktrees::create))
        .route("/api/repositories/:id/worktrees/*path", delete(worktrees::delete))
        .route("/api/repositories/:id/branches/:branch/remote-status", get(worktrees::remote_status))
        .route("/api/sessions", get(sessions::list).post(sessions::create))
        .route("/api/sessions/:id", get(sessions::get).delete(sessions::delete))
        .route("/api/sessions/:id/workers", get(sessions::list_workers).post(sessions::create_worker))
        .route("/api/sessions/:id/workers/:worker_id", delete(sessions::delete_worker))
        .route("/api/jobs", get(jobs::list))
        .route("/api/jobs/stats", get(jobs::stats))
        .route("/api/jobs/:id", get(jobs::get).delete(jobs::cancel))
        .route("/api/jobs/:id/retry", post(jobs::retry))
}

async fn health() -> &'static str {
    "ok"
}

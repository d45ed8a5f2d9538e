// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Route wiring for the three channel kinds. Returns a state-erased
//! [`Router`] so `ac-server` can `.merge()` it alongside its HTTP routes,
//! which carry a different `State` type.

use ac_core::{SessionId, WorkerId};
use ac_core::WorkerKind;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::dashboard::dashboard_handler;
use crate::diff::handle_git_diff;
use crate::error::WsError;
use crate::state::WsState;
use crate::terminal::handle_worker_terminal;

pub fn router(state: WsState) -> Router {
    Router::new()
        .route("/ws/dashboard", get(dashboard_handler))
        .route("/ws/session/:sid/worker/:wid", get(worker_socket_handler))
        .with_state(state)
}

async fn worker_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<WsState>,
    Path((sid, wid)): Path<(String, String)>,
) -> impl IntoResponse {
    let session_id = SessionId::from_string(sid);
    let worker_id = WorkerId::from_string(wid);

    let kind = state.sessions.get_worker(&session_id, &worker_id).map(|w| w.kind);
    match kind {
        Some(WorkerKind::GitDiff { .. }) => ws.on_upgrade(move |socket| {
            handle_git_diff(socket, state.sessions, state.store, session_id, worker_id)
        }),
        Some(_) => ws.on_upgrade(move |socket| handle_worker_terminal(socket, state.sessions, session_id, worker_id)),
        None => {
            let error = WsError::UnknownWorker(worker_id.to_string(), session_id.to_string());
            ws.on_upgrade(move |socket| async move {
                tracing::debug!(%error, "closing socket for unknown worker");
                let _ = socket;
            })
        }
    }
}

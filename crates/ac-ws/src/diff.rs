// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! The git-diff channel: a typed JSON protocol over the worker-terminal
//! URL shape, used instead of the PTY framing when the worker's kind is
//! `git-diff`.

use std::path::PathBuf;
use std::sync::Arc;

use ac_core::{SessionId, WorkerId};
use ac_git::DiffSnapshot;
use ac_session::SessionManager;
use ac_storage::Store;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::SEND_TIMEOUT;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ClientFrame {
    Refresh,
    SetBaseCommit {
        #[serde(rename = "ref")]
        commit_ref: String,
    },
    SetTargetCommit {
        #[serde(rename = "ref")]
        commit_ref: String,
    },
    RequestFileLines {
        path: String,
        start: usize,
        end: usize,
        #[serde(rename = "ref")]
        commit_ref: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ServerFrame<'a> {
    DiffData { data: &'a DiffSnapshot },
    DiffError { error: String },
    FileLines { path: String, start: usize, end: usize, lines: Vec<String> },
}

struct DiffSession {
    repo_path: PathBuf,
    base: String,
    target: String,
}

pub async fn handle_git_diff(
    socket: WebSocket,
    sessions: Arc<SessionManager>,
    store: Arc<Store>,
    session_id: SessionId,
    worker_id: WorkerId,
) {
    let (mut sink, mut stream) = socket.split();

    let Some(mut diff_session) = resolve_diff_session(&sessions, &store, &session_id, &worker_id) else {
        let _ = send_frame(&mut sink, &ServerFrame::DiffError { error: "worker is not a git-diff worker".to_string() }).await;
        return;
    };

    if refresh(&mut sink, &diff_session).await.is_err() {
        return;
    }

    loop {
        let Some(Ok(Message::Text(text))) = stream.next().await else { break };
        match serde_json::from_str::<ClientFrame>(&text) {
            Ok(ClientFrame::Refresh) => {
                if refresh(&mut sink, &diff_session).await.is_err() {
                    break;
                }
            }
            Ok(ClientFrame::SetBaseCommit { commit_ref }) => {
                diff_session.base = commit_ref;
                if refresh(&mut sink, &diff_session).await.is_err() {
                    break;
                }
            }
            Ok(ClientFrame::SetTargetCommit { commit_ref }) => {
                diff_session.target = commit_ref;
                if refresh(&mut sink, &diff_session).await.is_err() {
                    break;
                }
            }
            Ok(ClientFrame::RequestFileLines { path, start, end, commit_ref }) => {
                let result = ac_git::read_file_lines(&diff_session.repo_path, &path, &commit_ref, start, end).await;
                let outcome = match result {
                    Ok(lines) => send_frame(&mut sink, &ServerFrame::FileLines { path, start, end, lines }).await,
                    Err(err) => send_frame(&mut sink, &ServerFrame::DiffError { error: err.to_string() }).await,
                };
                if outcome.is_err() {
                    break;
                }
            }
            Err(err) => debug!(%session_id, %worker_id, error = %err, "ignoring malformed diff-channel frame"),
        }
    }
}

fn resolve_diff_session(
    sessions: &Arc<SessionManager>,
    store: &Arc<Store>,
    session_id: &SessionId,
    worker_id: &WorkerId,
) -> Option<DiffSession> {
    let session = sessions.get_session(session_id)?;
    let worker = sessions.get_worker(session_id, worker_id)?;
    let ac_core::WorkerKind::GitDiff { base_commit } = worker.kind else { return None };
    let worktree_id = session.worktree_id()?;
    let worktree = store.find_worktree(worktree_id)?;
    Some(DiffSession { repo_path: worktree.path, base: base_commit, target: "HEAD".to_string() })
}

async fn refresh(sink: &mut futures_util::stream::SplitSink<WebSocket, Message>, diff_session: &DiffSession) -> Result<(), ()> {
    match ac_git::compute_diff(&diff_session.repo_path, &diff_session.base, &diff_session.target).await {
        Ok(snapshot) => send_frame(sink, &ServerFrame::DiffData { data: &snapshot }).await,
        Err(err) => send_frame(sink, &ServerFrame::DiffError { error: err.to_string() }).await,
    }
}

async fn send_frame(sink: &mut futures_util::stream::SplitSink<WebSocket, Message>, frame: &ServerFrame<'_>) -> Result<(), ()> {
    let Ok(text) = serde_json::to_string(frame) else { return Err(()) };
    match tokio::time::timeout(SEND_TIMEOUT, sink.send(Message::Text(text))).await {
        Ok(Ok(())) => Ok(()),
        _ => Err(()),
    }
}

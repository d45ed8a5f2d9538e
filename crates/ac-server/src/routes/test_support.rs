// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Shared fixture for route handler tests: a full [`AppState`] backed by a
//! throwaway store directory, with no worker pool started (job handlers
//! are out of scope for these tests, which call route functions directly).

use std::sync::Arc;

use ac_core::builtin_agent_definitions;
use ac_git::WorktreeCoordinator;
use ac_jobs::JobQueue;
use ac_session::SessionManager;
use ac_storage::Store;

use crate::state::AppState;

pub fn fixture() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(Store::open(dir.path()).expect("open store"));
    let sessions = Arc::new(SessionManager::with_agent_definitions(store.clone(), builtin_agent_definitions()));
    let worktrees = Arc::new(WorktreeCoordinator::new(store.clone()));
    let jobs = JobQueue::new(store.clone());
    (dir, AppState { store, sessions, worktrees, jobs })
}

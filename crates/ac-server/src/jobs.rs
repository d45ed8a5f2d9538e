// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Background job handlers registered with the worker pool.

use std::sync::Arc;

use ac_core::{Job, RepositoryId};
use ac_git::WorktreeCoordinator;
use ac_jobs::JobHandler;
use ac_storage::Store;
use async_trait::async_trait;

/// Fetches the repository's remotes after a worktree is created, so the
/// new worktree's remote-tracking refs aren't stale from the moment a
/// session attaches to it. Best-effort: failures are retried by the
/// worker pool's own backoff, not escalated to the user.
pub struct WorktreeFetchHandler {
    store: Arc<Store>,
    worktrees: Arc<WorktreeCoordinator>,
}

impl WorktreeFetchHandler {
    pub fn new(store: Arc<Store>, worktrees: Arc<WorktreeCoordinator>) -> Self {
        Self { store, worktrees }
    }
}

#[async_trait]
impl JobHandler for WorktreeFetchHandler {
    async fn handle(&self, job: &Job) -> Result<(), String> {
        let repository_id = job
            .payload
            .get("repository_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "job payload missing repository_id".to_string())?;
        let repository = self
            .store
            .find_repository(&RepositoryId::from_string(repository_id))
            .ok_or_else(|| format!("repository {repository_id} no longer exists"))?;

        self.worktrees.fetch_all(&repository).await.map_err(|err| err.to_string())
    }
}

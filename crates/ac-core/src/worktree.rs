// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Worktree entity: a parallel checkout of a repository at a distinct path.

use crate::define_id;
use crate::repository::RepositoryId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

define_id! {
    /// Unique identifier for a worktree.
    pub struct WorktreeId("wt_");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worktree {
    pub id: WorktreeId,
    pub repository_id: RepositoryId,
    /// Absolute path, unique across all repositories.
    pub path: PathBuf,
    /// Monotonic per-repository index, >= 1. The main worktree is not numbered.
    pub index: u32,
    pub created_at: Timestamp,
}

impl Worktree {
    pub fn new(repository_id: RepositoryId, path: PathBuf, index: u32) -> Self {
        Self { id: WorktreeId::new(), repository_id, path, index, created_at: Timestamp::now() }
    }
}

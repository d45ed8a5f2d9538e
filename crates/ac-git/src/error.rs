// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Worktree coordinator errors.

use ac_core::{Classify, Fault};

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("i/o error running git: {0}")]
    Io(#[from] std::io::Error),

    #[error("worktree path {0} escapes the repository's managed directory")]
    PathEscapesManagedRoot(std::path::PathBuf),

    #[error("a deletion is already in progress for {0}")]
    DeletionInProgress(std::path::PathBuf),

    #[error(transparent)]
    Storage(#[from] ac_storage::StorageError),
}

impl Classify for GitError {
    fn fault(&self) -> Fault {
        match self {
            GitError::PathEscapesManagedRoot(_) => Fault::InvalidInput,
            GitError::DeletionInProgress(_) => Fault::Conflict,
            GitError::CommandFailed { .. } | GitError::Timeout { .. } | GitError::Io(_) => Fault::Internal,
            GitError::Storage(e) => e.fault(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GitError>;

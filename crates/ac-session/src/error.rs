// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Session/worker manager errors.

use ac_core::{Classify, Fault};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("repository {0} does not exist")]
    UnknownRepository(String),

    #[error("worktree {0} does not exist")]
    UnknownWorktree(String),

    #[error("path {0} does not exist or is not a directory")]
    InvalidLocation(String),

    #[error("agent definition {0} is not registered")]
    UnknownAgentDefinition(String),

    #[error(transparent)]
    Pty(#[from] ac_pty::PtyError),

    #[error(transparent)]
    Storage(#[from] ac_storage::StorageError),
}

impl Classify for SessionError {
    fn fault(&self) -> Fault {
        match self {
            SessionError::UnknownRepository(_)
            | SessionError::UnknownWorktree(_)
            | SessionError::UnknownAgentDefinition(_)
            | SessionError::InvalidLocation(_) => Fault::InvalidInput,
            SessionError::Pty(e) => e.fault(),
            SessionError::Storage(e) => e.fault(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

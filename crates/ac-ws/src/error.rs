// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! WebSocket fan-out errors. These never reach an HTTP status code — a
//! failed upgrade or a mid-stream fault just closes the socket — but are
//! typed for consistent logging across the three channel kinds.

use ac_core::{Classify, Fault};

#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("no such session {0}")]
    UnknownSession(String),

    #[error("no such worker {0} in session {1}")]
    UnknownWorker(String, String),

    #[error("worker {0} is not backed by a pseudo-terminal")]
    NotPtyBacked(String),

    #[error("worker {0} is not a git-diff worker")]
    NotGitDiff(String),

    #[error(transparent)]
    Git(#[from] ac_git::GitError),
}

impl Classify for WsError {
    fn fault(&self) -> Fault {
        match self {
            WsError::UnknownSession(_) | WsError::UnknownWorker(_, _) => Fault::NotFound,
            WsError::NotPtyBacked(_) | WsError::NotGitDiff(_) => Fault::InvalidInput,
            WsError::Git(e) => e.fault(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WsError>;

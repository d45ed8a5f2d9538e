// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! PTY supervisor errors.

use ac_core::{Classify, Fault};

#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to open pty: {0}")]
    Open(String),
    #[error("failed to spawn command: {0}")]
    Spawn(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker has already exited")]
    AlreadyExited,
}

impl Classify for PtyError {
    fn fault(&self) -> Fault {
        match self {
            PtyError::AlreadyExited => Fault::Conflict,
            _ => Fault::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, PtyError>;

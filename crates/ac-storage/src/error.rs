// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Storage-layer errors.

use ac_core::{Classify, Fault};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("i/o error at {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },

    #[error("failed to (de)serialize state: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("another agent-consoled instance holds the lock at {0}")]
    LockHeld(std::path::PathBuf),

    #[error("no {entity} found with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} path {path} is already registered")]
    DuplicatePath { entity: &'static str, path: std::path::PathBuf },
}

impl Classify for StorageError {
    fn fault(&self) -> Fault {
        match self {
            StorageError::NotFound { .. } => Fault::NotFound,
            StorageError::LockHeld(_) | StorageError::DuplicatePath { .. } => Fault::Conflict,
            StorageError::Io { .. } | StorageError::Serde(_) => Fault::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

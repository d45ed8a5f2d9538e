// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Notification dispatcher errors.

use ac_core::{Classify, Fault};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook delivery failed: {0}")]
    SendFailed(String),

    #[error(transparent)]
    Storage(#[from] ac_storage::StorageError),
}

impl Classify for NotifyError {
    fn fault(&self) -> Fault {
        match self {
            NotifyError::SendFailed(_) => Fault::Internal,
            NotifyError::Storage(e) => e.fault(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;

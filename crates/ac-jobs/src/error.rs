// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Job queue errors.

use ac_core::{Classify, Fault, JobId, JobStatus};

#[derive(Debug, thiserror::Error)]
pub enum JobsError {
    #[error("no job found with id {0}")]
    NotFound(JobId),

    #[error("job {id} is {actual:?}, expected {expected}")]
    WrongStatus { id: JobId, expected: &'static str, actual: JobStatus },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Storage(#[from] ac_storage::StorageError),
}

impl Classify for JobsError {
    fn fault(&self) -> Fault {
        match self {
            JobsError::NotFound(_) => Fault::NotFound,
            JobsError::WrongStatus { .. } => Fault::Conflict,
            JobsError::InvalidQuery(_) => Fault::InvalidInput,
            JobsError::Storage(e) => e.fault(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JobsError>;

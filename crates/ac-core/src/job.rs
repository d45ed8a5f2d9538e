// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Job entity: a unit of queued, retryable background work.

use crate::define_id;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

define_id! {
    /// Unique identifier for a queued job.
    pub struct JobId("job_");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    /// Exhausted its retry budget; requires an operator-triggered retry.
    Stalled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub status: JobStatus,
    /// Higher runs first.
    pub priority: i32,
    pub attempts: u32,
    pub max_attempts: u32,
    pub next_retry_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl Job {
    pub fn new(job_type: impl Into<String>, payload: serde_json::Value, priority: i32, max_attempts: u32) -> Self {
        Self {
            id: JobId::new(),
            job_type: job_type.into(),
            payload,
            status: JobStatus::Pending,
            priority,
            attempts: 0,
            max_attempts,
            next_retry_at: None,
            last_error: None,
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Whether this job is eligible to be pulled at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status == JobStatus::Pending && self.next_retry_at.map(|t| t <= now).unwrap_or(true)
    }

    pub fn has_retries_remaining(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

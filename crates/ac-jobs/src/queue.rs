// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Priority job queue backed directly by the persistence store: jobs are
//! read, selected, and written back through [`ac_storage::Store`] rather
//! than cached in a separate in-memory heap, so `ac-storage`'s durability
//! contract stays the single source of truth.

use std::sync::Arc;

use ac_core::{Job, JobId, JobStatus, Timestamp};
use ac_storage::Store;
use parking_lot::Mutex;

use crate::backoff::next_retry_delay;
use crate::error::{JobsError, Result};

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct JobStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub stalled: usize,
}

/// Query parameters for [`JobQueue::list`]. `limit` must be in `[1, 1000]`
/// and `offset` must be `>= 0`; violations raise [`JobsError::InvalidQuery`].
#[derive(Debug, Clone, Default)]
pub struct JobListQuery {
    pub status: Option<JobStatus>,
    pub job_type: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

const MAX_LIST_LIMIT: usize = 1000;

/// The job queue. Cheaply cloneable; the `pull_lock` serializes the
/// select-then-transition sequence of [`JobQueue::pull_next`] across
/// concurrent worker-pool tasks so two workers never claim the same job.
#[derive(Clone)]
pub struct JobQueue {
    store: Arc<Store>,
    pull_lock: Arc<Mutex<()>>,
}

impl JobQueue {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store, pull_lock: Arc::new(Mutex::new(())) }
    }

    pub fn enqueue(&self, job_type: impl Into<String>, payload: serde_json::Value, priority: i32, max_attempts: u32) -> Result<Job> {
        let job = Job::new(job_type, payload, priority, max_attempts);
        Ok(self.store.save_job(job)?)
    }

    /// Atomically select and claim the highest-priority due job, oldest
    /// first within a priority tier.
    pub fn pull_next(&self) -> Result<Option<Job>> {
        let _guard = self.pull_lock.lock();
        let now = Timestamp::now();
        let mut candidates: Vec<Job> = self.store.find_all_jobs().into_iter().filter(|j| j.is_due(now)).collect();
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.created_at.cmp(&b.created_at)));

        let Some(mut job) = candidates.into_iter().next() else {
            return Ok(None);
        };
        job.status = JobStatus::Processing;
        job.attempts += 1;
        job.started_at = Some(now);
        Ok(Some(self.store.save_job(job)?))
    }

    pub fn complete(&self, id: &JobId) -> Result<Job> {
        let mut job = self.require(id)?;
        job.status = JobStatus::Completed;
        job.completed_at = Some(Timestamp::now());
        Ok(self.store.save_job(job)?)
    }

    pub fn fail(&self, id: &JobId, error: impl Into<String>) -> Result<Job> {
        let mut job = self.require(id)?;
        job.last_error = Some(error.into());
        if job.has_retries_remaining() {
            let delay = next_retry_delay(job.attempts);
            job.next_retry_at = Some(Timestamp::from_epoch_ms(Timestamp::now().epoch_ms() + delay.as_millis() as u64));
            job.status = JobStatus::Pending;
        } else {
            job.status = JobStatus::Stalled;
        }
        Ok(self.store.save_job(job)?)
    }

    /// Operator-triggered retry of a stalled job: resets its attempt
    /// counter and returns it to the pending pool.
    pub fn retry(&self, id: &JobId) -> Result<Job> {
        let mut job = self.require(id)?;
        if job.status != JobStatus::Stalled {
            return Err(JobsError::WrongStatus { id: id.clone(), expected: "stalled", actual: job.status });
        }
        job.status = JobStatus::Pending;
        job.attempts = 0;
        job.next_retry_at = None;
        job.last_error = None;
        Ok(self.store.save_job(job)?)
    }

    /// Valid only from `pending` or `stalled` (§4.B); any other status is a
    /// wrong-status fault distinct from not-found, per the HTTP contract.
    pub fn cancel(&self, id: &JobId) -> Result<()> {
        let job = self.require(id)?;
        if !matches!(job.status, JobStatus::Pending | JobStatus::Stalled) {
            return Err(JobsError::WrongStatus { id: id.clone(), expected: "pending or stalled", actual: job.status });
        }
        Ok(self.store.delete_job(id)?)
    }

    pub fn get(&self, id: &JobId) -> Result<Job> {
        self.require(id)
    }

    /// All jobs, unfiltered and unpaginated. Kept for callers (the worker
    /// pool, job stats) that need the whole table rather than a page.
    pub fn list_all(&self) -> Vec<Job> {
        self.store.find_all_jobs()
    }

    /// Filtered, paginated listing: `(page, total_matching)`. `total` is
    /// the count of jobs matching the filter *before* pagination, so a
    /// caller can compute further pages.
    pub fn list(&self, query: JobListQuery) -> Result<(Vec<Job>, usize)> {
        if query.limit == 0 || query.limit > MAX_LIST_LIMIT {
            return Err(JobsError::InvalidQuery(format!("limit must be in [1, {MAX_LIST_LIMIT}], got {}", query.limit)));
        }

        let mut matching: Vec<Job> = self
            .store
            .find_all_jobs()
            .into_iter()
            .filter(|j| query.status.map(|s| s == j.status).unwrap_or(true))
            .filter(|j| query.job_type.as_deref().map(|t| t == j.job_type).unwrap_or(true))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len();
        let page = matching.into_iter().skip(query.offset).take(query.limit).collect();
        Ok((page, total))
    }

    pub fn stats(&self) -> JobStats {
        let mut stats = JobStats::default();
        for job in self.store.find_all_jobs() {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Stalled => stats.stalled += 1,
            }
        }
        stats
    }

    fn require(&self, id: &JobId) -> Result<Job> {
        self.store.find_job(id).ok_or_else(|| JobsError::NotFound(id.clone()))
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Priority job queue with exponential-backoff retry and a small worker
//! pool for dispatching jobs to registered handlers.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod backoff;
mod error;
mod handler;
mod queue;
mod worker_pool;

pub use error::{JobsError, Result};
pub use handler::JobHandler;
#[cfg(any(test, feature = "test-support"))]
pub use handler::test_support;
pub use queue::{JobListQuery, JobQueue, JobStats};
pub use worker_pool::WorkerPool;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Job handler registration: maps a job's `job_type` to the code that runs it.

use ac_core::Job;
use async_trait::async_trait;

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> std::result::Result<(), String>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A handler double that always succeeds, and counts its invocations.
    #[derive(Default, Clone)]
    pub struct FakeHandler {
        pub calls: Arc<AtomicUsize>,
        pub fail_with: Option<String>,
    }

    impl FakeHandler {
        pub fn succeeding() -> Self {
            Self::default()
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self { calls: Arc::new(AtomicUsize::new(0)), fail_with: Some(message.into()) }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobHandler for FakeHandler {
        async fn handle(&self, _job: &Job) -> std::result::Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(msg) => Err(msg.clone()),
                None => Ok(()),
            }
        }
    }
}

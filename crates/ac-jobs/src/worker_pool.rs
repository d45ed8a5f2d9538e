// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! A small pool of tokio tasks that pull jobs from the [`JobQueue`] and
//! dispatch them to a registered [`JobHandler`] by `job_type`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ac_core::Job;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::handler::JobHandler;
use crate::queue::JobQueue;

/// How long a worker sleeps before polling again when the queue was empty.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct WorkerPool {
    queue: JobQueue,
    handlers: Arc<RwLock<HashMap<String, Arc<dyn JobHandler>>>>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(queue: JobQueue) -> Self {
        Self { queue, handlers: Arc::new(RwLock::new(HashMap::new())), token: CancellationToken::new(), tasks: Vec::new() }
    }

    pub fn register_handler(&self, job_type: impl Into<String>, handler: Arc<dyn JobHandler>) {
        self.handlers.write().insert(job_type.into(), handler);
    }

    /// Spawn `concurrency` worker tasks.
    pub fn start(&mut self, concurrency: usize) {
        for worker_index in 0..concurrency {
            let queue = self.queue.clone();
            let handlers = Arc::clone(&self.handlers);
            let token = self.token.clone();
            let task = tokio::spawn(async move { worker_loop(worker_index, queue, handlers, token).await });
            self.tasks.push(task);
        }
        info!(concurrency, "job worker pool started");
    }

    pub async fn stop(&mut self) {
        self.token.cancel();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        info!("job worker pool stopped");
    }
}

async fn worker_loop(
    worker_index: usize,
    queue: JobQueue,
    handlers: Arc<RwLock<HashMap<String, Arc<dyn JobHandler>>>>,
    token: CancellationToken,
) {
    loop {
        if token.is_cancelled() {
            break;
        }
        let job = match queue.pull_next() {
            Ok(Some(job)) => job,
            Ok(None) => {
                tokio::select! {
                    _ = tokio::time::sleep(IDLE_POLL_INTERVAL) => {}
                    _ = token.cancelled() => break,
                }
                continue;
            }
            Err(err) => {
                error!(worker_index, error = %err, "failed to pull next job");
                tokio::time::sleep(IDLE_POLL_INTERVAL).await;
                continue;
            }
        };
        run_job(worker_index, &queue, &handlers, job).await;
    }
}

async fn run_job(
    worker_index: usize,
    queue: &JobQueue,
    handlers: &Arc<RwLock<HashMap<String, Arc<dyn JobHandler>>>>,
    job: Job,
) {
    let handler = handlers.read().get(&job.job_type).cloned();
    let Some(handler) = handler else {
        warn!(worker_index, job_type = %job.job_type, "no handler registered, stalling job");
        let _ = queue.fail(&job.id, format!("no handler registered for job_type {}", job.job_type));
        return;
    };

    match handler.handle(&job).await {
        Ok(()) => {
            let _ = queue.complete(&job.id);
        }
        Err(message) => {
            warn!(worker_index, job_id = %job.id, error = %message, "job failed");
            let _ = queue.fail(&job.id, message);
        }
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Replaceable per-worker output/exit consumers.
//!
//! A worker's active consumer is swapped on every client reconnect, so it
//! lives behind a small cell (`attach_worker_callbacks`/`detach_worker_callbacks`)
//! rather than being wired directly into the worker struct.

/// Consumer of a single worker's PTY output and exit notification. Errors
/// are the consumer's own business to handle (e.g. closing its socket);
/// they are never swallowed by the manager.
pub trait WorkerCallbacks: Send + Sync {
    fn on_data(&self, data: &[u8]);
    fn on_exit(&self, exit_code: Option<i32>);
}

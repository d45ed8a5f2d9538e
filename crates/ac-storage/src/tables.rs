// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! On-disk schema: the raw rows as they are persisted to the snapshot file.
//!
//! Session and Worker rows are kept in their untyped [`ac_core::SessionRecord`]
//! / [`ac_core::WorkerRecord`] shape here, not the validated `Session`/`Worker`
//! types — validation happens on load, one row at a time, so a single
//! corrupted row can be skipped instead of failing the whole snapshot.

use std::collections::HashMap;

use ac_core::{
    InboundEventNotification, Job, Repository, RepositorySlackIntegration, SessionRecord, WorkerRecord, Worktree,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawTables {
    pub repositories: HashMap<String, Repository>,
    pub worktrees: HashMap<String, Worktree>,
    pub sessions: HashMap<String, SessionRecord>,
    pub workers: HashMap<String, WorkerRecord>,
    pub jobs: HashMap<String, Job>,
    #[serde(default)]
    pub repository_slack_integrations: HashMap<String, RepositorySlackIntegration>,
    /// Keyed by the notification's composite dedup key, not its id, so a
    /// duplicate `create_pending_notification` call is a cheap map lookup.
    #[serde(default)]
    pub inbound_event_notifications: HashMap<String, InboundEventNotification>,
}

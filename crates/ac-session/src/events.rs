// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Dashboard channel events. Subscribers (the WebSocket fan-out) receive
//! these over a shared broadcast bus; unknown variants a reader might see
//! from a newer server build are tolerated by `#[serde(other)]`-free tagged
//! deserialization at the consumer, not here.

use ac_core::{ActivityState, RepositoryId, Session, SessionId, Worker, WorkerId, WorktreeId};
use serde::{Deserialize, Serialize};

/// A session together with its current workers and their activity states,
/// as shipped in a `sessions-sync` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: Session,
    pub workers: Vec<WorkerSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub worker: Worker,
    pub activity: ActivityState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashboardEvent {
    #[serde(rename = "sessions-sync")]
    SessionsSync { sessions: Vec<SessionSnapshot> },

    #[serde(rename = "session-created")]
    SessionCreated { session: Session },

    #[serde(rename = "session-updated")]
    SessionUpdated { session: Session },

    #[serde(rename = "session-deleted")]
    SessionDeleted { session_id: SessionId },

    #[serde(rename = "worker-activity-changed")]
    WorkerActivityChanged { session_id: SessionId, worker_id: WorkerId, activity: ActivityState },

    #[serde(rename = "worktree-creation-completed")]
    WorktreeCreationCompleted { repository_id: RepositoryId, worktree_id: WorktreeId },

    #[serde(rename = "worktree-creation-failed")]
    WorktreeCreationFailed { repository_id: RepositoryId, error: String },

    #[serde(rename = "worktree-deletion-completed")]
    WorktreeDeletionCompleted { repository_id: RepositoryId, worktree_id: WorktreeId },

    #[serde(rename = "worktree-deletion-failed")]
    WorktreeDeletionFailed { repository_id: RepositoryId, worktree_id: WorktreeId, error: String },
}

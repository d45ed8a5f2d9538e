// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Worker entity: a tagged union over `agent`, `terminal`, and `git-diff` workers.

use crate::agent_definition::AgentDefinitionId;
use crate::define_id;
use crate::session::SessionId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

define_id! {
    /// Unique identifier for a worker.
    pub struct WorkerId("wrk_");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerKind {
    Agent { agent_definition_id: AgentDefinitionId },
    Terminal,
    GitDiff { base_commit: String },
}

impl WorkerKind {
    pub fn tag(&self) -> &'static str {
        match self {
            WorkerKind::Agent { .. } => "agent",
            WorkerKind::Terminal => "terminal",
            WorkerKind::GitDiff { .. } => "git-diff",
        }
    }

    pub fn is_pty_backed(&self) -> bool {
        matches!(self, WorkerKind::Agent { .. } | WorkerKind::Terminal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub session_id: SessionId,
    pub kind: WorkerKind,
    pub name: String,
    pub pid: Option<u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Worker {
    pub fn new(session_id: SessionId, kind: WorkerKind, name: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self { id: WorkerId::new(), session_id, kind, name: name.into(), pid: None, created_at: now, updated_at: now }
    }
}

/// Raw, untyped storage/wire row, validated via [`TryFrom`] into [`Worker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: WorkerId,
    pub session_id: SessionId,
    #[serde(rename = "type")]
    pub kind: String,
    pub agent_definition_id: Option<AgentDefinitionId>,
    pub base_commit: Option<String>,
    pub name: String,
    pub pid: Option<u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkerRecordError {
    #[error("agent worker {0} is missing agent_definition_id")]
    CorruptAgentWorker(WorkerId),
    #[error("git-diff worker {0} is missing base_commit")]
    CorruptGitDiffWorker(WorkerId),
    #[error("worker {0} has unknown type {1:?}")]
    UnknownKind(WorkerId, String),
}

impl TryFrom<WorkerRecord> for Worker {
    type Error = WorkerRecordError;

    fn try_from(r: WorkerRecord) -> Result<Self, Self::Error> {
        let kind = match r.kind.as_str() {
            "agent" => {
                let agent_definition_id =
                    r.agent_definition_id.ok_or_else(|| WorkerRecordError::CorruptAgentWorker(r.id.clone()))?;
                WorkerKind::Agent { agent_definition_id }
            }
            "terminal" => WorkerKind::Terminal,
            "git-diff" => {
                let base_commit = r.base_commit.ok_or_else(|| WorkerRecordError::CorruptGitDiffWorker(r.id.clone()))?;
                WorkerKind::GitDiff { base_commit }
            }
            other => return Err(WorkerRecordError::UnknownKind(r.id.clone(), other.to_string())),
        };
        Ok(Worker { id: r.id, session_id: r.session_id, kind, name: r.name, pid: r.pid, created_at: r.created_at, updated_at: r.updated_at })
    }
}

impl From<Worker> for WorkerRecord {
    fn from(w: Worker) -> Self {
        let (kind, agent_definition_id, base_commit) = match w.kind {
            WorkerKind::Agent { agent_definition_id } => ("agent".to_string(), Some(agent_definition_id), None),
            WorkerKind::Terminal => ("terminal".to_string(), None, None),
            WorkerKind::GitDiff { base_commit } => ("git-diff".to_string(), None, Some(base_commit)),
        };
        WorkerRecord {
            id: w.id,
            session_id: w.session_id,
            kind,
            agent_definition_id,
            base_commit,
            name: w.name,
            pid: w.pid,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

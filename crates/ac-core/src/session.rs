// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Session entity: a tagged union over `quick` and `worktree` sessions.
//!
//! The wire/storage shape ([`SessionRecord`]) is untyped on the variant
//! fields so a corrupted row (e.g. `type = "worktree"` with a missing
//! `repository_id`) can be detected and rejected by [`Session::try_from`]
//! instead of panicking deep inside a loader.

use crate::define_id;
use crate::repository::RepositoryId;
use crate::timestamp::Timestamp;
use crate::worktree::WorktreeId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

define_id! {
    /// Unique identifier for a session.
    pub struct SessionId("sess_");
}

/// The variant-specific payload of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    Quick { location: PathBuf },
    Worktree { repository_id: RepositoryId, worktree_id: WorktreeId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub kind: SessionKind,
    pub title: Option<String>,
    pub initial_prompt: Option<String>,
    /// Owning-process pid. `None` means the session is paused: its owning
    /// process is gone and it has no live PTYs attached.
    pub server_pid: Option<u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    pub fn new_quick(location: PathBuf, server_pid: u32) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            kind: SessionKind::Quick { location },
            title: None,
            initial_prompt: None,
            server_pid: Some(server_pid),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_worktree(repository_id: RepositoryId, worktree_id: WorktreeId, server_pid: u32) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            kind: SessionKind::Worktree { repository_id, worktree_id },
            title: None,
            initial_prompt: None,
            server_pid: Some(server_pid),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.server_pid.is_none()
    }

    pub fn repository_id(&self) -> Option<&RepositoryId> {
        match &self.kind {
            SessionKind::Quick { .. } => None,
            SessionKind::Worktree { repository_id, .. } => Some(repository_id),
        }
    }

    pub fn worktree_id(&self) -> Option<&WorktreeId> {
        match &self.kind {
            SessionKind::Quick { .. } => None,
            SessionKind::Worktree { worktree_id, .. } => Some(worktree_id),
        }
    }

    pub fn pause(&mut self) {
        self.server_pid = None;
        self.updated_at = Timestamp::now();
    }
}

/// Raw, untyped storage/wire row. Produced verbatim by the persistence
/// layer's row reader; must be validated via [`TryFrom`] before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: Option<PathBuf>,
    pub repository_id: Option<RepositoryId>,
    pub worktree_id: Option<WorktreeId>,
    pub title: Option<String>,
    pub initial_prompt: Option<String>,
    pub server_pid: Option<u32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionRecordError {
    #[error("worktree session {0} is missing repository_id and/or worktree_id")]
    CorruptWorktreeSession(SessionId),
    #[error("quick session {0} is missing a location")]
    CorruptQuickSession(SessionId),
    #[error("session {0} has unknown type {1:?}")]
    UnknownKind(SessionId, String),
}

impl TryFrom<SessionRecord> for Session {
    type Error = SessionRecordError;

    fn try_from(r: SessionRecord) -> Result<Self, Self::Error> {
        let kind = match r.kind.as_str() {
            "quick" => {
                let location = r.location.ok_or_else(|| SessionRecordError::CorruptQuickSession(r.id.clone()))?;
                SessionKind::Quick { location }
            }
            "worktree" => {
                let (Some(repository_id), Some(worktree_id)) = (r.repository_id, r.worktree_id) else {
                    return Err(SessionRecordError::CorruptWorktreeSession(r.id.clone()));
                };
                SessionKind::Worktree { repository_id, worktree_id }
            }
            other => return Err(SessionRecordError::UnknownKind(r.id.clone(), other.to_string())),
        };
        Ok(Session {
            id: r.id,
            kind,
            title: r.title,
            initial_prompt: r.initial_prompt,
            server_pid: r.server_pid,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl From<Session> for SessionRecord {
    fn from(s: Session) -> Self {
        let (kind, location, repository_id, worktree_id) = match s.kind {
            SessionKind::Quick { location } => ("quick".to_string(), Some(location), None, None),
            SessionKind::Worktree { repository_id, worktree_id } => {
                ("worktree".to_string(), None, Some(repository_id), Some(worktree_id))
            }
        };
        SessionRecord {
            id: s.id,
            kind,
            location,
            repository_id,
            worktree_id,
            title: s.title,
            initial_prompt: s.initial_prompt,
            server_pid: s.server_pid,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

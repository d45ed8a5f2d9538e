// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! The persistence store: in-memory tables backed by an atomically-written
//! JSON snapshot, with single-instance enforcement via [`DaemonLock`].
//!
//! Every mutating call writes the snapshot through before returning, so the
//! contract callers see is the spec's direct relational one (`save` really
//! does persist) rather than an eventually-durable, event-sourced one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ac_core::{
    InboundEventNotification, Job, JobId, NotificationKey, Repository, RepositoryId, RepositorySlackIntegration,
    Session, SessionId, SessionRecord, Worker, WorkerId, WorkerRecord, Worktree, WorktreeId,
};
use parking_lot::RwLock;
use tracing::info_span;

use crate::error::{Result, StorageError};
use crate::lock::DaemonLock;
use crate::snapshot::{self, warn_corrupt_row};
use crate::tables::RawTables;

pub struct Store {
    tables: Arc<RwLock<RawTables>>,
    snapshot_path: PathBuf,
    _lock: DaemonLock,
}

impl Store {
    /// Acquire the daemon lock and load (or initialize) the state directory.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let _span = info_span!("store_open", state_dir = %state_dir.display()).entered();
        std::fs::create_dir_all(state_dir).map_err(|source| StorageError::Io { path: state_dir.to_path_buf(), source })?;
        let lock = DaemonLock::acquire(state_dir)?;
        let snapshot_path = snapshot::snapshot_path(state_dir);
        let tables = snapshot::load(&snapshot_path)?;
        Ok(Self { tables: Arc::new(RwLock::new(tables)), snapshot_path, _lock: lock })
    }

    fn persist(&self, tables: &RawTables) -> Result<()> {
        snapshot::save(&self.snapshot_path, tables)
    }

    // --- repositories ---------------------------------------------------

    pub fn find_all_repositories(&self) -> Vec<Repository> {
        self.tables.read().repositories.values().cloned().collect()
    }

    pub fn find_repository(&self, id: &RepositoryId) -> Option<Repository> {
        self.tables.read().repositories.get(id.as_str()).cloned()
    }

    /// Upsert, rejecting a path collision with a *different* repository.
    /// Paths are compared byte-exact (case-sensitive).
    pub fn save_repository(&self, repository: Repository) -> Result<Repository> {
        let mut tables = self.tables.write();
        let collision = tables
            .repositories
            .values()
            .any(|r| r.path == repository.path && r.id != repository.id);
        if collision {
            return Err(StorageError::DuplicatePath { entity: "repository", path: repository.path });
        }
        tables.repositories.insert(repository.id.to_string(), repository.clone());
        self.persist(&tables)?;
        Ok(repository)
    }

    /// Delete a repository and cascade to its worktrees and their sessions
    /// (which in turn cascade to their workers).
    pub fn delete_repository(&self, id: &RepositoryId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.repositories.remove(id.as_str()).is_none() {
            return Err(StorageError::NotFound { entity: "repository", id: id.to_string() });
        }

        let worktree_ids: Vec<String> =
            tables.worktrees.iter().filter(|(_, w)| w.repository_id == *id).map(|(k, _)| k.clone()).collect();
        for wt_id in &worktree_ids {
            tables.worktrees.remove(wt_id);
        }

        let session_ids: Vec<String> = tables
            .sessions
            .iter()
            .filter(|(_, s)| s.repository_id.as_ref() == Some(id))
            .map(|(k, _)| k.clone())
            .collect();
        for sess_id in &session_ids {
            tables.sessions.remove(sess_id);
            let worker_ids: Vec<String> =
                tables.workers.iter().filter(|(_, w)| w.session_id.as_str() == sess_id).map(|(k, _)| k.clone()).collect();
            for w_id in worker_ids {
                tables.workers.remove(&w_id);
            }
        }

        tables.repository_slack_integrations.remove(id.as_str());

        self.persist(&tables)
    }

    // --- worktrees --------------------------------------------------------

    pub fn find_worktrees_by_repository(&self, repository_id: &RepositoryId) -> Vec<Worktree> {
        self.tables.read().worktrees.values().filter(|w| w.repository_id == *repository_id).cloned().collect()
    }

    pub fn find_worktree(&self, id: &WorktreeId) -> Option<Worktree> {
        self.tables.read().worktrees.get(id.as_str()).cloned()
    }

    /// Upsert, rejecting a path collision with a *different* worktree.
    /// Paths are unique across all repositories, not just the owning one.
    pub fn save_worktree(&self, worktree: Worktree) -> Result<Worktree> {
        let mut tables = self.tables.write();
        let collision = tables.worktrees.values().any(|w| w.path == worktree.path && w.id != worktree.id);
        if collision {
            return Err(StorageError::DuplicatePath { entity: "worktree", path: worktree.path });
        }
        tables.worktrees.insert(worktree.id.to_string(), worktree.clone());
        self.persist(&tables)?;
        Ok(worktree)
    }

    pub fn delete_worktree(&self, id: &WorktreeId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.worktrees.remove(id.as_str()).is_none() {
            return Err(StorageError::NotFound { entity: "worktree", id: id.to_string() });
        }
        self.persist(&tables)
    }

    // --- sessions -----------------------------------------------------

    /// All sessions whose record parses cleanly. Corrupted rows are logged
    /// and skipped, never surfaced as a fault to the caller.
    pub fn find_all_sessions(&self) -> Vec<Session> {
        self.tables
            .read()
            .sessions
            .values()
            .cloned()
            .filter_map(|record| match Session::try_from(record) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn_corrupt_row("session", err);
                    None
                }
            })
            .collect()
    }

    pub fn find_session(&self, id: &SessionId) -> Option<Session> {
        let record = self.tables.read().sessions.get(id.as_str()).cloned()?;
        match Session::try_from(record) {
            Ok(session) => Some(session),
            Err(err) => {
                warn_corrupt_row("session", err);
                None
            }
        }
    }

    pub fn save_session(&self, session: Session) -> Result<Session> {
        let mut tables = self.tables.write();
        let record: SessionRecord = session.clone().into();
        tables.sessions.insert(record.id.to_string(), record);
        self.persist(&tables)?;
        Ok(session)
    }

    /// Delete a session and cascade to its workers.
    pub fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.sessions.remove(id.as_str()).is_none() {
            return Err(StorageError::NotFound { entity: "session", id: id.to_string() });
        }
        let worker_ids: Vec<String> =
            tables.workers.iter().filter(|(_, w)| w.session_id.as_str() == id.as_str()).map(|(k, _)| k.clone()).collect();
        for w_id in worker_ids {
            tables.workers.remove(&w_id);
        }
        self.persist(&tables)
    }

    // --- workers ------------------------------------------------------

    pub fn find_workers_by_session(&self, session_id: &SessionId) -> Vec<Worker> {
        self.tables
            .read()
            .workers
            .values()
            .cloned()
            .filter(|w| w.session_id == *session_id)
            .filter_map(|record| match Worker::try_from(record) {
                Ok(worker) => Some(worker),
                Err(err) => {
                    warn_corrupt_row("worker", err);
                    None
                }
            })
            .collect()
    }

    pub fn find_worker(&self, id: &WorkerId) -> Option<Worker> {
        let record = self.tables.read().workers.get(id.as_str()).cloned()?;
        match Worker::try_from(record) {
            Ok(worker) => Some(worker),
            Err(err) => {
                warn_corrupt_row("worker", err);
                None
            }
        }
    }

    pub fn save_worker(&self, worker: Worker) -> Result<Worker> {
        let mut tables = self.tables.write();
        let record: WorkerRecord = worker.clone().into();
        tables.workers.insert(record.id.to_string(), record);
        self.persist(&tables)?;
        Ok(worker)
    }

    pub fn delete_worker(&self, id: &WorkerId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.workers.remove(id.as_str()).is_none() {
            return Err(StorageError::NotFound { entity: "worker", id: id.to_string() });
        }
        self.persist(&tables)
    }

    /// Upsert a session together with its full, current worker set: every
    /// worker in `workers` is upserted, then any worker row belonging to
    /// this session whose id is not in `workers` is deleted. This is the
    /// one atomic operation the manager uses so a session's worker set in
    /// storage never drifts from its in-memory set.
    pub fn save_session_with_workers(&self, session: Session, workers: Vec<Worker>) -> Result<Session> {
        let mut tables = self.tables.write();
        let record: SessionRecord = session.clone().into();
        tables.sessions.insert(record.id.to_string(), record);

        let incoming_ids: std::collections::HashSet<String> =
            workers.iter().map(|w| w.id.to_string()).collect();
        for worker in workers {
            let record: WorkerRecord = worker.into();
            tables.workers.insert(record.id.to_string(), record);
        }
        let stale_ids: Vec<String> = tables
            .workers
            .iter()
            .filter(|(key, w)| w.session_id == session.id && !incoming_ids.contains(*key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale_ids {
            tables.workers.remove(&key);
        }

        self.persist(&tables)?;
        Ok(session)
    }

    /// Atomically replace the entire session table: every session row is
    /// overwritten (cascading to remove all current worker rows), and the
    /// given worker sets are reinserted from scratch.
    pub fn save_all_sessions(&self, sessions: Vec<(Session, Vec<Worker>)>) -> Result<()> {
        let mut tables = self.tables.write();
        tables.sessions.clear();
        tables.workers.clear();
        for (session, workers) in sessions {
            let record: SessionRecord = session.into();
            tables.sessions.insert(record.id.to_string(), record);
            for worker in workers {
                let record: WorkerRecord = worker.into();
                tables.workers.insert(record.id.to_string(), record);
            }
        }
        self.persist(&tables)
    }

    // --- jobs -----------------------------------------------------------

    pub fn find_all_jobs(&self) -> Vec<Job> {
        self.tables.read().jobs.values().cloned().collect()
    }

    pub fn find_job(&self, id: &JobId) -> Option<Job> {
        self.tables.read().jobs.get(id.as_str()).cloned()
    }

    pub fn save_job(&self, job: Job) -> Result<Job> {
        let mut tables = self.tables.write();
        tables.jobs.insert(job.id.to_string(), job.clone());
        self.persist(&tables)?;
        Ok(job)
    }

    pub fn delete_job(&self, id: &JobId) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.jobs.remove(id.as_str()).is_none() {
            return Err(StorageError::NotFound { entity: "job", id: id.to_string() });
        }
        self.persist(&tables)
    }

    // --- slack integrations --------------------------------------------

    pub fn find_slack_integration(&self, repository_id: &RepositoryId) -> Option<RepositorySlackIntegration> {
        self.tables.read().repository_slack_integrations.get(repository_id.as_str()).cloned()
    }

    pub fn save_slack_integration(
        &self,
        integration: RepositorySlackIntegration,
    ) -> Result<RepositorySlackIntegration> {
        let mut tables = self.tables.write();
        tables.repository_slack_integrations.insert(integration.repository_id.to_string(), integration.clone());
        self.persist(&tables)?;
        Ok(integration)
    }

    // --- inbound-event notifications -------------------------------------

    /// Idempotently create a pending notification: if a row already exists
    /// for this delivery target, return it unchanged rather than inserting
    /// a duplicate. This is the storage-layer half of the dedup invariant;
    /// the dispatcher only ever calls this before attempting delivery.
    pub fn create_pending_notification(
        &self,
        notification: InboundEventNotification,
    ) -> Result<InboundEventNotification> {
        let mut tables = self.tables.write();
        let key = notification.key().composite();
        if let Some(existing) = tables.inbound_event_notifications.get(&key) {
            return Ok(existing.clone());
        }
        tables.inbound_event_notifications.insert(key, notification.clone());
        self.persist(&tables)?;
        Ok(notification)
    }

    pub fn find_notification(&self, key: &NotificationKey) -> Option<InboundEventNotification> {
        self.tables.read().inbound_event_notifications.get(&key.composite()).cloned()
    }

    pub fn find_all_notifications(&self) -> Vec<InboundEventNotification> {
        self.tables.read().inbound_event_notifications.values().cloned().collect()
    }

    pub fn mark_notification_delivered(&self, key: &NotificationKey) -> Result<InboundEventNotification> {
        let mut tables = self.tables.write();
        let composite = key.composite();
        let mut notification = tables
            .inbound_event_notifications
            .get(&composite)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { entity: "inbound_event_notification", id: composite.clone() })?;
        notification.mark_delivered();
        tables.inbound_event_notifications.insert(composite, notification.clone());
        self.persist(&tables)?;
        Ok(notification)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

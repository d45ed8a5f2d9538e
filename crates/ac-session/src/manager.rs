// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! The session/worker manager: the in-memory map of live sessions and
//! their workers, and the single place that composes the PTY supervisor,
//! the ring buffer/activity detector, and the persistence store per §4.E.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ac_core::{
    builtin_agent_definitions, ActivityState, AgentDefinition, AgentDefinitionId, RepositoryId, Session, SessionId,
    SessionKind, SystemClock, Timestamp, Worker, WorkerId, WorkerKind, WorktreeId,
};
use ac_pty::{PtyHandle, PtySpawnConfig};
use ac_storage::Store;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::callbacks::WorkerCallbacks;
use crate::error::{Result, SessionError};
use crate::events::{DashboardEvent, SessionSnapshot, WorkerSnapshot};
use crate::requests::{CreateSessionRequest, CreateWorkerRequest};

/// Activity ticks are polled this often; see [`ac_pty::IDLE_AFTER`] for the
/// silence threshold that drives the resulting state transitions.
const ACTIVITY_TICK: Duration = Duration::from_secs(1);

struct LiveWorker {
    worker: Worker,
    pty: Option<Arc<PtyHandle<SystemClock>>>,
    callbacks: Arc<Mutex<Option<Arc<dyn WorkerCallbacks>>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(pty) = &self.pty {
            let _ = pty.kill();
        }
    }
}

struct LiveSession {
    session: Session,
    workers: HashMap<WorkerId, LiveWorker>,
}

type ActivityCallback = dyn Fn(SessionId, WorkerId, ActivityState) + Send + Sync;

/// Fired once per worker when its PTY stream closes. The exit code is
/// always `None`: `ac_pty::PtyHandle` does not currently surface the
/// child's wait status, only whether it has exited.
type ExitCallback = dyn Fn(SessionId, WorkerId, Option<i32>) + Send + Sync;

struct Shared {
    dashboard_tx: broadcast::Sender<DashboardEvent>,
    global_activity_callback: Mutex<Option<Arc<ActivityCallback>>>,
    global_exit_callback: Mutex<Option<Arc<ExitCallback>>>,
}

/// Bounded so a wedged subscriber cannot grow the channel unboundedly; it
/// simply starts missing old broadcasts, same trade-off as PTY output.
const DASHBOARD_CAPACITY: usize = 512;

pub struct SessionManager {
    store: Arc<Store>,
    server_pid: u32,
    agent_definitions: HashMap<AgentDefinitionId, AgentDefinition>,
    sessions: Mutex<HashMap<SessionId, LiveSession>>,
    shared: Arc<Shared>,
}

impl SessionManager {
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_agent_definitions(store, builtin_agent_definitions())
    }

    pub fn with_agent_definitions(store: Arc<Store>, agent_definitions: Vec<AgentDefinition>) -> Self {
        let (dashboard_tx, _) = broadcast::channel(DASHBOARD_CAPACITY);
        Self {
            store,
            server_pid: std::process::id(),
            agent_definitions: agent_definitions.into_iter().map(|d| (d.id.clone(), d)).collect(),
            sessions: Mutex::new(HashMap::new()),
            shared: Arc::new(Shared {
                dashboard_tx,
                global_activity_callback: Mutex::new(None),
                global_exit_callback: Mutex::new(None),
            }),
        }
    }

    /// Crash-recovery boot sequence (§4.E): every persisted session whose
    /// `server_pid` is set belonged to a process that is, by construction of
    /// the single-instance lock, no longer running — its pid is cleared and
    /// the session becomes paused. No PTYs are attached; a paused session's
    /// workers are not started until the user explicitly resumes it.
    pub fn recover(&self) -> Vec<Session> {
        let mut recovered = Vec::new();
        for mut session in self.store.find_all_sessions() {
            if let Some(pid) = session.server_pid {
                if pid == self.server_pid {
                    info!(session_id = %session.id, "reaping stale row from a previous instance of this process");
                } else {
                    info!(session_id = %session.id, owning_pid = pid, "owning process is gone, pausing session");
                }
                session.pause();
                match self.store.save_session(session.clone()) {
                    Ok(saved) => recovered.push(saved),
                    Err(err) => {
                        warn!(session_id = %session.id, error = %err, "failed to persist paused session");
                        recovered.push(session);
                    }
                }
            } else {
                recovered.push(session);
            }
        }
        recovered
    }

    pub fn subscribe_dashboard(&self) -> broadcast::Receiver<DashboardEvent> {
        self.shared.dashboard_tx.subscribe()
    }

    /// Used by callers outside the manager (worktree coordination) to
    /// announce async completions on the same bus.
    pub fn publish_dashboard_event(&self, event: DashboardEvent) {
        let _ = self.shared.dashboard_tx.send(event);
    }

    pub fn set_global_activity_callback(&self, callback: Arc<ActivityCallback>) {
        *self.shared.global_activity_callback.lock() = Some(callback);
    }

    /// Registers a hook fired once per worker when its PTY stream closes,
    /// independent of whatever consumer is currently attached via
    /// [`Self::attach_worker_callbacks`]. The notification dispatcher uses
    /// this to raise `worker:exited` without contending for the single
    /// attached-consumer slot that terminal streaming occupies.
    pub fn set_global_exit_callback(&self, callback: Arc<ExitCallback>) {
        *self.shared.global_exit_callback.lock() = Some(callback);
    }

    pub fn sessions_sync(&self) -> DashboardEvent {
        let sessions = self.sessions.lock();
        let snapshots = sessions
            .values()
            .map(|live| SessionSnapshot {
                session: live.session.clone(),
                workers: live
                    .workers
                    .values()
                    .map(|w| WorkerSnapshot {
                        worker: w.worker.clone(),
                        activity: w.pty.as_ref().map(|p| p.activity()).unwrap_or(ActivityState::Unknown),
                    })
                    .collect(),
            })
            .collect();
        DashboardEvent::SessionsSync { sessions: snapshots }
    }

    fn resolve_location(&self, session: &Session) -> Result<PathBuf> {
        match &session.kind {
            SessionKind::Quick { location } => Ok(location.clone()),
            SessionKind::Worktree { worktree_id, .. } => self
                .store
                .find_worktree(worktree_id)
                .map(|w| w.path)
                .ok_or_else(|| SessionError::UnknownWorktree(worktree_id.to_string())),
        }
    }

    fn spawn_worker(&self, session: &Session, kind: WorkerKind, name: String, continuing: bool) -> Result<LiveWorker> {
        let worker = Worker::new(session.id.clone(), kind.clone(), name);
        if !kind.is_pty_backed() {
            return Ok(LiveWorker { worker, pty: None, callbacks: Arc::new(Mutex::new(None)), tasks: Vec::new() });
        }

        let cwd = self.resolve_location(session)?;
        let (command, args) = if let WorkerKind::Agent { agent_definition_id } = &kind {
            let def = self
                .agent_definitions
                .get(agent_definition_id)
                .ok_or_else(|| SessionError::UnknownAgentDefinition(agent_definition_id.to_string()))?;
            (def.command.clone(), def.launch_args(continuing))
        } else {
            (default_shell(), Vec::new())
        };

        let config = PtySpawnConfig { command, args, cwd, env: Vec::new(), cols: 80, rows: 24 };
        let pty = Arc::new(PtyHandle::spawn(config, SystemClock)?);
        let callbacks: Arc<Mutex<Option<Arc<dyn WorkerCallbacks>>>> = Arc::new(Mutex::new(None));

        let mut tasks = Vec::new();
        tasks.push(spawn_forwarder(
            Arc::clone(&pty),
            Arc::clone(&callbacks),
            session.id.clone(),
            worker.id.clone(),
            Arc::clone(&self.shared),
        ));
        tasks.push(spawn_ticker(Arc::clone(&pty), session.id.clone(), worker.id.clone(), Arc::clone(&self.shared)));
        tasks.push(spawn_activity_forwarder(Arc::clone(&pty), session.id.clone(), worker.id.clone(), Arc::clone(&self.shared)));

        Ok(LiveWorker { worker, pty: Some(pty), callbacks, tasks })
    }

    pub fn create_session(&self, req: CreateSessionRequest) -> Result<Session> {
        let (mut session, agent_definition_id, title, initial_prompt) = match req {
            CreateSessionRequest::Quick { location, agent_definition_id, title, initial_prompt } => {
                if !location.is_dir() {
                    return Err(SessionError::InvalidLocation(location.display().to_string()));
                }
                (Session::new_quick(location, self.server_pid), agent_definition_id, title, initial_prompt)
            }
            CreateSessionRequest::Worktree { repository_id, worktree_id, agent_definition_id, title, initial_prompt } => {
                self.store
                    .find_repository(&repository_id)
                    .ok_or_else(|| SessionError::UnknownRepository(repository_id.to_string()))?;
                self.store
                    .find_worktree(&worktree_id)
                    .ok_or_else(|| SessionError::UnknownWorktree(worktree_id.to_string()))?;
                (Session::new_worktree(repository_id, worktree_id, self.server_pid), agent_definition_id, title, initial_prompt)
            }
        };
        session.title = title;
        session.initial_prompt = initial_prompt;

        let is_worktree = matches!(session.kind, SessionKind::Worktree { .. });

        let mut live_workers = HashMap::new();
        let agent_worker =
            self.spawn_worker(&session, WorkerKind::Agent { agent_definition_id }, "agent".to_string(), false)?;
        live_workers.insert(agent_worker.worker.id.clone(), agent_worker);

        if is_worktree {
            let diff_worker = self.spawn_worker(
                &session,
                WorkerKind::GitDiff { base_commit: "HEAD".to_string() },
                "diff".to_string(),
                false,
            )?;
            live_workers.insert(diff_worker.worker.id.clone(), diff_worker);
        }

        let worker_records: Vec<Worker> = live_workers.values().map(|w| w.worker.clone()).collect();
        self.store.save_session_with_workers(session.clone(), worker_records)?;

        self.sessions.lock().insert(session.id.clone(), LiveSession { session: session.clone(), workers: live_workers });
        self.shared.dashboard_tx.send(DashboardEvent::SessionCreated { session: session.clone() }).ok();
        Ok(session)
    }

    pub fn create_worker(&self, session_id: &SessionId, req: CreateWorkerRequest) -> Option<Worker> {
        let (kind, name, continuing) = match req {
            CreateWorkerRequest::Agent { agent_definition_id, name, continuing } => {
                if !self.agent_definitions.contains_key(&agent_definition_id) {
                    return None;
                }
                (WorkerKind::Agent { agent_definition_id }, name, continuing)
            }
            CreateWorkerRequest::Terminal { name } => (WorkerKind::Terminal, name, false),
            CreateWorkerRequest::GitDiff { name, base_commit } => (WorkerKind::GitDiff { base_commit }, name, false),
        };

        let (session, new_worker, worker_records) = {
            let mut sessions = self.sessions.lock();
            let live = sessions.get_mut(session_id)?;
            let spawned = self.spawn_worker(&live.session, kind, name, continuing).ok()?;
            let new_worker = spawned.worker.clone();
            live.workers.insert(new_worker.id.clone(), spawned);
            live.session.updated_at = Timestamp::now();
            let worker_records: Vec<Worker> = live.workers.values().map(|w| w.worker.clone()).collect();
            (live.session.clone(), new_worker, worker_records)
        };

        if self.store.save_session_with_workers(session.clone(), worker_records).is_err() {
            return None;
        }
        self.shared.dashboard_tx.send(DashboardEvent::SessionUpdated { session }).ok();
        Some(new_worker)
    }

    pub fn delete_worker(&self, session_id: &SessionId, worker_id: &WorkerId) -> bool {
        let (session, worker_records) = {
            let mut sessions = self.sessions.lock();
            let Some(live) = sessions.get_mut(session_id) else { return false };
            if live.workers.remove(worker_id).is_none() {
                return false;
            }
            live.session.updated_at = Timestamp::now();
            (live.session.clone(), live.workers.values().map(|w| w.worker.clone()).collect::<Vec<_>>())
        };
        let _ = self.store.save_session_with_workers(session.clone(), worker_records);
        self.shared.dashboard_tx.send(DashboardEvent::SessionUpdated { session }).ok();
        true
    }

    pub fn delete_session(&self, session_id: &SessionId) -> bool {
        let removed = self.sessions.lock().remove(session_id);
        if removed.is_none() {
            return false;
        }
        let _ = self.store.delete_session(session_id);
        self.shared.dashboard_tx.send(DashboardEvent::SessionDeleted { session_id: session_id.clone() }).ok();
        true
    }

    pub fn write_worker_input(&self, session_id: &SessionId, worker_id: &WorkerId, data: &[u8]) -> bool {
        let sessions = self.sessions.lock();
        let Some(live) = sessions.get(session_id) else { return false };
        let Some(worker) = live.workers.get(worker_id) else { return false };
        let Some(pty) = &worker.pty else { return false };
        pty.write(data).is_ok()
    }

    pub fn resize_worker(&self, session_id: &SessionId, worker_id: &WorkerId, cols: u16, rows: u16) -> bool {
        let sessions = self.sessions.lock();
        let Some(live) = sessions.get(session_id) else { return false };
        let Some(worker) = live.workers.get(worker_id) else { return false };
        let Some(pty) = &worker.pty else { return false };
        pty.resize(cols, rows).is_ok()
    }

    pub fn get_worker_output_buffer(&self, session_id: &SessionId, worker_id: &WorkerId) -> Option<Vec<u8>> {
        let sessions = self.sessions.lock();
        let live = sessions.get(session_id)?;
        let worker = live.workers.get(worker_id)?;
        worker.pty.as_ref().map(|p| p.scrollback())
    }

    pub fn get_worker_activity_state(&self, session_id: &SessionId, worker_id: &WorkerId) -> Option<ActivityState> {
        let sessions = self.sessions.lock();
        let live = sessions.get(session_id)?;
        let worker = live.workers.get(worker_id)?;
        Some(worker.pty.as_ref().map(|p| p.activity()).unwrap_or(ActivityState::Unknown))
    }

    pub fn attach_worker_callbacks(
        &self,
        session_id: &SessionId,
        worker_id: &WorkerId,
        callbacks: Arc<dyn WorkerCallbacks>,
    ) -> bool {
        let sessions = self.sessions.lock();
        let Some(live) = sessions.get(session_id) else { return false };
        let Some(worker) = live.workers.get(worker_id) else { return false };
        *worker.callbacks.lock() = Some(callbacks);
        true
    }

    pub fn detach_worker_callbacks(&self, session_id: &SessionId, worker_id: &WorkerId) -> bool {
        let sessions = self.sessions.lock();
        let Some(live) = sessions.get(session_id) else { return false };
        let Some(worker) = live.workers.get(worker_id) else { return false };
        *worker.callbacks.lock() = None;
        true
    }

    pub fn list_sessions(&self) -> Vec<Session> {
        self.sessions.lock().values().map(|live| live.session.clone()).collect()
    }

    pub fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.lock().get(session_id).map(|live| live.session.clone())
    }

    pub fn list_workers(&self, session_id: &SessionId) -> Vec<Worker> {
        self.sessions.lock().get(session_id).map(|live| live.workers.values().map(|w| w.worker.clone()).collect()).unwrap_or_default()
    }

    pub fn get_worker(&self, session_id: &SessionId, worker_id: &WorkerId) -> Option<Worker> {
        self.sessions.lock().get(session_id)?.workers.get(worker_id).map(|w| w.worker.clone())
    }

    pub fn repository_of(&self, session_id: &SessionId) -> Option<RepositoryId> {
        self.sessions.lock().get(session_id).and_then(|live| live.session.repository_id().cloned())
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn worktree_id_of(&self, session_id: &SessionId) -> Option<WorktreeId> {
        self.sessions.lock().get(session_id).and_then(|live| live.session.worktree_id().cloned())
    }
}

fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string())
}

fn spawn_forwarder(
    pty: Arc<PtyHandle<SystemClock>>,
    callbacks: Arc<Mutex<Option<Arc<dyn WorkerCallbacks>>>>,
    session_id: SessionId,
    worker_id: WorkerId,
    shared: Arc<Shared>,
) -> JoinHandle<()> {
    let mut rx = pty.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(bytes) => {
                    let consumer = callbacks.lock().clone();
                    if let Some(consumer) = consumer {
                        consumer.on_data(&bytes);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        let consumer = callbacks.lock().clone();
        if let Some(consumer) = consumer {
            consumer.on_exit(None);
        }
        let exit_callback = shared.global_exit_callback.lock().clone();
        if let Some(exit_callback) = exit_callback {
            exit_callback(session_id, worker_id, None);
        }
    })
}

fn spawn_ticker(
    pty: Arc<PtyHandle<SystemClock>>,
    session_id: SessionId,
    worker_id: WorkerId,
    shared: Arc<Shared>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ACTIVITY_TICK);
        loop {
            interval.tick().await;
            if pty.has_exited() {
                break;
            }
            if let Some(state) = pty.poll_activity() {
                emit_activity_transition(&shared, &session_id, &worker_id, state);
            }
        }
    })
}

/// Mirrors [`spawn_ticker`]'s silence-window transitions with the
/// transitions the PTY reader thread observes directly from output — the
/// only path by which a worker going `Active` ever reaches the dashboard
/// and the global activity callback (§4.D: fires on every non-identity
/// transition).
fn spawn_activity_forwarder(
    pty: Arc<PtyHandle<SystemClock>>,
    session_id: SessionId,
    worker_id: WorkerId,
    shared: Arc<Shared>,
) -> JoinHandle<()> {
    let mut rx = pty.subscribe_activity();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(state) => emit_activity_transition(&shared, &session_id, &worker_id, state),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn emit_activity_transition(shared: &Arc<Shared>, session_id: &SessionId, worker_id: &WorkerId, state: ActivityState) {
    shared
        .dashboard_tx
        .send(DashboardEvent::WorkerActivityChanged {
            session_id: session_id.clone(),
            worker_id: worker_id.clone(),
            activity: state,
        })
        .ok();
    let callback = shared.global_activity_callback.lock().clone();
    if let Some(callback) = callback {
        callback(session_id.clone(), worker_id.clone(), state);
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

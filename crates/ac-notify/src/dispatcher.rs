// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! The notification dispatcher (§4.G): debounces and filters agent-activity
//! transitions and worker lifecycle signals from the session manager into
//! deduplicated webhook deliveries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ac_core::{
    ActivityState, InboundEventNotification, JobId, NotificationKey, NotificationStatus, RepositoryId, SessionId,
    WorkerId,
};
use ac_session::SessionManager;
use ac_storage::Store;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::context::{activity_event_type, bypasses_debounce, EventType, NotificationContext, WORKER_ERROR, WORKER_EXITED};
use crate::handler::WebhookHandler;
use crate::trigger::TriggerFilter;

/// Two debounce defaults appear at different layers of the system this was
/// distilled from; this is the authoritative one.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(3);

type Key = (SessionId, WorkerId);

struct Pending {
    task: JoinHandle<()>,
}

struct State {
    previous_activity: HashMap<Key, ActivityState>,
    pending: HashMap<Key, Pending>,
}

pub struct Dispatcher {
    store: Arc<Store>,
    sessions: Arc<SessionManager>,
    handlers: Vec<Arc<dyn WebhookHandler>>,
    triggers: Mutex<TriggerFilter>,
    debounce_window: Duration,
    state: Mutex<State>,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>, sessions: Arc<SessionManager>, handlers: Vec<Arc<dyn WebhookHandler>>) -> Arc<Self> {
        Self::with_debounce_window(store, sessions, handlers, DEFAULT_DEBOUNCE_WINDOW)
    }

    pub fn with_debounce_window(
        store: Arc<Store>,
        sessions: Arc<SessionManager>,
        handlers: Vec<Arc<dyn WebhookHandler>>,
        debounce_window: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            sessions,
            handlers,
            triggers: Mutex::new(TriggerFilter::default()),
            debounce_window,
            state: Mutex::new(State { previous_activity: HashMap::new(), pending: HashMap::new() }),
        })
    }

    pub fn set_trigger(&self, event_type: EventType, enabled: bool) {
        self.triggers.lock().set(event_type, enabled);
    }

    /// Wires this dispatcher into a session manager's global activity and
    /// exit hooks. Call once at startup.
    pub fn install(self: &Arc<Self>, sessions: &SessionManager) {
        sessions.set_global_activity_callback(self.activity_callback());
        sessions.set_global_exit_callback(self.exit_callback());
    }

    fn activity_callback(self: &Arc<Self>) -> Arc<dyn Fn(SessionId, WorkerId, ActivityState) + Send + Sync> {
        let this = Arc::clone(self);
        Arc::new(move |session_id, worker_id, state| {
            let this = Arc::clone(&this);
            tokio::spawn(async move { this.handle_activity(session_id, worker_id, state).await });
        })
    }

    fn exit_callback(self: &Arc<Self>) -> Arc<dyn Fn(SessionId, WorkerId, Option<i32>) + Send + Sync> {
        let this = Arc::clone(self);
        Arc::new(move |session_id, worker_id, _exit_code| {
            let this = Arc::clone(&this);
            tokio::spawn(async move { this.handle_exit(session_id, worker_id).await });
        })
    }

    async fn handle_activity(self: Arc<Self>, session_id: SessionId, worker_id: WorkerId, state: ActivityState) {
        let Some(event_type) = activity_event_type(state) else {
            return;
        };
        let key = (session_id.clone(), worker_id.clone());
        let suppressed = {
            let mut inner = self.state.lock();
            let previous = inner.previous_activity.insert(key.clone(), state);
            previous == Some(ActivityState::Asking) && state == ActivityState::Idle
        };
        if suppressed {
            debug!(%session_id, %worker_id, "waiting-to-idle transition suppressed");
            return;
        }
        if !self.triggers.lock().is_enabled(event_type) {
            return;
        }
        let summary = format!("{} for session {session_id} worker {worker_id}", event_type);
        self.dispatch(NotificationContext { event_type, summary, session_id, worker_id, job_id: None });
    }

    async fn handle_exit(self: Arc<Self>, session_id: SessionId, worker_id: WorkerId) {
        if !self.triggers.lock().is_enabled(WORKER_EXITED) {
            return;
        }
        let summary = format!("worker {worker_id} exited");
        self.dispatch(NotificationContext { event_type: WORKER_EXITED, summary, session_id, worker_id, job_id: None });
    }

    /// Raised explicitly by callers that detect an application-level
    /// worker fault (a spawn failure, a handler error) rather than an
    /// ordinary exit; `ac_pty` does not surface exit codes, so `worker:error`
    /// cannot be inferred from exit status alone.
    pub fn report_worker_error(
        self: &Arc<Self>,
        session_id: SessionId,
        worker_id: WorkerId,
        job_id: Option<JobId>,
        summary: impl Into<String>,
    ) {
        if !self.triggers.lock().is_enabled(WORKER_ERROR) {
            return;
        }
        self.dispatch(NotificationContext { event_type: WORKER_ERROR, summary: summary.into(), session_id, worker_id, job_id });
    }

    /// Entry point for a job-driven delivery: the caller already knows the
    /// enclosing job, so the composite dedup key is fully populated.
    pub fn notify(self: &Arc<Self>, context: NotificationContext) {
        if !self.triggers.lock().is_enabled(context.event_type) {
            return;
        }
        self.dispatch(context);
    }

    fn dispatch(self: &Arc<Self>, context: NotificationContext) {
        if bypasses_debounce(context.event_type) {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.deliver(context).await });
            return;
        }

        let key = (context.session_id.clone(), context.worker_id.clone());
        let this = Arc::clone(self);
        let window = self.debounce_window;
        let fire_key = key.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let fired = this.state.lock().pending.remove(&fire_key).is_some();
            if fired {
                this.deliver(context).await;
            }
        });

        let mut state = self.state.lock();
        if let Some(previous) = state.pending.insert(key, Pending { task }) {
            previous.task.abort();
        }
    }

    async fn deliver(&self, context: NotificationContext) {
        let Some(repository_id) = self.sessions.repository_of(&context.session_id) else {
            debug!(session_id = %context.session_id, "session has no repository, dropping notification");
            return;
        };
        for handler in &self.handlers {
            self.deliver_to_handler(handler, &context, &repository_id).await;
        }
    }

    async fn deliver_to_handler(&self, handler: &Arc<dyn WebhookHandler>, context: &NotificationContext, repository_id: &RepositoryId) {
        if !handler.can_handle(repository_id).await {
            return;
        }

        let key = context.job_id.clone().map(|job_id| NotificationKey {
            job_id,
            session_id: context.session_id.clone(),
            worker_id: context.worker_id.clone(),
            handler_id: handler.id().to_string(),
        });

        if let Some(key) = &key {
            let pending = InboundEventNotification::pending(
                key.job_id.clone(),
                key.session_id.clone(),
                key.worker_id.clone(),
                key.handler_id.clone(),
                context.event_type,
                context.summary.clone(),
            );
            match self.store.create_pending_notification(pending) {
                Ok(existing) if existing.status == NotificationStatus::Delivered => return,
                Ok(_) => {}
                Err(err) => {
                    warn!(handler_id = handler.id(), error = %err, "failed to record pending notification");
                    return;
                }
            }
        }

        match handler.send(context, repository_id).await {
            Ok(()) => {
                if let Some(key) = &key {
                    if let Err(err) = self.store.mark_notification_delivered(key) {
                        warn!(handler_id = handler.id(), error = %err, "failed to mark notification delivered");
                    }
                }
            }
            Err(err) => {
                warn!(handler_id = handler.id(), event_type = context.event_type, error = %err, "webhook delivery failed");
            }
        }
    }

    /// Drives the same path [`Self::install`]'s activity hook would, without
    /// needing a live PTY to produce the transition.
    #[cfg(any(test, feature = "test-support"))]
    pub async fn simulate_activity(self: &Arc<Self>, session_id: SessionId, worker_id: WorkerId, state: ActivityState) {
        Arc::clone(self).handle_activity(session_id, worker_id, state).await;
    }

    /// Drives the same path [`Self::install`]'s exit hook would.
    #[cfg(any(test, feature = "test-support"))]
    pub async fn simulate_exit(self: &Arc<Self>, session_id: SessionId, worker_id: WorkerId) {
        Arc::clone(self).handle_exit(session_id, worker_id).await;
    }

    /// Clears all outstanding debounce timers. Notifications still pending
    /// at this point are dropped rather than force-delivered.
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        for (_, pending) in state.pending.drain() {
            pending.task.abort();
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

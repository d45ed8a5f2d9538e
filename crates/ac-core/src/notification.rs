// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Inbound-event-notification entity: a pending or delivered webhook
//! dispatch, deduplicated by the composite key
//! `(job_id, session_id, worker_id, handler_id)`.

use crate::define_id;
use crate::job::JobId;
use crate::session::SessionId;
use crate::timestamp::Timestamp;
use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

define_id! {
    /// Unique identifier for a dispatched notification.
    pub struct NotificationId("ntf_");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Delivered,
}

/// An event worth telling an operator about, named the way the dispatcher's
/// per-event trigger filter names them (`agent:waiting`, `worker:exited`,
/// ...). Kept as a string rather than a closed enum since the trigger map
/// is a runtime configuration, not a fixed set baked into the type.
pub type NotificationEvent = String;

/// The composite dedup key from spec: at most one notification row may
/// exist per `(job_id, session_id, worker_id, handler_id)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub job_id: JobId,
    pub session_id: SessionId,
    pub worker_id: WorkerId,
    pub handler_id: String,
}

impl NotificationKey {
    /// Stable string form, used as the storage table's row key.
    pub fn composite(&self) -> String {
        format!("{}:{}:{}:{}", self.job_id, self.session_id, self.worker_id, self.handler_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEventNotification {
    pub id: NotificationId,
    pub job_id: JobId,
    pub session_id: SessionId,
    pub worker_id: WorkerId,
    pub handler_id: String,
    pub event_type: NotificationEvent,
    pub summary: String,
    pub status: NotificationStatus,
    pub created_at: Timestamp,
    pub notified_at: Option<Timestamp>,
}

impl InboundEventNotification {
    pub fn pending(
        job_id: JobId,
        session_id: SessionId,
        worker_id: WorkerId,
        handler_id: impl Into<String>,
        event_type: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            job_id,
            session_id,
            worker_id,
            handler_id: handler_id.into(),
            event_type: event_type.into(),
            summary: summary.into(),
            status: NotificationStatus::Pending,
            created_at: Timestamp::now(),
            notified_at: None,
        }
    }

    pub fn key(&self) -> NotificationKey {
        NotificationKey {
            job_id: self.job_id.clone(),
            session_id: self.session_id.clone(),
            worker_id: self.worker_id.clone(),
            handler_id: self.handler_id.clone(),
        }
    }

    pub fn mark_delivered(&mut self) {
        self.status = NotificationStatus::Delivered;
        self.notified_at = Some(Timestamp::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_notification_has_no_notified_at() {
        let n = InboundEventNotification::pending(
            JobId::new(),
            SessionId::new(),
            WorkerId::new(),
            "slack",
            "agent:waiting",
            "waiting for input",
        );
        assert_eq!(n.status, NotificationStatus::Pending);
        assert!(n.notified_at.is_none());
    }

    #[test]
    fn marking_delivered_sets_timestamp() {
        let mut n = InboundEventNotification::pending(
            JobId::new(),
            SessionId::new(),
            WorkerId::new(),
            "slack",
            "agent:idle",
            "idle",
        );
        n.mark_delivered();
        assert_eq!(n.status, NotificationStatus::Delivered);
        assert!(n.notified_at.is_some());
    }

    #[test]
    fn composite_key_is_stable_for_same_tuple() {
        let job_id = JobId::new();
        let session_id = SessionId::new();
        let worker_id = WorkerId::new();
        let a = InboundEventNotification::pending(
            job_id.clone(),
            session_id.clone(),
            worker_id.clone(),
            "slack",
            "agent:waiting",
            "a",
        );
        let b = InboundEventNotification::pending(job_id, session_id, worker_id, "slack", "agent:waiting", "b");
        assert_eq!(a.key().composite(), b.key().composite());
    }

    #[test]
    fn composite_key_differs_by_handler() {
        let job_id = JobId::new();
        let session_id = SessionId::new();
        let worker_id = WorkerId::new();
        let a = InboundEventNotification::pending(
            job_id.clone(),
            session_id.clone(),
            worker_id.clone(),
            "slack",
            "agent:waiting",
            "a",
        );
        let b = InboundEventNotification::pending(job_id, session_id, worker_id, "email", "agent:waiting", "a");
        assert_ne!(a.key().composite(), b.key().composite());
    }
}

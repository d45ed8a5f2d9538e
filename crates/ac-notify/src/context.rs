// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Event-type vocabulary and the payload handed to a webhook handler.

use ac_core::{ActivityState, JobId, SessionId, WorkerId};

/// One of the five event tags the trigger filter and debouncer key on:
/// `agent:waiting`, `agent:idle`, `agent:active`, `worker:exited`,
/// `worker:error`.
pub type EventType = &'static str;

pub const AGENT_WAITING: EventType = "agent:waiting";
pub const AGENT_IDLE: EventType = "agent:idle";
pub const AGENT_ACTIVE: EventType = "agent:active";
pub const WORKER_EXITED: EventType = "worker:exited";
pub const WORKER_ERROR: EventType = "worker:error";

/// Maps an activity-detector state onto its event tag. `Unknown` has no
/// corresponding event: it never produces an outbound notification.
pub fn activity_event_type(state: ActivityState) -> Option<EventType> {
    match state {
        ActivityState::Unknown => None,
        ActivityState::Asking => Some(AGENT_WAITING),
        ActivityState::Idle => Some(AGENT_IDLE),
        ActivityState::Active => Some(AGENT_ACTIVE),
    }
}

/// Whether an event type bypasses debouncing. Worker lifecycle events send
/// immediately; agent-activity events are subject to the debounce window.
pub fn bypasses_debounce(event_type: EventType) -> bool {
    matches!(event_type, WORKER_EXITED | WORKER_ERROR)
}

/// Everything a [`crate::handler::WebhookHandler`] needs to compose and
/// send a delivery. `job_id` is only set for deliveries raised on a
/// job-driven path; carries no dedup weight otherwise.
#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub event_type: EventType,
    pub summary: String,
    pub session_id: SessionId,
    pub worker_id: WorkerId,
    pub job_id: Option<JobId>,
}

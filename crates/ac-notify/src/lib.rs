// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Notification dispatcher: debounced, state-transition-filtered outbound
//! webhook deliveries driven by the session manager's activity and worker
//! lifecycle signals, deduplicated via the persistence layer's inbound-event
//! notification table.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod context;
mod dispatcher;
mod error;
mod handler;
mod trigger;

pub use context::{
    activity_event_type, bypasses_debounce, EventType, NotificationContext, AGENT_ACTIVE, AGENT_IDLE, AGENT_WAITING,
    WORKER_ERROR, WORKER_EXITED,
};
pub use dispatcher::{Dispatcher, DEFAULT_DEBOUNCE_WINDOW};
pub use error::{NotifyError, Result};
pub use handler::{SlackWebhookHandler, WebhookHandler};
#[cfg(any(test, feature = "test-support"))]
pub use handler::{FakeWebhookHandler, WebhookCall};
pub use trigger::TriggerFilter;

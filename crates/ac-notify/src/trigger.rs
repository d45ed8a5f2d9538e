// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Per-event trigger filter: a static-or-configurable map of which event
//! types are enabled for delivery.

use std::collections::HashMap;

use crate::context::{EventType, AGENT_ACTIVE, AGENT_IDLE, AGENT_WAITING, WORKER_ERROR, WORKER_EXITED};

#[derive(Debug, Clone)]
pub struct TriggerFilter {
    enabled: HashMap<EventType, bool>,
}

impl TriggerFilter {
    pub fn new(enabled: HashMap<EventType, bool>) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self, event_type: EventType) -> bool {
        self.enabled.get(event_type).copied().unwrap_or(false)
    }

    pub fn set(&mut self, event_type: EventType, enabled: bool) {
        self.enabled.insert(event_type, enabled);
    }
}

impl Default for TriggerFilter {
    /// `agent:waiting` on, `agent:idle` on, `agent:active` off,
    /// `worker:error` on, `worker:exited` on.
    fn default() -> Self {
        let mut enabled = HashMap::new();
        enabled.insert(AGENT_WAITING, true);
        enabled.insert(AGENT_IDLE, true);
        enabled.insert(AGENT_ACTIVE, false);
        enabled.insert(WORKER_ERROR, true);
        enabled.insert(WORKER_EXITED, true);
        Self { enabled }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Activity detection: classifies a worker's PTY output stream into
//! [`ActivityState`] based on output recency and prompt-like patterns.

use std::time::Duration;

use ac_core::{ActivityState, Clock};

/// A worker goes idle after this much silence with no pending prompt.
pub const IDLE_AFTER: Duration = Duration::from_secs(10);

/// The trailing bytes most agent CLIs use when blocking on a yes/no or
/// free-text prompt. Matched against the tail of recent output.
const PROMPT_MARKERS: [&str; 4] = ["? ", "?\n", "› ", "> "];

pub struct ActivityDetector<C: Clock> {
    clock: C,
    state: ActivityState,
    last_output_at: Option<std::time::Instant>,
    awaiting_prompt: bool,
}

impl<C: Clock> ActivityDetector<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, state: ActivityState::Unknown, last_output_at: None, awaiting_prompt: false }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    /// Feed a chunk of output. Returns `Some(new_state)` if the state
    /// transitioned (a non-identity transition), or `None` if it held.
    pub fn on_output(&mut self, bytes: &[u8]) -> Option<ActivityState> {
        self.last_output_at = Some(self.clock.now());
        self.awaiting_prompt = ends_with_prompt_marker(bytes);
        self.transition(ActivityState::Active)
    }

    /// Poll whether the silence window has elapsed since the last output.
    /// Called periodically by the worker supervisor, not per-byte.
    pub fn on_tick(&mut self) -> Option<ActivityState> {
        let Some(last) = self.last_output_at else {
            return self.transition(ActivityState::Unknown);
        };
        if self.clock.now().duration_since(last) < IDLE_AFTER {
            return None;
        }
        let next = if self.awaiting_prompt { ActivityState::Asking } else { ActivityState::Idle };
        self.transition(next)
    }

    fn transition(&mut self, next: ActivityState) -> Option<ActivityState> {
        if self.state.should_notify(next) {
            self.state = next;
            Some(next)
        } else {
            None
        }
    }
}

fn ends_with_prompt_marker(bytes: &[u8]) -> bool {
    let tail_len = bytes.len().min(32);
    let tail = String::from_utf8_lossy(&bytes[bytes.len() - tail_len..]);
    let trimmed = tail.trim_end_matches(['\r', '\n', ' ']);
    PROMPT_MARKERS.iter().any(|marker| trimmed.ends_with(marker.trim_end()))
}

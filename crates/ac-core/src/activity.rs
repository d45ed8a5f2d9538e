// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Activity classification derived from a worker's PTY output stream.

use serde::{Deserialize, Serialize};

/// Coarse activity state of a worker, derived from recent PTY output and
/// silence duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    /// No output has been observed yet.
    #[default]
    Unknown,
    /// Output has been silent for longer than the idle threshold.
    Idle,
    /// Output arrived within the active window.
    Active,
    /// Output matched a prompt-like pattern (e.g. a trailing `? `), and has
    /// since gone silent: the agent is probably waiting on the user.
    Asking,
}

impl ActivityState {
    /// Whether a transition from `self` to `next` should fire the global
    /// activity callback. Identity transitions never fire.
    pub fn should_notify(self, next: ActivityState) -> bool {
        self != next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unknown() {
        assert_eq!(ActivityState::default(), ActivityState::Unknown);
    }

    #[test]
    fn identity_transitions_do_not_notify() {
        assert!(!ActivityState::Idle.should_notify(ActivityState::Idle));
        assert!(ActivityState::Idle.should_notify(ActivityState::Active));
    }
}

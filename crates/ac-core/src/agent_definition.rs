// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Static registry of known coding-agent CLIs.

use crate::define_id;
use serde::{Deserialize, Serialize};

define_id! {
    /// Unique identifier for an agent definition (e.g. `agent_claude-code`).
    pub struct AgentDefinitionId("agent_");
}

/// A known agent CLI: how to launch it, and how to resume an existing
/// conversation inside the same worktree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: AgentDefinitionId,
    pub display_name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Extra args appended when continuing a prior conversation rather than
    /// starting a fresh one.
    pub continue_conversation_args: Vec<String>,
}

impl AgentDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        command: impl Into<String>,
        args: Vec<String>,
        continue_conversation_args: Vec<String>,
    ) -> Self {
        Self {
            id: AgentDefinitionId::from_string(id.into()),
            display_name: display_name.into(),
            command: command.into(),
            args,
            continue_conversation_args,
        }
    }

    pub fn launch_args(&self, continuing: bool) -> Vec<String> {
        if continuing {
            let mut args = self.args.clone();
            args.extend(self.continue_conversation_args.clone());
            args
        } else {
            self.args.clone()
        }
    }
}

/// The built-in set of agent definitions shipped with the server.
pub fn builtin_agent_definitions() -> Vec<AgentDefinition> {
    vec![
        AgentDefinition::new(
            "agent_claude-code",
            "Claude Code",
            "claude",
            vec![],
            vec!["--continue".to_string()],
        ),
        AgentDefinition::new("agent_codex", "Codex CLI", "codex", vec![], vec!["resume".to_string()]),
        AgentDefinition::new("agent_aider", "Aider", "aider", vec![], vec!["--restore-chat-history".to_string()]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuing_appends_resume_args() {
        let def = &builtin_agent_definitions()[0];
        assert_eq!(def.launch_args(false), Vec::<String>::new());
        assert_eq!(def.launch_args(true), vec!["--continue".to_string()]);
    }

    #[test]
    fn builtin_ids_are_stable() {
        let ids: Vec<_> = builtin_agent_definitions().into_iter().map(|d| d.id.to_string()).collect();
        assert!(ids.contains(&"agent_claude-code".to_string()));
    }
}

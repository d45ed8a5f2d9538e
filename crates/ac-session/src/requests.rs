// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Request shapes accepted by the session/worker manager.

use ac_core::{AgentDefinitionId, RepositoryId, WorktreeId};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum CreateSessionRequest {
    Quick { location: PathBuf, agent_definition_id: AgentDefinitionId, title: Option<String>, initial_prompt: Option<String> },
    Worktree {
        repository_id: RepositoryId,
        worktree_id: WorktreeId,
        agent_definition_id: AgentDefinitionId,
        title: Option<String>,
        initial_prompt: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub enum CreateWorkerRequest {
    Agent { agent_definition_id: AgentDefinitionId, name: String, continuing: bool },
    Terminal { name: String },
    GitDiff { name: String, base_commit: String },
}

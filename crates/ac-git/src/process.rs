// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Timeout-bounded `git` subprocess invocation.

use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

use crate::error::{GitError, Result};

/// Every `git worktree`/fetch/remote invocation is bounded so a hung
/// network fetch or a wedged `git` process cannot stall the coordinator
/// indefinitely.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `git <args>` in `cwd`, with `GIT_DIR`/`GIT_WORK_TREE` scrubbed so a
/// caller's own environment never leaks into the child (the managed repo
/// is always addressed explicitly via `-C` or `cwd`).
pub async fn run_git(cwd: &std::path::Path, args: &[&str]) -> Result<CommandOutput> {
    let label = format!("git {}", args.join(" "));
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(cwd).env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");

    let output = tokio::time::timeout(GIT_TIMEOUT, cmd.output())
        .await
        .map_err(|_| GitError::Timeout { command: label.clone(), seconds: GIT_TIMEOUT.as_secs() })??;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        warn!(command = %label, %stderr, "git command failed");
        return Err(GitError::CommandFailed { command: label, stderr });
    }

    Ok(CommandOutput { stdout, stderr })
}

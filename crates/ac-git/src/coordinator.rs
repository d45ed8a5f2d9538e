// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Worktree coordinator: wraps `git worktree` operations and keeps the
//! persisted [`Worktree`] rows in sync with what is actually on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ac_core::{Repository, RepositoryId, Worktree, WorktreeId};
use ac_storage::Store;
use parking_lot::Mutex;
use tracing::info;

use crate::error::{GitError, Result};
use crate::process::run_git;
use crate::types::{CreateRequest, RemoteStatus};

/// `true` while a deletion for that path is in flight; a second deletion
/// request for the same path is rejected as a conflict rather than racing
/// the first one on the filesystem.
type DeletionGuardSet = Arc<Mutex<HashSet<PathBuf>>>;

pub struct WorktreeCoordinator {
    store: Arc<Store>,
    deletions_in_progress: DeletionGuardSet,
}

/// RAII guard: removes the path from the in-flight set on drop, so a
/// panicking or early-returning deletion never leaves the guard stuck.
struct DeletionGuard {
    set: DeletionGuardSet,
    path: PathBuf,
}

impl Drop for DeletionGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.path);
    }
}

impl WorktreeCoordinator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store, deletions_in_progress: Arc::new(Mutex::new(HashSet::new())) }
    }

    /// The directory new worktrees for `repository` are created under: the
    /// repository's own parent directory, with worktrees named
    /// `<repo-name>-<index>` as siblings of the main checkout.
    fn managed_root(repository: &Repository) -> PathBuf {
        repository.path.parent().map(Path::to_path_buf).unwrap_or_else(|| repository.path.clone())
    }

    fn repo_name(repository: &Repository) -> String {
        if repository.name.is_empty() { "repo".to_string() } else { repository.name.clone() }
    }

    /// Reject any worktree path that, once canonicalised, does not live
    /// under the repository's managed root.
    fn check_within_managed_root(repository: &Repository, path: &Path) -> Result<()> {
        let managed_root = Self::managed_root(repository);
        let canonical_root = managed_root.canonicalize().unwrap_or(managed_root);
        let candidate_parent = path.parent().unwrap_or(path);
        let canonical_candidate = candidate_parent.canonicalize().unwrap_or_else(|_| candidate_parent.to_path_buf());
        if !canonical_candidate.starts_with(&canonical_root) {
            return Err(GitError::PathEscapesManagedRoot(path.to_path_buf()));
        }
        Ok(())
    }

    /// Next free per-repository index (>= 1); the main worktree is never
    /// assigned one, so gaps left by deleted worktrees are reused.
    fn next_free_index(&self, repository_id: &RepositoryId) -> u32 {
        let used: HashSet<u32> =
            self.store.find_worktrees_by_repository(repository_id).into_iter().map(|w| w.index).collect();
        let mut candidate = 1;
        while used.contains(&candidate) {
            candidate += 1;
        }
        candidate
    }

    pub fn list(&self, repository_id: &RepositoryId) -> Vec<Worktree> {
        self.store.find_worktrees_by_repository(repository_id)
    }

    /// Create a new worktree for `repository` per `request`, persisting
    /// the resulting row.
    pub async fn create(&self, repository: &Repository, request: CreateRequest) -> Result<Worktree> {
        let index = self.next_free_index(&repository.id);
        let managed_root = Self::managed_root(repository);
        let path = managed_root.join(format!("{}-{index}", Self::repo_name(repository)));
        Self::check_within_managed_root(repository, &path)?;

        let path_str = path.display().to_string();
        let repo_str = repository.path.display().to_string();

        match request {
            CreateRequest::Prompt { prompt, base_branch } => {
                let branch = slugify_branch_name(&prompt);
                run_git(&repository.path, &["-C", &repo_str, "worktree", "add", "-b", &branch, &path_str, &base_branch])
                    .await?;
            }
            CreateRequest::Custom { branch, base_branch } => {
                run_git(&repository.path, &["-C", &repo_str, "worktree", "add", "-b", &branch, &path_str, &base_branch])
                    .await?;
            }
            CreateRequest::Existing { branch } => {
                run_git(&repository.path, &["-C", &repo_str, "worktree", "add", &path_str, &branch]).await?;
            }
        }

        let worktree = Worktree::new(repository.id.clone(), path, index);
        info!(worktree_id = %worktree.id, path = %worktree.path.display(), "created worktree");
        Ok(self.store.save_worktree(worktree)?)
    }

    /// Remove a worktree from disk and storage. A second concurrent call
    /// for the same path is rejected outright rather than racing the
    /// filesystem.
    pub async fn remove(&self, repository: &Repository, worktree: &Worktree, force: bool) -> Result<()> {
        Self::check_within_managed_root(repository, &worktree.path)?;

        {
            let mut in_progress = self.deletions_in_progress.lock();
            if !in_progress.insert(worktree.path.clone()) {
                return Err(GitError::DeletionInProgress(worktree.path.clone()));
            }
        }
        let _guard = DeletionGuard { set: Arc::clone(&self.deletions_in_progress), path: worktree.path.clone() };

        let repo_str = repository.path.display().to_string();
        let path_str = worktree.path.display().to_string();
        let mut args = vec!["-C", &repo_str, "worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_str);
        run_git(&repository.path, &args).await?;

        self.store.delete_worktree(&worktree.id)?;
        info!(worktree_id = %worktree.id, "removed worktree");
        Ok(())
    }

    pub fn find(&self, id: &WorktreeId) -> Option<Worktree> {
        self.store.find_worktree(id)
    }

    /// The `origin` remote URL, if one is configured. Used by the
    /// repository listing endpoint to attach a remote URL per repo.
    pub async fn remote_url(&self, repository: &Repository) -> Option<String> {
        run_git(&repository.path, &["remote", "get-url", "origin"]).await.ok().map(|out| out.stdout)
    }

    pub async fn default_branch(&self, repository: &Repository) -> Result<String> {
        let output = run_git(&repository.path, &["symbolic-ref", "refs/remotes/origin/HEAD"]).await;
        match output {
            Ok(out) => Ok(out.stdout.trim_start_matches("refs/remotes/origin/").to_string()),
            Err(_) => {
                // Recover locally: no remote HEAD pointer, fall back to
                // whatever the repo currently has checked out.
                let head = run_git(&repository.path, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
                Ok(head.stdout)
            }
        }
    }

    pub async fn refresh_default_branch(&self, repository: &Repository) -> Result<String> {
        let _ = run_git(&repository.path, &["remote", "set-head", "origin", "-a"]).await;
        self.default_branch(repository).await
    }

    pub async fn remote_status(&self, repository: &Repository, branch: &str) -> Result<RemoteStatus> {
        let range = format!("{branch}...origin/{branch}");
        let output = run_git(&repository.path, &["rev-list", "--left-right", "--count", &range]).await?;
        let mut parts = output.stdout.split_whitespace();
        let ahead = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let behind = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        Ok(RemoteStatus { ahead, behind })
    }

    pub async fn fetch_remote(&self, repository: &Repository, branch: &str) -> Result<()> {
        run_git(&repository.path, &["fetch", "origin", branch]).await?;
        Ok(())
    }

    pub async fn fetch_all(&self, repository: &Repository) -> Result<()> {
        run_git(&repository.path, &["fetch", "--all"]).await?;
        Ok(())
    }
}

/// Deterministic placeholder for the AI-assisted branch-name generation
/// named in the spec's glossary (`prompt` mode) but explicitly out of
/// scope: lower-cases, strips non-alphanumerics, and truncates.
fn slugify_branch_name(prompt: &str) -> String {
    let slug: String = prompt
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .take(6)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "agent/session".to_string()
    } else {
        format!("agent/{slug}")
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;

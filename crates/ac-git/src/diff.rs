// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Diff computation for git-diff workers: a structured snapshot between a
//! base and target ref, and ranged file-content reads for the diff
//! viewer's "show me lines 10-40 of this file at this ref" requests.

use std::path::Path;

use crate::error::Result;
use crate::process::run_git;
use crate::types::{DiffFileEntry, DiffFileStatus, DiffSnapshot};

/// Compute the structured diff between `base` and `target` in `repo_path`.
/// `target` is typically `"HEAD"` or a worktree's current checkout;
/// `base` is the worker's configured base commit reference.
pub async fn compute_diff(repo_path: &Path, base: &str, target: &str) -> Result<DiffSnapshot> {
    let range = format!("{base}...{target}");
    let numstat = run_git(repo_path, &["diff", "--numstat", &range]).await?;
    let name_status = run_git(repo_path, &["diff", "--name-status", &range]).await?;

    let statuses = parse_name_status(&name_status.stdout);

    let mut files = Vec::new();
    for line in numstat.stdout.lines() {
        let mut parts = line.splitn(3, '\t');
        let additions = parts.next().unwrap_or("0");
        let deletions = parts.next().unwrap_or("0");
        let Some(path) = parts.next() else { continue };

        let status = statuses.get(path).copied().unwrap_or(DiffFileStatus::Modified);
        let patch = run_git(repo_path, &["diff", &range, "--", path]).await.map(|o| o.stdout).unwrap_or_default();

        files.push(DiffFileEntry {
            path: path.to_string(),
            status,
            additions: additions.parse().unwrap_or(0),
            deletions: deletions.parse().unwrap_or(0),
            patch,
        });
    }

    Ok(DiffSnapshot { base: base.to_string(), target: target.to_string(), files })
}

fn parse_name_status(stdout: &str) -> std::collections::HashMap<String, DiffFileStatus> {
    let mut map = std::collections::HashMap::new();
    for line in stdout.lines() {
        let mut parts = line.splitn(2, '\t');
        let Some(code) = parts.next() else { continue };
        let Some(path) = parts.next() else { continue };
        let status = match code.chars().next() {
            Some('A') => DiffFileStatus::Added,
            Some('D') => DiffFileStatus::Deleted,
            Some('R') => DiffFileStatus::Renamed,
            _ => DiffFileStatus::Modified,
        };
        // A rename line is `R100\told\tnew`; only the new path matters here.
        let path = path.rsplit('\t').next().unwrap_or(path);
        map.insert(path.to_string(), status);
    }
    map
}

/// Read `[start, end]` (1-indexed, inclusive) lines of `path` as it exists
/// at `git_ref`, for the diff viewer's context-expansion requests.
pub async fn read_file_lines(repo_path: &Path, path: &str, git_ref: &str, start: usize, end: usize) -> Result<Vec<String>> {
    let spec = format!("{git_ref}:{path}");
    let output = run_git(repo_path, &["show", &spec]).await?;
    let lines: Vec<String> = output.stdout.lines().map(str::to_string).collect();
    if start == 0 || start > end {
        return Ok(Vec::new());
    }
    let start_idx = start - 1;
    let end_idx = end.min(lines.len());
    if start_idx >= lines.len() {
        return Ok(Vec::new());
    }
    Ok(lines[start_idx..end_idx].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn init_repo() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo_path = dir.path().join("demo");
        std::fs::create_dir_all(&repo_path).expect("mkdir");

        let run = |args: &[&str]| {
            let status = Command::new("git").args(args).current_dir(&repo_path).status().expect("spawn git");
            assert!(status.success(), "git {args:?} failed");
        };

        run(&["init", "-q", "-b", "main"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "Test"]);
        std::fs::write(repo_path.join("a.txt"), "line1\nline2\nline3\n").expect("write");
        run(&["add", "."]);
        run(&["commit", "-q", "-m", "initial"]);
        (dir, repo_path)
    }

    #[tokio::test]
    async fn compute_diff_reports_a_modified_file() {
        let (_dir, repo_path) = init_repo();
        std::fs::write(repo_path.join("a.txt"), "line1\nchanged\nline3\n").expect("write");
        Command::new("git").args(["add", "."]).current_dir(&repo_path).status().expect("add");
        Command::new("git").args(["commit", "-q", "-m", "edit"]).current_dir(&repo_path).status().expect("commit");

        let snapshot = compute_diff(&repo_path, "HEAD~1", "HEAD").await.expect("diff");
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.files[0].path, "a.txt");
        assert_eq!(snapshot.files[0].status, DiffFileStatus::Modified);
        assert!(snapshot.files[0].patch.contains("changed"));
    }

    #[tokio::test]
    async fn compute_diff_reports_an_added_file() {
        let (_dir, repo_path) = init_repo();
        std::fs::write(repo_path.join("b.txt"), "new file\n").expect("write");
        Command::new("git").args(["add", "."]).current_dir(&repo_path).status().expect("add");
        Command::new("git").args(["commit", "-q", "-m", "add b"]).current_dir(&repo_path).status().expect("commit");

        let snapshot = compute_diff(&repo_path, "HEAD~1", "HEAD").await.expect("diff");
        assert_eq!(snapshot.files.len(), 1);
        assert_eq!(snapshot.files[0].status, DiffFileStatus::Added);
    }

    #[tokio::test]
    async fn read_file_lines_slices_the_requested_range() {
        let (_dir, repo_path) = init_repo();
        let lines = read_file_lines(&repo_path, "a.txt", "HEAD", 2, 3).await.expect("read lines");
        assert_eq!(lines, vec!["line2".to_string(), "line3".to_string()]);
    }

    #[tokio::test]
    async fn read_file_lines_out_of_range_is_empty() {
        let (_dir, repo_path) = init_repo();
        let lines = read_file_lines(&repo_path, "a.txt", "HEAD", 10, 20).await.expect("read lines");
        assert!(lines.is_empty());
    }
}

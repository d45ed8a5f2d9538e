use super::*;
use ac_core::Repository;
use ac_storage::Store;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

/// Builds a throwaway repo with one commit on `main`, returning the tempdir
/// (kept alive for the lifetime of the test) plus an `ac-core` `Repository`
/// pointing at it.
fn init_repo() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo_path = dir.path().join("demo");
    std::fs::create_dir_all(&repo_path).expect("mkdir");

    let run = |args: &[&str]| {
        let status = Command::new("git")
            .args(args)
            .current_dir(&repo_path)
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {args:?} failed");
    };

    run(&["init", "-q", "-b", "main"]);
    run(&["config", "user.email", "test@example.com"]);
    run(&["config", "user.name", "Test"]);
    std::fs::write(repo_path.join("README.md"), "hello\n").expect("write readme");
    run(&["add", "."]);
    run(&["commit", "-q", "-m", "initial"]);

    let repository = Repository::new("demo", repo_path);
    (dir, repository)
}

fn coordinator() -> (tempfile::TempDir, WorktreeCoordinator) {
    let store_dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(store_dir.path()).expect("open store");
    (store_dir, WorktreeCoordinator::new(Arc::new(store)))
}

#[tokio::test]
async fn create_adds_a_worktree_on_a_new_branch() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    let worktree = coord
        .create(&repo, CreateRequest::Custom { branch: "agent/task-1".to_string(), base_branch: "main".to_string() })
        .await
        .expect("create");

    assert_eq!(worktree.index, 1);
    assert!(worktree.path.join("README.md").exists());
    assert_eq!(coord.list(&repo.id).len(), 1);
}

#[tokio::test]
async fn create_reuses_the_smallest_free_index() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    let first = coord
        .create(&repo, CreateRequest::Custom { branch: "agent/one".to_string(), base_branch: "main".to_string() })
        .await
        .expect("create first");
    let second = coord
        .create(&repo, CreateRequest::Custom { branch: "agent/two".to_string(), base_branch: "main".to_string() })
        .await
        .expect("create second");
    assert_eq!(first.index, 1);
    assert_eq!(second.index, 2);

    coord.remove(&repo, &first, false).await.expect("remove first");

    let third = coord
        .create(&repo, CreateRequest::Custom { branch: "agent/three".to_string(), base_branch: "main".to_string() })
        .await
        .expect("create third");
    assert_eq!(third.index, 1);
}

#[tokio::test]
async fn remove_deletes_the_worktree_and_its_row() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    let worktree = coord
        .create(&repo, CreateRequest::Custom { branch: "agent/task-1".to_string(), base_branch: "main".to_string() })
        .await
        .expect("create");
    let path = worktree.path.clone();

    coord.remove(&repo, &worktree, false).await.expect("remove");

    assert!(!path.exists());
    assert!(coord.list(&repo.id).is_empty());
}

#[tokio::test]
async fn concurrent_removal_of_the_same_worktree_is_rejected() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    let worktree = coord
        .create(&repo, CreateRequest::Custom { branch: "agent/task-1".to_string(), base_branch: "main".to_string() })
        .await
        .expect("create");

    {
        let mut guard = coord.deletions_in_progress.lock();
        guard.insert(worktree.path.clone());
    }

    let result = coord.remove(&repo, &worktree, false).await;
    assert!(matches!(result, Err(GitError::DeletionInProgress(_))));
}

#[tokio::test]
async fn worktree_path_outside_managed_root_is_rejected() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    let escaping = ac_core::Worktree::new(repo.id.clone(), PathBuf::from("/etc/passwd-worktree"), 99);
    let result = coord.remove(&repo, &escaping, false).await;
    assert!(matches!(result, Err(GitError::PathEscapesManagedRoot(_))));
}

#[tokio::test]
async fn default_branch_falls_back_to_current_head_without_a_remote() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    let branch = coord.default_branch(&repo).await.expect("default branch");
    assert_eq!(branch, "main");
}

#[tokio::test]
async fn remote_url_is_none_without_a_configured_remote() {
    let (_repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    assert_eq!(coord.remote_url(&repo).await, None);
}

#[tokio::test]
async fn create_from_existing_branch_does_not_create_a_new_one() {
    let (repo_dir, repo) = init_repo();
    let (_store_dir, coord) = coordinator();

    Command::new("git")
        .args(["branch", "feature/x"])
        .current_dir(repo_dir.path().join("demo"))
        .status()
        .expect("create branch");

    let worktree =
        coord.create(&repo, CreateRequest::Existing { branch: "feature/x".to_string() }).await.expect("create");
    assert!(worktree.path.exists());
}

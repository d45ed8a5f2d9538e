// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! `/api/repositories` CRUD.

use std::path::PathBuf;

use ac_core::{Repository, RepositoryId};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RepositoryOut {
    #[serde(flatten)]
    pub repository: Repository,
    pub remote_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub repositories: Vec<RepositoryOut>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<ListResponse>> {
    let mut repositories = Vec::new();
    for repository in state.store.find_all_repositories() {
        let remote_url = state.worktrees.remote_url(&repository).await;
        repositories.push(RepositoryOut { repository, remote_url });
    }
    Ok(Json(ListResponse { repositories }))
}

#[derive(Debug, Deserialize)]
pub struct CreateRepositoryBody {
    pub path: PathBuf,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RepositoryResponse {
    pub repository: Repository,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateRepositoryBody>,
) -> Result<(axum::http::StatusCode, Json<RepositoryResponse>)> {
    if !body.path.exists() {
        return Err(ApiError::InvalidInput(format!("path {} does not exist", body.path.display())));
    }
    let name = body.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut repository = Repository::new(name, body.path);
    repository.description = body.description;
    let saved = state.store.save_repository(repository)?;
    Ok((axum::http::StatusCode::CREATED, Json(RepositoryResponse { repository: saved })))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<axum::http::StatusCode> {
    let repository_id = RepositoryId::from_string(id);

    let referenced = state.sessions.list_sessions().iter().any(|s| s.repository_id() == Some(&repository_id))
        || state.store.find_all_sessions().iter().any(|s| s.repository_id() == Some(&repository_id));
    if referenced {
        return Err(ApiError::Conflict(format!("repository {repository_id} has sessions referencing it")));
    }

    state.store.delete_repository(&repository_id)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Absent fields are left untouched; a present empty string clears a
/// nullable field.
#[derive(Debug, Deserialize, Default)]
pub struct PatchRepositoryBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub setup_command: Option<String>,
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PatchRepositoryBody>,
) -> Result<Json<RepositoryResponse>> {
    let repository_id = RepositoryId::from_string(id);
    let mut repository = state
        .store
        .find_repository(&repository_id)
        .ok_or_else(|| ApiError::NotFound { entity: "repository", id: repository_id.to_string() })?;

    if let Some(name) = body.name {
        repository.name = name;
    }
    if let Some(description) = body.description {
        repository.description = if description.is_empty() { None } else { Some(description) };
    }
    if let Some(setup_command) = body.setup_command {
        repository.setup_command = if setup_command.is_empty() { None } else { Some(setup_command) };
    }
    repository.updated_at = ac_core::Timestamp::now();

    let saved = state.store.save_repository(repository)?;
    Ok(Json(RepositoryResponse { repository: saved }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::fixture;
    use ac_core::Classify;

    #[tokio::test]
    async fn create_rejects_a_path_that_does_not_exist() {
        let (_dir, state) = fixture();
        let body = CreateRepositoryBody { path: PathBuf::from("/no/such/path"), description: None };

        let err = create(State(state), Json(body)).await.expect_err("should reject");
        assert!(matches!(err.fault(), ac_core::Fault::InvalidInput));
    }

    #[tokio::test]
    async fn create_then_list_round_trips_the_repository() {
        let (dir, state) = fixture();
        let repo_path = dir.path().join("repo");
        std::fs::create_dir_all(&repo_path).expect("mkdir");
        let body = CreateRepositoryBody { path: repo_path.clone(), description: Some("demo".to_string()) };

        let (status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");
        assert_eq!(status, axum::http::StatusCode::CREATED);
        assert_eq!(created.repository.path, repo_path);

        let Json(listed) = list(State(state)).await.expect("list");
        assert_eq!(listed.repositories.len(), 1);
        assert_eq!(listed.repositories[0].repository.id, created.repository.id);
    }

    #[tokio::test]
    async fn patch_with_empty_description_clears_it() {
        let (dir, state) = fixture();
        let repo_path = dir.path().join("repo");
        std::fs::create_dir_all(&repo_path).expect("mkdir");
        let body = CreateRepositoryBody { path: repo_path, description: Some("demo".to_string()) };
        let (_status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");

        let patch_body = PatchRepositoryBody { description: Some(String::new()), ..Default::default() };
        let Json(patched) =
            patch(State(state), Path(created.repository.id.to_string()), Json(patch_body)).await.expect("patch");
        assert_eq!(patched.repository.description, None);
    }

    #[tokio::test]
    async fn delete_is_conflict_when_a_persisted_session_references_the_repository() {
        let (dir, state) = fixture();
        let repo_path = dir.path().join("repo");
        std::fs::create_dir_all(&repo_path).expect("mkdir");
        let body = CreateRepositoryBody { path: repo_path, description: None };
        let (_status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");

        let worktree_id = ac_core::WorktreeId::new();
        let session = ac_core::Session::new_worktree(created.repository.id.clone(), worktree_id, std::process::id());
        state.store.save_session(session).expect("save session");

        let err = delete(State(state.clone()), Path(created.repository.id.to_string())).await.expect_err("should conflict");
        assert!(matches!(err.fault(), ac_core::Fault::Conflict));
    }

    #[tokio::test]
    async fn delete_succeeds_when_nothing_references_the_repository() {
        let (dir, state) = fixture();
        let repo_path = dir.path().join("repo");
        std::fs::create_dir_all(&repo_path).expect("mkdir");
        let body = CreateRepositoryBody { path: repo_path, description: None };
        let (_status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");

        let status = delete(State(state), Path(created.repository.id.to_string())).await.expect("delete");
        assert_eq!(status, axum::http::StatusCode::NO_CONTENT);
    }
}

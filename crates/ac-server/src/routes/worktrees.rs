// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! `/api/repositories/:id/worktrees` and branch/remote-status queries.
//! Worktree creation and forced deletion are asynchronous: the HTTP
//! response returns immediately and completion is announced on the
//! dashboard channel.

use ac_core::{RepositoryId, Worktree, WorktreeId};
use ac_git::CreateRequest;
use ac_session::DashboardEvent;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub worktrees: Vec<Worktree>,
}

pub async fn list(State(state): State<AppState>, Path(repository_id): Path<String>) -> Result<Json<ListResponse>> {
    let repository_id = RepositoryId::from_string(repository_id);
    require_repository(&state, &repository_id)?;
    Ok(Json(ListResponse { worktrees: state.worktrees.list(&repository_id) }))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CreateWorktreeBody {
    Prompt { prompt: String, base_branch: String },
    Custom { branch: String, base_branch: String },
    Existing { branch: String },
}

impl From<CreateWorktreeBody> for CreateRequest {
    fn from(body: CreateWorktreeBody) -> Self {
        match body {
            CreateWorktreeBody::Prompt { prompt, base_branch } => CreateRequest::Prompt { prompt, base_branch },
            CreateWorktreeBody::Custom { branch, base_branch } => CreateRequest::Custom { branch, base_branch },
            CreateWorktreeBody::Existing { branch } => CreateRequest::Existing { branch },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

/// Kicks off worktree creation in the background and returns `202`
/// immediately; the caller is notified of the outcome over
/// `/ws/dashboard` as `worktree-creation-completed` or
/// `worktree-creation-failed`.
pub async fn create(
    State(state): State<AppState>,
    Path(repository_id): Path<String>,
    Json(body): Json<CreateWorktreeBody>,
) -> Result<(axum::http::StatusCode, Json<AcceptedResponse>)> {
    let repository_id = RepositoryId::from_string(repository_id);
    let repository = require_repository(&state, &repository_id)?;

    tokio::spawn(async move {
        match state.worktrees.create(&repository, body.into()).await {
            Ok(worktree) => {
                enqueue_background_fetch(&state, &repository_id, &worktree.id);
                state.sessions.publish_dashboard_event(DashboardEvent::WorktreeCreationCompleted {
                    repository_id,
                    worktree_id: worktree.id,
                });
            }
            Err(err) => {
                state.sessions.publish_dashboard_event(DashboardEvent::WorktreeCreationFailed {
                    repository_id,
                    error: err.to_string(),
                });
            }
        }
    });

    Ok((axum::http::StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteQuery {
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Synchronous unless `?taskId=...` is provided, in which case the removal
/// runs in the background and completion is announced on the dashboard
/// channel the same way creation is.
pub async fn delete(
    State(state): State<AppState>,
    Path((repository_id, worktree_id)): Path<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> Result<axum::http::StatusCode> {
    let repository_id = RepositoryId::from_string(repository_id);
    let worktree_id = WorktreeId::from_string(worktree_id);
    let repository = require_repository(&state, &repository_id)?;
    let worktree = state
        .worktrees
        .find(&worktree_id)
        .ok_or_else(|| ApiError::NotFound { entity: "worktree", id: worktree_id.to_string() })?;

    if query.task_id.is_some() {
        tokio::spawn(async move {
            match state.worktrees.remove(&repository, &worktree, query.force).await {
                Ok(()) => {
                    state.sessions.publish_dashboard_event(DashboardEvent::WorktreeDeletionCompleted {
                        repository_id,
                        worktree_id,
                    });
                }
                Err(err) => {
                    state.sessions.publish_dashboard_event(DashboardEvent::WorktreeDeletionFailed {
                        repository_id,
                        worktree_id,
                        error: err.to_string(),
                    });
                }
            }
        });
        return Ok(axum::http::StatusCode::ACCEPTED);
    }

    state.worktrees.remove(&repository, &worktree, query.force).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct RemoteStatusResponse {
    pub behind: u32,
    pub ahead: u32,
}

pub async fn remote_status(
    State(state): State<AppState>,
    Path((repository_id, branch)): Path<(String, String)>,
) -> Result<Json<RemoteStatusResponse>> {
    let repository_id = RepositoryId::from_string(repository_id);
    let repository = require_repository(&state, &repository_id)?;
    let status = state.worktrees.remote_status(&repository, &branch).await?;
    Ok(Json(RemoteStatusResponse { behind: status.behind, ahead: status.ahead }))
}

fn require_repository(state: &AppState, id: &RepositoryId) -> Result<ac_core::Repository> {
    state.store.find_repository(id).ok_or_else(|| ApiError::NotFound { entity: "repository", id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::fixture;
    use ac_core::{Classify, Fault};

    #[tokio::test]
    async fn list_is_not_found_for_an_unknown_repository() {
        let (_dir, state) = fixture();
        let err = list(State(state), Path(RepositoryId::new().to_string())).await.expect_err("should 404");
        assert_eq!(err.fault(), Fault::NotFound);
    }

    #[tokio::test]
    async fn list_is_empty_for_a_repository_with_no_worktrees() {
        let (dir, state) = fixture();
        let repository = ac_core::Repository::new("demo", dir.path().to_path_buf());
        let repository = state.store.save_repository(repository).expect("save");

        let Json(response) = list(State(state), Path(repository.id.to_string())).await.expect("list");
        assert!(response.worktrees.is_empty());
    }

    #[tokio::test]
    async fn create_is_accepted_immediately_for_a_known_repository() {
        let (dir, state) = fixture();
        let repository = ac_core::Repository::new("demo", dir.path().to_path_buf());
        let repository = state.store.save_repository(repository).expect("save");

        let body = CreateWorktreeBody::Existing { branch: "main".to_string() };
        let (status, Json(response)) =
            create(State(state), Path(repository.id.to_string()), Json(body)).await.expect("create");
        assert_eq!(status, axum::http::StatusCode::ACCEPTED);
        assert!(response.accepted);
    }

    #[tokio::test]
    async fn create_is_not_found_for_an_unknown_repository() {
        let (_dir, state) = fixture();
        let body = CreateWorktreeBody::Existing { branch: "main".to_string() };
        let err = create(State(state), Path(RepositoryId::new().to_string()), Json(body)).await.expect_err("should 404");
        assert_eq!(err.fault(), Fault::NotFound);
    }

    #[tokio::test]
    async fn delete_is_not_found_for_an_unknown_worktree() {
        let (dir, state) = fixture();
        let repository = ac_core::Repository::new("demo", dir.path().to_path_buf());
        let repository = state.store.save_repository(repository).expect("save");

        let err = delete(
            State(state),
            Path((repository.id.to_string(), WorktreeId::new().to_string())),
            Query(DeleteQuery::default()),
        )
        .await
        .expect_err("should 404");
        assert_eq!(err.fault(), Fault::NotFound);
    }
}

/// Best-effort remote fetch after a worktree is created, so the session
/// that attaches to it starts with up-to-date remote-tracking refs. Not
/// part of the synchronous creation path: a slow or failing fetch must
/// never delay `worktree-creation-completed`.
fn enqueue_background_fetch(state: &AppState, repository_id: &RepositoryId, worktree_id: &WorktreeId) {
    let payload = serde_json::json!({ "repository_id": repository_id.to_string(), "worktree_id": worktree_id.to_string() });
    if let Err(err) = state.jobs.enqueue("worktree_fetch", payload, 0, 3) {
        tracing::warn!(%repository_id, %worktree_id, error = %err, "failed to enqueue background fetch job");
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! `/api/sessions` CRUD. Session and worker lifecycle otherwise flows
//! through `/ws/dashboard` broadcasts and the per-worker WebSocket
//! channels (§4.F); these routes are the synchronous create/destroy
//! entry points clients use before attaching a socket.

use ac_core::{AgentDefinitionId, RepositoryId, SessionId, Worker, WorkerId, WorktreeId};
use ac_session::{CreateSessionRequest, CreateWorkerRequest, Session};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub sessions: Vec<Session>,
}

pub async fn list(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse { sessions: state.sessions.list_sessions() })
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<SessionResponse>> {
    let id = SessionId::from_string(id);
    let session = state.sessions.get_session(&id).ok_or_else(|| ApiError::NotFound { entity: "session", id: id.to_string() })?;
    Ok(Json(SessionResponse { session }))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateSessionBody {
    Quick { location: PathBuf, agent_definition_id: String, title: Option<String>, initial_prompt: Option<String> },
    Worktree {
        repository_id: String,
        worktree_id: String,
        agent_definition_id: String,
        title: Option<String>,
        initial_prompt: Option<String>,
    },
}

impl From<CreateSessionBody> for CreateSessionRequest {
    fn from(body: CreateSessionBody) -> Self {
        match body {
            CreateSessionBody::Quick { location, agent_definition_id, title, initial_prompt } => {
                CreateSessionRequest::Quick {
                    location,
                    agent_definition_id: AgentDefinitionId::from_string(agent_definition_id),
                    title,
                    initial_prompt,
                }
            }
            CreateSessionBody::Worktree { repository_id, worktree_id, agent_definition_id, title, initial_prompt } => {
                CreateSessionRequest::Worktree {
                    repository_id: RepositoryId::from_string(repository_id),
                    worktree_id: WorktreeId::from_string(worktree_id),
                    agent_definition_id: AgentDefinitionId::from_string(agent_definition_id),
                    title,
                    initial_prompt,
                }
            }
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionBody>,
) -> Result<(axum::http::StatusCode, Json<SessionResponse>)> {
    let session = state.sessions.create_session(body.into())?;
    Ok((axum::http::StatusCode::CREATED, Json(SessionResponse { session })))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<axum::http::StatusCode> {
    let id = SessionId::from_string(id);
    if !state.sessions.delete_session(&id) {
        return Err(ApiError::NotFound { entity: "session", id: id.to_string() });
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ListWorkersResponse {
    pub workers: Vec<Worker>,
}

pub async fn list_workers(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ListWorkersResponse>> {
    let session_id = SessionId::from_string(session_id);
    require_session(&state, &session_id)?;
    Ok(Json(ListWorkersResponse { workers: state.sessions.list_workers(&session_id) }))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateWorkerBody {
    Agent { agent_definition_id: String, name: String, #[serde(default)] continuing: bool },
    Terminal { name: String },
    GitDiff { name: String, base_commit: String },
}

impl From<CreateWorkerBody> for CreateWorkerRequest {
    fn from(body: CreateWorkerBody) -> Self {
        match body {
            CreateWorkerBody::Agent { agent_definition_id, name, continuing } => {
                CreateWorkerRequest::Agent { agent_definition_id: AgentDefinitionId::from_string(agent_definition_id), name, continuing }
            }
            CreateWorkerBody::Terminal { name } => CreateWorkerRequest::Terminal { name },
            CreateWorkerBody::GitDiff { name, base_commit } => CreateWorkerRequest::GitDiff { name, base_commit },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    pub worker: Worker,
}

pub async fn create_worker(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<CreateWorkerBody>,
) -> Result<(axum::http::StatusCode, Json<WorkerResponse>)> {
    let session_id = SessionId::from_string(session_id);
    let worker = state
        .sessions
        .create_worker(&session_id, body.into())
        .ok_or_else(|| ApiError::NotFound { entity: "session", id: session_id.to_string() })?;
    Ok((axum::http::StatusCode::CREATED, Json(WorkerResponse { worker })))
}

pub async fn delete_worker(
    State(state): State<AppState>,
    Path((session_id, worker_id)): Path<(String, String)>,
) -> Result<axum::http::StatusCode> {
    let session_id = SessionId::from_string(session_id);
    let worker_id = WorkerId::from_string(worker_id);
    if !state.sessions.delete_worker(&session_id, &worker_id) {
        return Err(ApiError::NotFound { entity: "worker", id: worker_id.to_string() });
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn require_session(state: &AppState, id: &SessionId) -> Result<()> {
    state.sessions.get_session(id).map(|_| ()).ok_or_else(|| ApiError::NotFound { entity: "session", id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::fixture;
    use ac_core::Fault;

    #[tokio::test]
    async fn create_then_list_round_trips_a_quick_session() {
        let (dir, state) = fixture();
        let body = CreateSessionBody::Quick {
            location: dir.path().to_path_buf(),
            agent_definition_id: "agent_claude-code".to_string(),
            title: None,
            initial_prompt: None,
        };

        let (status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");
        assert_eq!(status, axum::http::StatusCode::CREATED);

        let Json(listed) = list(State(state)).await;
        assert_eq!(listed.sessions.len(), 1);
        assert_eq!(listed.sessions[0].id, created.session.id);
    }

    #[tokio::test]
    async fn create_with_unknown_worktree_is_invalid_input() {
        let (_dir, state) = fixture();
        let body = CreateSessionBody::Worktree {
            repository_id: RepositoryId::new().to_string(),
            worktree_id: WorktreeId::new().to_string(),
            agent_definition_id: "agent_claude-code".to_string(),
            title: None,
            initial_prompt: None,
        };

        let err = create(State(state), Json(body)).await.expect_err("should reject");
        assert_eq!(err.fault(), Fault::InvalidInput);
    }

    #[tokio::test]
    async fn get_is_not_found_for_an_unknown_session() {
        let (_dir, state) = fixture();
        let err = get(State(state), Path(SessionId::new().to_string())).await.expect_err("should 404");
        assert_eq!(err.fault(), Fault::NotFound);
    }

    #[tokio::test]
    async fn delete_removes_a_session_and_cascades_its_workers() {
        let (dir, state) = fixture();
        let body = CreateSessionBody::Quick {
            location: dir.path().to_path_buf(),
            agent_definition_id: "agent_claude-code".to_string(),
            title: None,
            initial_prompt: None,
        };
        let (_status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");

        let status = delete(State(state.clone()), Path(created.session.id.to_string())).await.expect("delete");
        assert_eq!(status, axum::http::StatusCode::NO_CONTENT);

        let err = get(State(state), Path(created.session.id.to_string())).await.expect_err("should 404 now");
        assert_eq!(err.fault(), Fault::NotFound);
    }

    #[tokio::test]
    async fn create_worker_appends_a_terminal_worker() {
        let (dir, state) = fixture();
        let body = CreateSessionBody::Quick {
            location: dir.path().to_path_buf(),
            agent_definition_id: "agent_claude-code".to_string(),
            title: None,
            initial_prompt: None,
        };
        let (_status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");

        let worker_body = CreateWorkerBody::Terminal { name: "shell".to_string() };
        let (status, Json(_response)) =
            create_worker(State(state.clone()), Path(created.session.id.to_string()), Json(worker_body))
                .await
                .expect("create worker");
        assert_eq!(status, axum::http::StatusCode::CREATED);

        let Json(workers) = list_workers(State(state), Path(created.session.id.to_string())).await.expect("list workers");
        assert_eq!(workers.workers.len(), 2);
    }

    #[tokio::test]
    async fn delete_worker_on_unknown_worker_is_not_found() {
        let (dir, state) = fixture();
        let body = CreateSessionBody::Quick {
            location: dir.path().to_path_buf(),
            agent_definition_id: "agent_claude-code".to_string(),
            title: None,
            initial_prompt: None,
        };
        let (_status, Json(created)) = create(State(state.clone()), Json(body)).await.expect("create");

        let err = delete_worker(State(state), Path((created.session.id.to_string(), WorkerId::new().to_string())))
            .await
            .expect_err("should 404");
        assert_eq!(err.fault(), Fault::NotFound);
    }
}

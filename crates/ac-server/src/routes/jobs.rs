// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! `/api/jobs` read/control surface over [`ac_jobs::JobQueue`].

use ac_core::{Job, JobId, JobStatus};
use ac_jobs::{JobListQuery, JobStats};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<JobStatus>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Json<ListResponse>> {
    let (jobs, total) = state.jobs.list(JobListQuery {
        status: query.status,
        job_type: query.job_type,
        limit: query.limit.unwrap_or(50),
        offset: query.offset.unwrap_or(0),
    })?;
    Ok(Json(ListResponse { jobs, total }))
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobResponse>> {
    let job = state.jobs.get(&JobId::from_string(id))?;
    Ok(Json(JobResponse { job }))
}

pub async fn stats(State(state): State<AppState>) -> Json<JobStats> {
    Json(state.jobs.stats())
}

pub async fn retry(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<JobResponse>> {
    let job = state.jobs.retry(&JobId::from_string(id))?;
    Ok(Json(JobResponse { job }))
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> Result<axum::http::StatusCode> {
    let id = JobId::from_string(id);
    state.jobs.cancel(&id)?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::fixture;

    #[tokio::test]
    async fn list_reflects_an_enqueued_job() {
        let (_dir, state) = fixture();
        state.jobs.enqueue("worktree_fetch", serde_json::json!({}), 0, 3).expect("enqueue");

        let Json(response) = list(State(state), Query(ListQuery::default())).await.expect("list");
        assert_eq!(response.total, 1);
        assert_eq!(response.jobs[0].job_type, "worktree_fetch");
    }

    #[tokio::test]
    async fn stats_counts_a_pending_job() {
        let (_dir, state) = fixture();
        state.jobs.enqueue("worktree_fetch", serde_json::json!({}), 0, 3).expect("enqueue");

        let Json(stats) = stats(State(state)).await;
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.processing, 0);
    }

    #[tokio::test]
    async fn cancel_rejects_a_processing_job() {
        let (_dir, state) = fixture();
        let job = state.jobs.enqueue("worktree_fetch", serde_json::json!({}), 0, 3).expect("enqueue");
        state.jobs.pull_next().expect("pull").expect("a job was due");

        let err = cancel(State(state), Path(job.id.to_string())).await.expect_err("should reject");
        assert!(matches!(err, crate::error::ApiError::Jobs(ac_jobs::JobsError::WrongStatus { .. })));
    }

    #[tokio::test]
    async fn retry_resets_a_stalled_job() {
        let (_dir, state) = fixture();
        let job = state.jobs.enqueue("worktree_fetch", serde_json::json!({}), 0, 1).expect("enqueue");
        state.jobs.pull_next().expect("pull").expect("a job was due");
        state.jobs.fail(&job.id, "boom").expect("fail exhausts the single retry");

        let Json(response) = retry(State(state), Path(job.id.to_string())).await.expect("retry");
        assert_eq!(response.job.status, JobStatus::Pending);
        assert_eq!(response.job.attempts, 0);
    }
}

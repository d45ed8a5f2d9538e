// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Maps each crate's typed error onto an HTTP response via [`ac_core::Fault`],
//! so route handlers can just `?` and never hand-roll a status code.

use ac_core::{Classify, Fault};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] ac_storage::StorageError),

    #[error(transparent)]
    Git(#[from] ac_git::GitError),

    #[error(transparent)]
    Session(#[from] ac_session::SessionError),

    #[error(transparent)]
    Jobs(#[from] ac_jobs::JobsError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("no {entity} found with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),
}

impl Classify for ApiError {
    fn fault(&self) -> Fault {
        match self {
            ApiError::Storage(e) => e.fault(),
            ApiError::Git(e) => e.fault(),
            ApiError::Session(e) => e.fault(),
            ApiError::Jobs(e) => e.fault(),
            ApiError::InvalidInput(_) => Fault::InvalidInput,
            ApiError::NotFound { .. } => Fault::NotFound,
            ApiError::Conflict(_) => Fault::Conflict,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.fault() {
            Fault::NotFound => StatusCode::NOT_FOUND,
            Fault::Conflict => StatusCode::CONFLICT,
            Fault::InvalidInput => StatusCode::BAD_REQUEST,
            Fault::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Repository entity: a registered source-code checkout.

use crate::define_id;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

define_id! {
    /// Unique identifier for a registered repository.
    pub struct RepositoryId("repo_");
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    /// Absolute, byte-exact unique path on disk.
    pub path: PathBuf,
    pub setup_command: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Repository {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        let now = Timestamp::now();
        Self {
            id: RepositoryId::new(),
            name: name.into(),
            path,
            setup_command: None,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Per-repository Slack webhook configuration for inbound-event notifications.

use crate::repository::RepositoryId;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySlackIntegration {
    pub repository_id: RepositoryId,
    pub webhook_url: String,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RepositorySlackIntegration {
    pub fn new(repository_id: RepositoryId, webhook_url: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self { repository_id, webhook_url: webhook_url.into(), enabled: true, created_at: now, updated_at: now }
    }
}

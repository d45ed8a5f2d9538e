// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Webhook delivery. Mirrors the desktop-notification adapter pattern: a
//! small async trait the dispatcher drives, with a real implementation and
//! a recording fake for tests.

use std::sync::Arc;

use ac_core::RepositoryId;
use ac_storage::Store;
use async_trait::async_trait;

use crate::context::NotificationContext;
use crate::error::NotifyError;

/// A delivery sink for outbound notifications. `can_handle` lets a handler
/// opt out per-repository (e.g. no webhook configured, or disabled)
/// without the dispatcher knowing about handler-specific configuration.
#[async_trait]
pub trait WebhookHandler: Send + Sync + 'static {
    /// Stable identifier, used as the `handler_id` half of the
    /// notification dedup key.
    fn id(&self) -> &str;

    async fn can_handle(&self, repository_id: &RepositoryId) -> bool;

    async fn send(&self, context: &NotificationContext, repository_id: &RepositoryId) -> Result<(), NotifyError>;
}

/// Delivers to the Slack-compatible incoming webhook URL configured per
/// repository via [`ac_core::RepositorySlackIntegration`].
pub struct SlackWebhookHandler {
    store: Arc<Store>,
    client: reqwest::Client,
}

impl SlackWebhookHandler {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl WebhookHandler for SlackWebhookHandler {
    fn id(&self) -> &str {
        "slack"
    }

    async fn can_handle(&self, repository_id: &RepositoryId) -> bool {
        self.store.find_slack_integration(repository_id).map(|integration| integration.enabled).unwrap_or(false)
    }

    async fn send(&self, context: &NotificationContext, repository_id: &RepositoryId) -> Result<(), NotifyError> {
        let integration = self
            .store
            .find_slack_integration(repository_id)
            .ok_or_else(|| NotifyError::SendFailed("no slack integration configured".to_string()))?;

        let body = serde_json::json!({ "text": context.summary });
        let response = self
            .client
            .post(&integration.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|err| NotifyError::SendFailed(err.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::SendFailed(format!("webhook returned {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone)]
    pub struct WebhookCall {
        pub repository_id: RepositoryId,
        pub context: NotificationContext,
    }

    struct FakeState {
        calls: Vec<WebhookCall>,
        can_handle: bool,
        fail_next: bool,
    }

    /// Records every delivery attempt. `can_handle` defaults to `true`;
    /// toggle with [`FakeWebhookHandler::set_can_handle`] to exercise the
    /// "absent or disabled integration" drop path.
    #[derive(Clone)]
    pub struct FakeWebhookHandler {
        id: String,
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeWebhookHandler {
        pub fn new(id: impl Into<String>) -> Self {
            Self { id: id.into(), inner: Arc::new(Mutex::new(FakeState { calls: Vec::new(), can_handle: true, fail_next: false })) }
        }

        pub fn set_can_handle(&self, can_handle: bool) {
            self.inner.lock().can_handle = can_handle;
        }

        pub fn fail_next_send(&self) {
            self.inner.lock().fail_next = true;
        }

        pub fn calls(&self) -> Vec<WebhookCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl WebhookHandler for FakeWebhookHandler {
        fn id(&self) -> &str {
            &self.id
        }

        async fn can_handle(&self, _repository_id: &RepositoryId) -> bool {
            self.inner.lock().can_handle
        }

        async fn send(&self, context: &NotificationContext, repository_id: &RepositoryId) -> Result<(), NotifyError> {
            let mut state = self.inner.lock();
            if state.fail_next {
                state.fail_next = false;
                return Err(NotifyError::SendFailed("forced failure".to_string()));
            }
            state.calls.push(WebhookCall { repository_id: repository_id.clone(), context: context.clone() });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWebhookHandler, WebhookCall};

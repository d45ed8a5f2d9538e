// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! `agent-consoled`: the control-plane server binary. Owns the
//! persistence store, the session/worker manager, the worktree
//! coordinator, the job queue/worker pool, and the notification
//! dispatcher, and exposes them over HTTP and WebSocket.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod config;
mod error;
mod jobs;
mod routes;
mod state;

use std::sync::Arc;

use ac_core::builtin_agent_definitions;
use ac_git::WorktreeCoordinator;
use ac_jobs::{JobQueue, WorkerPool};
use ac_notify::{Dispatcher, SlackWebhookHandler};
use ac_session::SessionManager;
use ac_storage::Store;
use ac_ws::WsState;
use anyhow::{Context, Result};
use axum::http::Method;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, Config};
use crate::jobs::WorktreeFetchHandler;
use crate::state::AppState;

/// Worker pool concurrency. Worktree fetches are I/O-bound and rare
/// enough that a fixed small pool beats tuning it via a flag.
const JOB_WORKER_CONCURRENCY: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli);
    std::fs::create_dir_all(config.log_dir()).context("failed to create log directory")?;

    let _log_guard = init_logging(&config);
    tracing::info!(home = %config.home.display(), bind = %config.bind, "starting agent-consoled");

    let store = Arc::new(Store::open(&config.home).context("failed to open state store")?);

    let sessions = Arc::new(SessionManager::with_agent_definitions(store.clone(), builtin_agent_definitions()));
    let recovered = sessions.recover();
    tracing::info!(count = recovered.len(), "recovered sessions from persisted state");

    let worktrees = Arc::new(WorktreeCoordinator::new(store.clone()));

    let job_queue = JobQueue::new(store.clone());
    let mut worker_pool = WorkerPool::new(job_queue.clone());
    worker_pool.register_handler("worktree_fetch", Arc::new(WorktreeFetchHandler::new(store.clone(), worktrees.clone())));
    worker_pool.start(JOB_WORKER_CONCURRENCY);

    let dispatcher = Dispatcher::new(store.clone(), sessions.clone(), vec![Arc::new(SlackWebhookHandler::new(store.clone()))]);
    dispatcher.install(&sessions);

    let app_state = AppState { store: store.clone(), sessions: sessions.clone(), worktrees, jobs: job_queue };

    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE]);

    let app = routes::router()
        .with_state(app_state)
        .merge(ac_ws::router(WsState::new(sessions, store)))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind).await.context("failed to bind listener")?;
    tracing::info!(addr = %config.bind, "listening");
    axum::serve(listener, app).await.context("server error")?;

    worker_pool.stop().await;
    Ok(())
}

/// Registry + `EnvFilter` + an fmt layer, writing to the rolling log file
/// under the state directory and, when `--foreground` is set, also to
/// stderr. Returns the `tracing-appender` guard, which must be kept alive
/// for the life of the process or buffered log lines are dropped.
fn init_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(config.log_dir(), "agent-consoled.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false));

    if config.foreground {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.init();
    }

    guard
}

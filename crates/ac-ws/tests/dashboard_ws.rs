// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! End-to-end coverage of the dashboard channel: a real client connects
//! over a real socket and must see a `sessions-sync` snapshot, then a
//! `session-created` event when a session is created out-of-band.

use std::sync::Arc;

use ac_core::AgentDefinitionId;
use ac_session::{CreateSessionRequest, SessionManager};
use ac_storage::Store;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

async fn spawn_server(sessions: Arc<SessionManager>, store: Arc<Store>) -> String {
    let state = ac_ws::WsState::new(sessions, store);
    let router = ac_ws::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("ws://{addr}")
}

fn agent_definition() -> ac_core::AgentDefinition {
    ac_core::AgentDefinition::new("agent_test-cat", "Test Cat", "/bin/cat", vec![], vec![])
}

#[tokio::test]
async fn dashboard_socket_sends_sync_then_creation_event() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(Store::open(dir.path()).expect("open store"));
    let sessions = Arc::new(SessionManager::with_agent_definitions(Arc::clone(&store), vec![agent_definition()]));

    let base_url = spawn_server(Arc::clone(&sessions), Arc::clone(&store)).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("{base_url}/ws/dashboard")).await.expect("connect");

    let first = ws.next().await.expect("first frame").expect("ok frame");
    let Message::Text(text) = first else { panic!("expected text frame") };
    assert!(text.contains("sessions-sync"));

    sessions
        .create_session(CreateSessionRequest::Quick {
            location: std::env::temp_dir(),
            agent_definition_id: AgentDefinitionId::from_string("agent_test-cat".to_string()),
            title: None,
            initial_prompt: None,
        })
        .expect("create session");

    let second = tokio::time::timeout(std::time::Duration::from_secs(2), ws.next())
        .await
        .expect("no timeout")
        .expect("second frame")
        .expect("ok frame");
    let Message::Text(text) = second else { panic!("expected text frame") };
    assert!(text.contains("session-created"));

    ws.close(None).await.ok();
}

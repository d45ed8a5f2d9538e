// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! The dashboard channel (`/ws/dashboard`): a single shared broadcast bus.
//! Every connection gets a `sessions-sync` snapshot on connect, then every
//! subsequent typed event as it happens. The session/worker manager never
//! references this module directly — it only ever publishes to the bus
//! this subscribes to (§9's publisher/subscriber split).

use std::sync::Arc;

use ac_session::{DashboardEvent, SessionManager};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::state::{WsState, SEND_TIMEOUT};

pub async fn dashboard_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_dashboard(socket, state.sessions))
}

async fn handle_dashboard(socket: WebSocket, sessions: Arc<SessionManager>) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = sessions.subscribe_dashboard();

    if send_event(&mut sink, &sessions.sessions_sync()).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "dashboard subscriber lagged, resyncing");
                        if send_event(&mut sink, &sessions.sessions_sync()).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // The dashboard channel is server-push only; any
                        // client frame is tolerated and ignored rather
                        // than faulting the reader.
                        debug!("ignoring unexpected client frame on dashboard channel");
                    }
                    Some(Err(err)) => {
                        debug!(error = %err, "dashboard socket read error");
                        break;
                    }
                }
            }
        }
    }
}

async fn send_event(sink: &mut SplitSink<WebSocket, Message>, event: &DashboardEvent) -> Result<(), ()> {
    let Ok(text) = serde_json::to_string(event) else { return Err(()) };
    match tokio::time::timeout(SEND_TIMEOUT, sink.send(Message::Text(text))).await {
        Ok(Ok(())) => Ok(()),
        _ => Err(()),
    }
}

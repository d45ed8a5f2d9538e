// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! The worker-terminal channel: on connect, replays the ring buffer then
//! streams live PTY bytes; incoming frames are `write`/`resize` operations
//! against the underlying PTY. Disconnect detaches the consumer callbacks
//! without killing the worker — a reconnect just re-attaches.

use std::sync::Arc;

use ac_core::{SessionId, WorkerId};
use ac_session::{SessionManager, WorkerCallbacks};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::state::SEND_TIMEOUT;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ClientFrame {
    Write { data: String },
    Resize { cols: u16, rows: u16 },
}

enum Outbound {
    Data(Vec<u8>),
    Exit,
}

struct TerminalConsumer {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl WorkerCallbacks for TerminalConsumer {
    fn on_data(&self, data: &[u8]) {
        let _ = self.tx.send(Outbound::Data(data.to_vec()));
    }

    fn on_exit(&self, _exit_code: Option<i32>) {
        let _ = self.tx.send(Outbound::Exit);
    }
}

pub async fn handle_worker_terminal(
    socket: WebSocket,
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    worker_id: WorkerId,
) {
    let (mut sink, mut stream) = socket.split();

    if let Some(buffer) = sessions.get_worker_output_buffer(&session_id, &worker_id) {
        if !buffer.is_empty() && send_binary(&mut sink, buffer).await.is_err() {
            return;
        }
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    sessions.attach_worker_callbacks(&session_id, &worker_id, Arc::new(TerminalConsumer { tx }));

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(Outbound::Data(bytes)) => {
                        if send_binary(&mut sink, bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Outbound::Exit) | None => break,
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handle_client_frame(&sessions, &session_id, &worker_id, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(%session_id, %worker_id, error = %err, "terminal socket read error");
                        break;
                    }
                }
            }
        }
    }

    sessions.detach_worker_callbacks(&session_id, &worker_id);
}

fn handle_client_frame(sessions: &Arc<SessionManager>, session_id: &SessionId, worker_id: &WorkerId, text: &str) {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(ClientFrame::Write { data }) => {
            sessions.write_worker_input(session_id, worker_id, data.as_bytes());
        }
        Ok(ClientFrame::Resize { cols, rows }) => {
            sessions.resize_worker(session_id, worker_id, cols, rows);
        }
        Err(err) => {
            debug!(%session_id, %worker_id, error = %err, "ignoring malformed terminal frame");
        }
    }
}

async fn send_binary(
    sink: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    bytes: Vec<u8>,
) -> Result<(), ()> {
    match tokio::time::timeout(SEND_TIMEOUT, sink.send(Message::Binary(bytes))).await {
        Ok(Ok(())) => Ok(()),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_frame_parses_from_wire_shape() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"write","data":"hello\n"}"#).expect("parse");
        assert!(matches!(frame, ClientFrame::Write { data } if data == "hello\n"));
    }

    #[test]
    fn resize_frame_parses_from_wire_shape() {
        let frame: ClientFrame = serde_json::from_str(r#"{"type":"resize","cols":120,"rows":40}"#).expect("parse");
        assert!(matches!(frame, ClientFrame::Resize { cols: 120, rows: 40 }));
    }
}

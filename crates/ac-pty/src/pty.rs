// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! PTY supervisor: spawns a command behind a pseudo-terminal, fans its
//! output out to subscribers, and tracks scrollback + activity state.
//!
//! `portable_pty`'s reader is a blocking [`std::io::Read`], so it is driven
//! from a dedicated OS thread rather than an async task; bytes are handed
//! off to async consumers over a [`tokio::sync::broadcast`] channel.

use std::sync::Arc;

use ac_core::{ActivityState, Clock};
use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize, PtySystem};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::activity::ActivityDetector;
use crate::error::{PtyError, Result};
use crate::ring_buffer::{RingBuffer, DEFAULT_CAPACITY_BYTES};

/// Output is broadcast with a modest backlog; slow or absent subscribers
/// (no dashboard attached) simply miss old frames, never block the PTY.
const BROADCAST_CAPACITY: usize = 256;

pub struct PtySpawnConfig {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: std::path::PathBuf,
    pub env: Vec<(String, String)>,
    pub cols: u16,
    pub rows: u16,
}

struct Inner<C: Clock> {
    ring: RingBuffer,
    activity: ActivityDetector<C>,
    exited: bool,
}

/// A live PTY-backed worker process.
pub struct PtyHandle<C: Clock> {
    master: Mutex<Box<dyn MasterPty + Send>>,
    writer: Mutex<Box<dyn std::io::Write + Send>>,
    child: Mutex<Box<dyn Child + Send>>,
    inner: Arc<Mutex<Inner<C>>>,
    output_tx: broadcast::Sender<Vec<u8>>,
    activity_tx: broadcast::Sender<ActivityState>,
}

impl<C: Clock> PtyHandle<C> {
    pub fn spawn(config: PtySpawnConfig, clock: C) -> Result<Self> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize { rows: config.rows, cols: config.cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| PtyError::Open(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&config.command);
        cmd.args(&config.args);
        cmd.cwd(&config.cwd);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let child = pair.slave.spawn_command(cmd).map_err(|e| PtyError::Spawn(e.to_string()))?;
        drop(pair.slave);

        let reader = pair.master.try_clone_reader().map_err(|e| PtyError::Open(e.to_string()))?;
        let writer = pair.master.take_writer().map_err(|e| PtyError::Open(e.to_string()))?;

        let (output_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (activity_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let inner = Arc::new(Mutex::new(Inner {
            ring: RingBuffer::new(DEFAULT_CAPACITY_BYTES),
            activity: ActivityDetector::new(clock),
            exited: false,
        }));

        spawn_reader_thread(reader, Arc::clone(&inner), output_tx.clone(), activity_tx.clone());

        Ok(Self {
            master: Mutex::new(pair.master),
            writer: Mutex::new(writer),
            child: Mutex::new(child),
            inner,
            output_tx,
            activity_tx,
        })
    }

    pub fn write(&self, data: &[u8]) -> Result<()> {
        if self.inner.lock().exited {
            return Err(PtyError::AlreadyExited);
        }
        use std::io::Write;
        self.writer.lock().write_all(data)?;
        Ok(())
    }

    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.master
            .lock()
            .resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 })
            .map_err(|e| PtyError::Open(e.to_string()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<u8>> {
        self.output_tx.subscribe()
    }

    /// Subscribe to activity-state transitions fired as output arrives, in
    /// addition to the silence-window transitions surfaced by
    /// [`Self::poll_activity`]. This is how an `Unknown`/`Idle` worker's
    /// transition to `Active` reaches the manager's ticker-independent
    /// listener — `poll_activity` alone only ever observes the states
    /// reachable by waiting, never `Active`.
    pub fn subscribe_activity(&self) -> broadcast::Receiver<ActivityState> {
        self.activity_tx.subscribe()
    }

    pub fn scrollback(&self) -> Vec<u8> {
        self.inner.lock().ring.snapshot()
    }

    pub fn activity(&self) -> ActivityState {
        self.inner.lock().activity.state()
    }

    /// Poll the activity detector's silence window. Intended to be called
    /// periodically (e.g. every second) by the owning session manager.
    pub fn poll_activity(&self) -> Option<ActivityState> {
        self.inner.lock().activity.on_tick()
    }

    pub fn has_exited(&self) -> bool {
        self.inner.lock().exited
    }

    pub fn kill(&self) -> Result<()> {
        self.child.lock().kill()?;
        Ok(())
    }
}

fn spawn_reader_thread<C: Clock>(
    mut reader: Box<dyn std::io::Read + Send>,
    inner: Arc<Mutex<Inner<C>>>,
    output_tx: broadcast::Sender<Vec<u8>>,
    activity_tx: broadcast::Sender<ActivityState>,
) {
    std::thread::spawn(move || {
        use std::io::Read;
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let chunk = buf[..n].to_vec();
                    let transition = {
                        let mut guard = inner.lock();
                        guard.ring.push(&chunk);
                        guard.activity.on_output(&chunk)
                    };
                    if let Some(state) = transition {
                        let _ = activity_tx.send(state);
                    }
                    if output_tx.send(chunk).is_err() {
                        debug!("no active subscribers for pty output");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "pty read error, stopping reader");
                    break;
                }
            }
        }
        inner.lock().exited = true;
    });
}

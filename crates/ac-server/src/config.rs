// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Startup configuration: `AGENT_CONSOLE_HOME` resolution and the
//! `agent-consoled` binary's CLI flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "agent-consoled", about = "Agent Console control-plane server")]
pub struct Cli {
    /// Address to bind the HTTP/WebSocket listener to.
    #[arg(long, default_value = "127.0.0.1:4317")]
    pub bind: SocketAddr,

    /// Run without detaching from the terminal. The server never forks
    /// itself either way; this only controls whether startup logs also go
    /// to stderr in addition to the rolling log file.
    #[arg(long)]
    pub foreground: bool,

    /// Override the state/config root. Takes precedence over
    /// `AGENT_CONSOLE_HOME`.
    #[arg(long)]
    pub home: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub foreground: bool,
    pub home: PathBuf,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        let home = cli.home.unwrap_or_else(home_dir);
        Self { bind: cli.bind, foreground: cli.foreground, home }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }
}

/// `AGENT_CONSOLE_HOME` > `dirs::data_dir()/agent-console`.
fn home_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AGENT_CONSOLE_HOME") {
        return PathBuf::from(dir);
    }
    dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("agent-console")
}

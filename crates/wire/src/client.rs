// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sending side of the callback protocol, used by payloads.

use std::time::Duration;

use latch_core::{InjectionArguments, Level, StatusMessage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::frame::{encode_frame, ProtocolError};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the sender waits for the listener to close its side after the
/// frame went out.
pub const LINGER: Duration = Duration::from_secs(1);

/// Deliver one message. Fire-and-forget: no acknowledgement, no retry.
pub async fn send(host: &str, port: u16, message: &StatusMessage) -> Result<(), ProtocolError> {
    let frame = encode_frame(message)?;

    let mut stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    stream.set_nodelay(true)?;
    stream.write_all(&frame).await?;
    stream.shutdown().await?;

    // Linger until the listener hangs up so the frame is not torn down in flight.
    let mut sink = [0u8; 64];
    match tokio::time::timeout(LINGER, stream.read(&mut sink)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => debug!(error = %e, "status socket closed uncleanly"),
        Err(_) => debug!(port, "listener did not close within linger"),
    }
    Ok(())
}

/// Convenience client bound to one listener and one correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClient {
    host: String,
    port: u16,
    id: String,
}

impl StatusClient {
    pub fn new(host: impl Into<String>, port: u16, id: impl Into<String>) -> Self {
        Self { host: host.into(), port, id: id.into() }
    }

    /// Client for the listener named in a payload's arguments, if it has one.
    pub fn from_args(args: &InjectionArguments, host: impl Into<String>) -> Option<Self> {
        let port = args.server_port?;
        let id = args.id.clone().unwrap_or_default();
        Some(Self::new(host, port, id))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn report(&self, level: Level, label: &str, message: &str) -> Result<(), ProtocolError> {
        let message = StatusMessage::new(self.id.as_str(), level, label, message);
        send(&self.host, self.port, &message).await
    }

    pub async fn info(&self, label: &str, message: &str) -> Result<(), ProtocolError> {
        self.report(Level::Info, label, message).await
    }

    pub async fn warn(&self, label: &str, message: &str) -> Result<(), ProtocolError> {
        self.report(Level::Warn, label, message).await
    }

    pub async fn error(&self, label: &str, message: &str) -> Result<(), ProtocolError> {
        self.report(Level::Error, label, message).await
    }

    pub async fn success(&self, url: &str) -> Result<(), ProtocolError> {
        send(&self.host, self.port, &StatusMessage::success(self.id.as_str(), url)).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

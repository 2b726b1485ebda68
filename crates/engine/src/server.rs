// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral callback listener.
//!
//! Binds the first free port of a bounded range and runs a one-message-per-
//! connection accept loop on its own task. Each accepted connection is
//! decoded on a task of its own and every decoded
//! [`StatusMessage`](latch_core::StatusMessage) goes to the shared report sink.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::report::ReportSink;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub base_port: u16,
    /// Number of sequential ports tried, starting at `base_port`.
    pub attempts: u16,
    /// Flush returns once no connection has been seen for this long.
    pub flush_quiet: Duration,
    /// Upper bound for one flush.
    pub flush_max: Duration,
    pub stop_timeout: Duration,
    /// Upper bound for reading one frame off an accepted connection.
    pub decode_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            base_port: 17400,
            attempts: 500,
            flush_quiet: Duration::from_millis(250),
            flush_max: Duration::from_secs(1),
            stop_timeout: Duration::from_secs(1),
            decode_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Bound,
    Running,
    Stopping,
    Stopped,
}

struct Shared {
    phase: Mutex<ServerPhase>,
    /// Pinged on every accepted connection and every delivered message.
    activity: Notify,
    flush_quiet: Duration,
    flush_max: Duration,
}

impl Shared {
    fn set_phase(&self, phase: ServerPhase) {
        *self.phase.lock() = phase;
    }

    fn phase(&self) -> ServerPhase {
        *self.phase.lock()
    }

    async fn flush(&self) {
        if !matches!(self.phase(), ServerPhase::Bound | ServerPhase::Running) {
            return;
        }
        let deadline = Instant::now() + self.flush_max;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let window = self.flush_quiet.min(deadline - now);
            if tokio::time::timeout(window, self.activity.notified()).await.is_err() {
                break;
            }
        }
    }
}

/// Cheap handle on a running server, passed to the orchestrator.
#[derive(Clone)]
pub struct ServerHandle {
    port: u16,
    shared: Arc<Shared>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Best-effort wait for in-flight messages. Not a delivery barrier: a
    /// message sent after the quiet window elapsed is still missed.
    pub async fn flush(&self) {
        self.shared.flush().await
    }
}

pub struct StatusServer {
    port: u16,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    stop_timeout: Duration,
}

impl StatusServer {
    /// Bind and spawn the accept loop.
    ///
    /// Every port that cannot be bound is reported to `sink` as a warning.
    /// Returns `None` when the whole range is taken; the batch then runs
    /// without callbacks.
    pub async fn start(sink: Arc<dyn ReportSink>, config: &ServerConfig) -> Option<Self> {
        let (listener, port) = bind(sink.as_ref(), config).await?;

        let shared = Arc::new(Shared {
            phase: Mutex::new(ServerPhase::Bound),
            activity: Notify::new(),
            flush_quiet: config.flush_quiet,
            flush_max: config.flush_max,
        });
        let cancel = CancellationToken::new();
        let task = tokio::spawn(accept_loop(
            listener,
            sink,
            Arc::clone(&shared),
            cancel.clone(),
            config.decode_timeout,
        ));

        Some(Self {
            port,
            shared,
            cancel,
            task: Mutex::new(Some(task)),
            stop_timeout: config.stop_timeout,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn phase(&self) -> ServerPhase {
        self.shared.phase()
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle { port: self.port, shared: Arc::clone(&self.shared) }
    }

    pub async fn flush(&self) {
        self.shared.flush().await
    }

    /// Stop accepting and wait for the loop to exit.
    ///
    /// Frames being decoded are allowed to finish; the loop and its
    /// connection tasks are aborted only once the stop timeout elapses. Calling this again is a no-op.
    pub async fn stop(&self) {
        let Some(mut task) = self.task.lock().take() else {
            return;
        };
        self.shared.set_phase(ServerPhase::Stopping);
        self.cancel.cancel();
        if tokio::time::timeout(self.stop_timeout, &mut task).await.is_err() {
            warn!(port = self.port, "status server did not stop in time, aborting");
            task.abort();
        }
        self.shared.set_phase(ServerPhase::Stopped);
        debug!(port = self.port, "status server stopped");
    }
}

impl Drop for StatusServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn bind(sink: &dyn ReportSink, config: &ServerConfig) -> Option<(TcpListener, u16)> {
    for offset in 0..config.attempts {
        let Some(port) = config.base_port.checked_add(offset) else {
            break;
        };
        match TcpListener::bind((config.host, port)).await {
            Ok(listener) => {
                let port = listener.local_addr().map(|addr| addr.port()).unwrap_or(port);
                info!(host = %config.host, port, "status server listening");
                return Some((listener, port));
            }
            Err(e) => sink.warn(&format!("callback port {port} unavailable: {e}")),
        }
    }
    None
}

async fn accept_loop(
    listener: TcpListener,
    sink: Arc<dyn ReportSink>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    decode_timeout: Duration,
) {
    shared.set_phase(ServerPhase::Running);
    // Dropping the set aborts whatever is still decoding.
    let mut connections = JoinSet::new();
    loop {
        let (stream, peer) = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => continue,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    continue;
                }
            },
        };
        shared.activity.notify_waiters();
        connections.spawn(deliver(stream, peer, Arc::clone(&sink), Arc::clone(&shared), decode_timeout));
    }
    drop(listener);
    while connections.join_next().await.is_some() {}
    debug!("status accept loop exited");
}

/// Read the single frame of one connection and hand it to the sink.
async fn deliver(
    mut stream: TcpStream,
    peer: SocketAddr,
    sink: Arc<dyn ReportSink>,
    shared: Arc<Shared>,
    decode_timeout: Duration,
) {
    match tokio::time::timeout(decode_timeout, latch_wire::read_status(&mut stream)).await {
        Ok(Ok(message)) => {
            debug!(%peer, id = %message.id, level = %message.level, label = %message.label, "status message");
            sink.write(message);
            shared.activity.notify_waiters();
        }
        Ok(Err(e)) => warn!(%peer, error = %e, "dropping malformed status frame"),
        Err(_) => warn!(%peer, "no status frame within {:?}", decode_timeout),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

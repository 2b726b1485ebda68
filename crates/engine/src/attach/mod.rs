// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-process payload injection.

mod hotspot;

pub use hotspot::{HotSpotAttacher, HotSpotConfig};

use async_trait::async_trait;
use latch_core::{Level, Target};
use thiserror::Error;

/// Substring of the malformed reply some JVMs send after a successful agent
/// load. Failures carrying it are reported as warnings.
pub const BENIGN_ATTACH_QUIRK: &str = "Non-numeric value found";

#[derive(Debug, Error)]
pub enum AttachError {
    #[error("invalid process id: {0}")]
    InvalidPid(String),

    #[error("no such process: {0}")]
    NoSuchProcess(i32),

    #[error("permission denied signalling process {0}")]
    PermissionDenied(i32),

    #[error("attach listener of process {pid} did not start within {waited_ms}ms")]
    ListenerTimeout { pid: i32, waited_ms: u64 },

    #[error("attach command failed with code {code}: {detail}")]
    Command { code: i32, detail: String },

    #[error("agent failed to initialize (return code {0})")]
    AgentInit(i32),

    #[error("Non-numeric value found - int expected: {0:?}")]
    NonNumeric(String),

    #[error("{0}")]
    Other(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Hands an encoded payload argument to a running process.
#[async_trait]
pub trait Attacher: Send + Sync {
    /// Blocks for as long as the target takes to answer; there is no timeout
    /// on the load itself.
    async fn inject(&self, target: &Target, payload: &str) -> Result<(), AttachError>;
}

/// Severity an attach failure is reported with, decided on its message text.
pub fn classify(error: &AttachError) -> Level {
    if error.to_string().contains(BENIGN_ATTACH_QUIRK) {
        Level::Warn
    } else {
        Level::Error
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use latch_core::{InjectionArguments, StatusMessage, Target};
    use parking_lot::Mutex;

    use super::{AttachError, Attacher};

    /// Recorded injection
    #[derive(Debug, Clone)]
    pub struct InjectCall {
        pub target_id: String,
        pub arguments: InjectionArguments,
    }

    #[derive(Default)]
    struct FakeAttachState {
        failures: HashMap<String, String>,
        replies: HashMap<String, Vec<StatusMessage>>,
        late: HashMap<String, Vec<(StatusMessage, Duration)>>,
        delays: HashMap<String, Duration>,
        calls: Vec<InjectCall>,
    }

    /// Fake attacher for testing.
    ///
    /// Plays the payload's part too: scripted replies are sent to the callback
    /// port found in the decoded arguments before `inject` returns, late
    /// replies after a delay.
    #[derive(Clone, Default)]
    pub struct FakeAttacher {
        inner: Arc<Mutex<FakeAttachState>>,
    }

    impl FakeAttacher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the injection into `id` fail with `text`.
        pub fn fail(self, id: &str, text: &str) -> Self {
            self.inner.lock().failures.insert(id.to_string(), text.to_string());
            self
        }

        /// Deliver `message` while the injection into `id` is in progress.
        pub fn reply(self, id: &str, message: StatusMessage) -> Self {
            self.inner.lock().replies.entry(id.to_string()).or_default().push(message);
            self
        }

        /// Deliver `message` `delay` after the injection into `id` returned.
        pub fn reply_late(self, id: &str, message: StatusMessage, delay: Duration) -> Self {
            self.inner.lock().late.entry(id.to_string()).or_default().push((message, delay));
            self
        }

        /// Make the injection into `id` take `delay`.
        pub fn delay(self, id: &str, delay: Duration) -> Self {
            self.inner.lock().delays.insert(id.to_string(), delay);
            self
        }

        pub fn calls(&self) -> Vec<InjectCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl Attacher for FakeAttacher {
        async fn inject(&self, target: &Target, payload: &str) -> Result<(), AttachError> {
            let arguments = InjectionArguments::decode(payload)
                .map_err(|e| AttachError::Other(format!("undecodable payload: {e}")))?;
            let port = arguments.server_port;
            let (failure, replies, late, delay) = {
                let mut state = self.inner.lock();
                state.calls.push(InjectCall { target_id: target.id.clone(), arguments });
                (
                    state.failures.get(&target.id).cloned(),
                    state.replies.get(&target.id).cloned().unwrap_or_default(),
                    state.late.get(&target.id).cloned().unwrap_or_default(),
                    state.delays.get(&target.id).copied(),
                )
            };

            if let Some(port) = port {
                for message in replies {
                    let _ = latch_wire::send("127.0.0.1", port, &message).await;
                }
                for (message, after) in late {
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = latch_wire::send("127.0.0.1", port, &message).await;
                    });
                }
            }

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match failure {
                Some(text) => Err(AttachError::Other(text)),
                None => Ok(()),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAttacher, InjectCall};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

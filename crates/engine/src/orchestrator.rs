// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-target attach: derive arguments, inject, report the outcome.
//!
//! Failures never escape: every error is turned into a status message in the
//! target's own record, so one bad target cannot abort the batch.

use std::collections::HashSet;
use std::sync::Arc;

use latch_core::{InjectionArguments, Level, StatusMessage, Target, ERROR_LABEL};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::attach::{classify, Attacher};
use crate::report::ReportSink;
use crate::server::ServerHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The payload was loaded. Whether it went on to succeed is up to the
    /// callback messages.
    Injected,
    /// The attach reported the benign malformed-reply quirk.
    Warned(String),
    Failed(String),
    /// Another attach for the same correlation id is in progress.
    Skipped,
}

pub struct Orchestrator {
    attacher: Arc<dyn Attacher>,
    sink: Arc<dyn ReportSink>,
    server: Option<ServerHandle>,
    in_flight: Mutex<HashSet<String>>,
}

impl Orchestrator {
    pub fn new(attacher: Arc<dyn Attacher>, sink: Arc<dyn ReportSink>) -> Self {
        Self { attacher, sink, server: None, in_flight: Mutex::new(HashSet::new()) }
    }

    /// Flush `server` after every attach.
    pub fn with_server(mut self, server: ServerHandle) -> Self {
        self.server = Some(server);
        self
    }

    /// Attach to `target` and collect its record.
    ///
    /// The record is opened before the injection call so that failures land
    /// in it; it is closed after a best-effort flush of in-flight callbacks.
    pub async fn attach(&self, target: &Target, base: &InjectionArguments, port: Option<u16>) -> AttachOutcome {
        if !self.claim(&target.id) {
            self.sink.warn(&format!("{target} is already being attached, skipping"));
            return AttachOutcome::Skipped;
        }

        let arguments = base.for_target(target, port);
        self.sink.attach_started(target, &arguments);

        let outcome = match self.inject(target, &arguments).await {
            Ok(()) => AttachOutcome::Injected,
            Err((level, text)) => {
                self.sink.write(StatusMessage::new(target.id.clone(), level, ERROR_LABEL, text.clone()));
                match level {
                    Level::Warn => AttachOutcome::Warned(text),
                    _ => AttachOutcome::Failed(text),
                }
            }
        };

        if let Some(server) = &self.server {
            server.flush().await;
        }
        self.sink.attach_finished();
        self.release(&target.id);
        outcome
    }

    /// Listing-mode attach: the payload only reports the application identity.
    ///
    /// No record is opened; failures are surfaced as warnings.
    pub async fn identify(&self, target: &Target, base: &InjectionArguments, port: Option<u16>) -> AttachOutcome {
        if !self.claim(&target.id) {
            return AttachOutcome::Skipped;
        }
        let arguments = base.clone().discover(true).for_target(target, port);
        let outcome = match self.inject(target, &arguments).await {
            Ok(()) => AttachOutcome::Injected,
            Err((_, text)) => {
                self.sink.warn(&format!("cannot identify {target}: {text}"));
                AttachOutcome::Failed(text)
            }
        };
        self.release(&target.id);
        outcome
    }

    async fn inject(&self, target: &Target, arguments: &InjectionArguments) -> Result<(), (Level, String)> {
        let payload = arguments.encode().map_err(|e| {
            error!(id = %target.id, error = %e, "cannot encode payload arguments");
            (Level::Error, e.to_string())
        })?;

        info!(id = %target.id, name = %target.display_name, port = ?arguments.server_port, "attaching");
        match self.attacher.inject(target, &payload).await {
            Ok(()) => {
                debug!(id = %target.id, "payload loaded");
                Ok(())
            }
            Err(e) => {
                let level = classify(&e);
                match level {
                    Level::Warn => warn!(id = %target.id, error = %e, "attach reported a malformed reply"),
                    _ => error!(id = %target.id, error = %e, "attach failed"),
                }
                Err((level, e.to_string()))
            }
        }
    }

    fn claim(&self, id: &str) -> bool {
        self.in_flight.lock().insert(id.to_string())
    }

    fn release(&self, id: &str) {
        self.in_flight.lock().remove(id);
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch driver: list, optionally start the callback server, attach each
//! selected target, then always stop the server and finish the report.

use std::sync::Arc;

use latch_core::{InjectionArguments, Target};
use tracing::info;

use crate::attach::Attacher;
use crate::config::Config;
use crate::discovery::{list_targets, DenyList, TargetSource};
use crate::orchestrator::{AttachOutcome, Orchestrator};
use crate::report::ReportSink;
use crate::server::StatusServer;

/// Which listed targets to attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Ids(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: usize,
    pub injected: usize,
    pub warned: usize,
    pub failed: usize,
    /// Requested ids with no matching target.
    pub missing: Vec<String>,
}

impl BatchSummary {
    fn record(&mut self, outcome: &AttachOutcome) {
        match outcome {
            AttachOutcome::Injected => self.injected += 1,
            AttachOutcome::Warned(_) => self.warned += 1,
            AttachOutcome::Failed(_) => self.failed += 1,
            AttachOutcome::Skipped => return,
        }
        self.attempted += 1;
    }
}

pub struct Batch {
    config: Config,
    sink: Arc<dyn ReportSink>,
    attacher: Arc<dyn Attacher>,
    source: Arc<dyn TargetSource>,
    deny: DenyList,
}

impl Batch {
    pub fn new(
        config: Config,
        sink: Arc<dyn ReportSink>,
        attacher: Arc<dyn Attacher>,
        source: Arc<dyn TargetSource>,
    ) -> Self {
        Self { config, sink, attacher, source, deny: DenyList::default() }
    }

    pub fn with_deny(mut self, deny: DenyList) -> Self {
        self.deny = deny;
        self
    }

    /// Attach to the selected targets.
    ///
    /// With `callback` off no server is started and payloads get no port.
    pub async fn run_attach(&self, selection: &Selection, base: &InjectionArguments, callback: bool) -> BatchSummary {
        let server = if callback { self.start_server().await } else { None };
        let port = server.as_ref().map(StatusServer::port);

        let mut orchestrator = Orchestrator::new(Arc::clone(&self.attacher), Arc::clone(&self.sink));
        if let Some(server) = &server {
            orchestrator = orchestrator.with_server(server.handle());
        }

        let (targets, missing) = self.select(selection);
        let mut summary = BatchSummary { missing, ..BatchSummary::default() };
        for target in &targets {
            let outcome = orchestrator.attach(target, base, port).await;
            summary.record(&outcome);
        }

        self.shutdown(server).await;
        info!(
            attempted = summary.attempted,
            injected = summary.injected,
            failed = summary.failed,
            "attach batch finished"
        );
        summary
    }

    /// List candidate targets; with `identify`, ask each attachable one for
    /// its application identity. Returns the number of listed targets.
    pub async fn run_list(&self, identify: bool, base: &InjectionArguments) -> usize {
        let targets = list_targets(self.source.as_ref(), &self.deny);
        for target in &targets {
            self.sink.list(target);
        }

        let server = if identify { self.start_server().await } else { None };
        if let Some(server) = &server {
            let orchestrator = Orchestrator::new(Arc::clone(&self.attacher), Arc::clone(&self.sink));
            for target in targets.iter().filter(|t| t.attachable) {
                orchestrator.identify(target, base, Some(server.port())).await;
            }
            server.flush().await;
        }

        self.shutdown(server).await;
        targets.len()
    }

    fn select(&self, selection: &Selection) -> (Vec<Target>, Vec<String>) {
        let listed = list_targets(self.source.as_ref(), &self.deny);
        let ids = match selection {
            Selection::All => return (listed, Vec::new()),
            Selection::Ids(ids) => ids,
        };

        let mut targets: Vec<Target> = Vec::new();
        let mut missing = Vec::new();
        for id in ids {
            if targets.iter().any(|t| &t.id == id) || missing.contains(id) {
                continue;
            }
            match listed.iter().find(|t| &t.id == id) {
                Some(target) => targets.push(target.clone()),
                None => {
                    self.sink.warn(&format!("no candidate process with id {id}"));
                    missing.push(id.clone());
                }
            }
        }
        (targets, missing)
    }

    async fn start_server(&self) -> Option<StatusServer> {
        let server = StatusServer::start(Arc::clone(&self.sink), &self.config.server).await;
        if server.is_none() {
            self.sink.warn("no callback port could be bound, status messages will not be received");
        }
        server
    }

    async fn shutdown(&self, server: Option<StatusServer>) {
        if let Some(server) = server {
            server.stop().await;
        }
        self.sink.finished();
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

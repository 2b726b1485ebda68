// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Report sinks: the one place attach outcomes and callback messages meet.
//!
//! Both the orchestrator and the status server accept loop write into the
//! same sink, so implementations keep their state behind a lock.

mod color;
mod json;
mod plain;

pub use json::JsonSink;
pub use plain::PlainSink;

use std::io::Write;
use std::sync::Arc;

use latch_core::{Identity, InjectionArguments, StatusMessage, Target};

/// Output stream a sink renders into.
pub type Writer = Box<dyn Write + Send>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

pub trait ReportSink: Send + Sync {
    /// A discovered target (listing mode).
    fn list(&self, target: &Target);

    /// Opens the current record. Messages for `target.id` are collected into
    /// it until [`attach_finished`](ReportSink::attach_finished).
    fn attach_started(&self, target: &Target, arguments: &InjectionArguments);

    fn write(&self, message: StatusMessage);

    fn attach_finished(&self);

    /// Render the final report. Idempotent.
    fn finished(&self);

    fn error(&self, error: &dyn std::error::Error);

    fn warn(&self, text: &str);
}

/// Construct the sink for `format` over stdout and stderr.
pub fn build(format: ReportFormat, colorize: bool) -> Arc<dyn ReportSink> {
    let out: Writer = Box::new(std::io::stdout());
    let err: Writer = Box::new(std::io::stderr());
    match format {
        ReportFormat::Text => Arc::new(PlainSink::new(out, err, colorize)),
        ReportFormat::Json => Arc::new(JsonSink::new(out, err)),
    }
}

/// `id \t vmVersion \t attachable \t displayName [\t container \t apps]`
pub(crate) fn entry_line(target: &Target, identity: Option<&Identity>) -> String {
    let mut line = format!(
        "{}\t{}\t{}\t{}",
        target.id,
        target.vm_version.as_deref().unwrap_or("-"),
        target.attachable,
        target.display_name
    );
    if let Some(identity) = identity {
        line.push('\t');
        line.push_str(identity.container_name.as_deref().unwrap_or("-"));
        line.push('\t');
        line.push_str(&identity.application_names.join(","));
    }
    line
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use std::io::Write;
    use std::sync::Arc;

    use latch_core::{InjectionArguments, StatusMessage, Target};
    use parking_lot::Mutex;

    use super::ReportSink;

    /// Recorded sink call
    #[derive(Debug, Clone, PartialEq)]
    pub enum SinkEvent {
        List(String),
        Started { id: String, arguments: InjectionArguments },
        Write(StatusMessage),
        AttachFinished,
        Finished,
        Error(String),
        Warn(String),
    }

    /// Sink that records every call for assertions.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        events: Arc<Mutex<Vec<SinkEvent>>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<SinkEvent> {
            self.events.lock().clone()
        }

        pub fn messages(&self) -> Vec<StatusMessage> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    SinkEvent::Write(m) => Some(m.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn warnings(&self) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    SinkEvent::Warn(w) => Some(w.clone()),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, event: SinkEvent) {
            self.events.lock().push(event);
        }
    }

    impl ReportSink for RecordingSink {
        fn list(&self, target: &Target) {
            self.push(SinkEvent::List(target.id.clone()));
        }

        fn attach_started(&self, target: &Target, arguments: &InjectionArguments) {
            self.push(SinkEvent::Started { id: target.id.clone(), arguments: arguments.clone() });
        }

        fn write(&self, message: StatusMessage) {
            self.push(SinkEvent::Write(message));
        }

        fn attach_finished(&self) {
            self.push(SinkEvent::AttachFinished);
        }

        fn finished(&self) {
            self.push(SinkEvent::Finished);
        }

        fn error(&self, error: &dyn std::error::Error) {
            self.push(SinkEvent::Error(error.to_string()));
        }

        fn warn(&self, text: &str) {
            self.push(SinkEvent::Warn(text.to_string()));
        }
    }

    /// In-memory writer whose contents stay readable after it was handed to
    /// a sink.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{RecordingSink, SharedBuffer, SinkEvent};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured report: one JSON array, rendered when the batch finishes.

use std::io::Write;

use indexmap::IndexMap;
use latch_core::{AttachRecord, Identity, InjectionArguments, Level, StatusMessage, Target};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use super::{ReportSink, Writer};

struct JsonState {
    out: Writer,
    err: Writer,
    current: Option<AttachRecord>,
    records: Vec<AttachRecord>,
    listed: IndexMap<String, (Target, Option<Identity>)>,
    done: bool,
}

pub struct JsonSink {
    state: Mutex<JsonState>,
}

impl JsonSink {
    pub fn new(out: Writer, err: Writer) -> Self {
        Self {
            state: Mutex::new(JsonState {
                out,
                err,
                current: None,
                records: Vec::new(),
                listed: IndexMap::new(),
                done: false,
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Pid<'a> {
    Number(u64),
    Text(&'a str),
}

impl<'a> Pid<'a> {
    fn of(target: &'a Target) -> Self {
        match target.pid() {
            Some(pid) => Pid::Number(pid),
            None => Pid::Text(&target.id),
        }
    }
}

#[derive(Serialize)]
struct MessageView<'a> {
    level: Level,
    label: &'a str,
    messsage: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordView<'a> {
    pid: Pid<'a>,
    command: &'a str,
    messages: Vec<MessageView<'a>>,
    agent_args: String,
    success: bool,
}

impl<'a> RecordView<'a> {
    fn of(record: &'a AttachRecord) -> Self {
        Self {
            pid: Pid::of(&record.target),
            command: record.target.command(),
            messages: record
                .messages
                .iter()
                .map(|m| MessageView { level: m.level, label: &m.label, messsage: &m.message })
                .collect(),
            agent_args: record.arguments.to_json().unwrap_or_default(),
            success: record.success(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingView<'a> {
    pid: Pid<'a>,
    vm_version: Option<&'a str>,
    attachable: bool,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    application_names: Option<&'a [String]>,
}

impl<'a> ListingView<'a> {
    fn of(target: &'a Target, identity: Option<&'a Identity>) -> Self {
        Self {
            pid: Pid::of(target),
            vm_version: target.vm_version.as_deref(),
            attachable: target.attachable,
            display_name: &target.display_name,
            container_name: identity.and_then(|i| i.container_name.as_deref()),
            application_names: identity.map(|i| i.application_names.as_slice()),
        }
    }
}

impl JsonState {
    fn render(&self) -> Result<String, serde_json::Error> {
        if self.records.is_empty() && !self.listed.is_empty() {
            let views: Vec<_> =
                self.listed.values().map(|(target, identity)| ListingView::of(target, identity.as_ref())).collect();
            serde_json::to_string(&views)
        } else {
            let views: Vec<_> = self.records.iter().map(RecordView::of).collect();
            serde_json::to_string(&views)
        }
    }
}

impl ReportSink for JsonSink {
    fn list(&self, target: &Target) {
        self.state.lock().listed.insert(target.id.clone(), (target.clone(), None));
    }

    fn attach_started(&self, target: &Target, arguments: &InjectionArguments) {
        let mut state = self.state.lock();
        if let Some(open) = state.current.take() {
            state.records.push(open);
        }
        state.current = Some(AttachRecord::new(target.clone(), arguments.clone()));
    }

    fn write(&self, message: StatusMessage) {
        let mut state = self.state.lock();
        let state = &mut *state;

        if let Some(record) = state.current.as_mut().filter(|r| r.id() == message.id) {
            record.push(message);
            return;
        }
        if message.is_identity() {
            if let Some((_, identity)) = state.listed.get_mut(&message.id) {
                *identity = Some(Identity::parse(&message.message));
                return;
            }
        }

        warn!(id = %message.id, label = %message.label, "dropping status message with no open record");
        let _ = writeln!(state.err, "dropped [{}] {message}", message.id);
    }

    fn attach_finished(&self) {
        let mut state = self.state.lock();
        if let Some(record) = state.current.take() {
            state.records.push(record);
        }
    }

    fn finished(&self) {
        let mut state = self.state.lock();
        if state.done {
            return;
        }
        state.done = true;
        if let Some(record) = state.current.take() {
            state.records.push(record);
        }
        match state.render() {
            Ok(json) => {
                let _ = writeln!(state.out, "{json}");
            }
            Err(e) => {
                let _ = writeln!(state.err, "error: cannot render report: {e}");
            }
        }
        let _ = state.out.flush();
    }

    fn error(&self, error: &dyn std::error::Error) {
        let _ = writeln!(self.state.lock().err, "error: {error}");
    }

    fn warn(&self, text: &str) {
        let _ = writeln!(self.state.lock().err, "warning: {text}");
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;

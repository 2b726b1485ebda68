// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable report, printed as events happen.

use std::io::Write;

use indexmap::IndexMap;
use latch_core::{Identity, InjectionArguments, StatusMessage, Target};
use parking_lot::Mutex;
use tracing::debug;

use super::color::{self, codes};
use super::{entry_line, ReportSink, Writer};

struct Entry {
    target: Target,
    identity: Option<Identity>,
}

struct Current {
    id: String,
    success: bool,
}

struct PlainState {
    out: Writer,
    err: Writer,
    /// Listed targets keyed by id, enriched when their identity arrives.
    entries: IndexMap<String, Entry>,
    current: Option<Current>,
    attaches: usize,
    succeeded: usize,
    done: bool,
}

pub struct PlainSink {
    state: Mutex<PlainState>,
    colorize: bool,
}

impl PlainSink {
    pub fn new(out: Writer, err: Writer, colorize: bool) -> Self {
        Self {
            state: Mutex::new(PlainState {
                out,
                err,
                entries: IndexMap::new(),
                current: None,
                attaches: 0,
                succeeded: 0,
                done: false,
            }),
            colorize,
        }
    }

    fn paint(&self, code: u8, text: &str) -> String {
        color::paint(code, text, self.colorize)
    }
}

impl ReportSink for PlainSink {
    fn list(&self, target: &Target) {
        let line = self.paint(codes::HEADER, &entry_line(target, None));
        let mut state = self.state.lock();
        let _ = writeln!(state.out, "{line}");
        state.entries.insert(target.id.clone(), Entry { target: target.clone(), identity: None });
    }

    fn attach_started(&self, target: &Target, _arguments: &InjectionArguments) {
        let line = self.paint(codes::HEADER, &entry_line(target, None));
        let mut state = self.state.lock();
        let _ = writeln!(state.out, "{line}");
        if let Some(command) = &target.command_line {
            let _ = writeln!(state.out, "    command: {command}");
        }
        state.current = Some(Current { id: target.id.clone(), success: false });
        state.attaches += 1;
    }

    fn write(&self, message: StatusMessage) {
        let text = self.paint(color::for_message(&message), &message.to_string());
        let mut state = self.state.lock();
        let state = &mut *state;

        match state.current.as_mut() {
            Some(current) if current.id == message.id => {
                current.success |= message.is_success();
                let _ = writeln!(state.out, "    {text}");
            }
            Some(_) => {
                let _ = writeln!(state.err, "[{}] {text}", message.id);
            }
            None => match state.entries.get_mut(&message.id) {
                Some(entry) if message.is_identity() => {
                    let identity = Identity::parse(&message.message);
                    let line = color::paint(codes::HEADER, &entry_line(&entry.target, Some(&identity)), self.colorize);
                    entry.identity = Some(identity);
                    let _ = writeln!(state.out, "{line}");
                }
                Some(_) => debug!(id = %message.id, label = %message.label, "suppressed while listing"),
                None => {
                    let _ = writeln!(state.err, "[{}] {text}", message.id);
                }
            },
        }
    }

    fn attach_finished(&self) {
        let mut state = self.state.lock();
        if let Some(current) = state.current.take() {
            if current.success {
                state.succeeded += 1;
            }
        }
    }

    fn finished(&self) {
        let mut state = self.state.lock();
        if state.done {
            return;
        }
        state.done = true;
        if state.attaches > 0 {
            let noun = if state.attaches == 1 { "attach" } else { "attaches" };
            let summary = format!("{} {noun}, {} succeeded", state.attaches, state.succeeded);
            let _ = writeln!(state.out, "{summary}");
        }
        let _ = state.out.flush();
        let _ = state.err.flush();
    }

    fn error(&self, error: &dyn std::error::Error) {
        let text = self.paint(codes::ERROR, &format!("error: {error}"));
        let _ = writeln!(self.state.lock().err, "{text}");
    }

    fn warn(&self, text: &str) {
        let text = self.paint(codes::WARN, &format!("warning: {text}"));
        let _ = writeln!(self.state.lock().err, "{text}");
    }
}

#[cfg(test)]
#[path = "plain_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{InjectionArguments, StatusMessage, Target};

/// Everything known about one attach attempt.
///
/// Messages are kept in arrival order, which is network delivery order and not
/// necessarily the order the payload produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachRecord {
    pub target: Target,
    pub arguments: InjectionArguments,
    pub messages: Vec<StatusMessage>,
}

impl AttachRecord {
    pub fn new(target: Target, arguments: InjectionArguments) -> Self {
        Self { target, arguments, messages: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.target.id
    }

    pub fn push(&mut self, message: StatusMessage) {
        self.messages.push(message);
    }

    /// True iff any received message is a success marker.
    pub fn success(&self) -> bool {
        self.messages.iter().any(StatusMessage::is_success)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

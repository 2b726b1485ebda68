// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

/// A candidate host process.
///
/// Produced by the lister and never mutated afterwards. `id` is the process id
/// as the attach mechanism understands it and doubles as the correlation id for
/// everything reported back about this process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_version: Option<String>,
    #[serde(default)]
    pub attachable: bool,
}

impl Target {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            command_line: None,
            vm_version: None,
            attachable: true,
        }
    }

    pub fn with_command_line(mut self, command_line: impl Into<String>) -> Self {
        self.command_line = Some(command_line.into());
        self
    }

    pub fn with_vm_version(mut self, vm_version: impl Into<String>) -> Self {
        self.vm_version = Some(vm_version.into());
        self
    }

    pub fn with_attachable(mut self, attachable: bool) -> Self {
        self.attachable = attachable;
        self
    }

    /// Command shown in reports: the full command line when known, else the display name.
    pub fn command(&self) -> &str {
        self.command_line.as_deref().unwrap_or(&self.display_name)
    }

    /// Numeric form of the id, when it is one.
    pub fn pid(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.display_name)
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target lister and filter.
//!
//! A [`TargetSource`] yields a fresh snapshot per call; [`list_targets`] then
//! drops entries with an empty display name, then entries whose display name
//! contains a deny-listed substring.

mod procfs;

pub use procfs::{display_name, ProcfsSource};

use latch_core::Target;
use tracing::debug;

/// Display-name substrings that are never attach candidates: this tool and
/// JVM housekeeping processes (build daemons, IDE helpers, JDK tools).
pub const DEFAULT_DENY: &[&str] = &[
    "latch",
    "org.gradle.launcher.daemon",
    "org.gradle.wrapper.GradleWrapperMain",
    "org.jetbrains.idea.maven.server",
    "org.jetbrains.jps.cmdline.Launcher",
    "org.jetbrains.kotlin.daemon",
    "com.intellij.idea.Main",
    "sun.tools.jps",
    "sun.tools.jcmd",
    "jdk.jcmd",
    "sun.tools.jconsole",
];

/// Enumerates candidate processes.
pub trait TargetSource: Send + Sync {
    /// A fresh snapshot. Processes whose metadata cannot be read (usually
    /// because they exited mid-scan) are left out.
    fn list(&self) -> Vec<Target>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyList {
    entries: Vec<String>,
}

impl Default for DenyList {
    fn default() -> Self {
        Self { entries: DEFAULT_DENY.iter().map(|s| s.to_string()).collect() }
    }
}

impl DenyList {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with(mut self, entry: impl Into<String>) -> Self {
        self.push(entry);
        self
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        // An empty entry would match every name.
        if !entry.is_empty() && !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn denies(&self, display_name: &str) -> bool {
        self.entries.iter().any(|entry| display_name.contains(entry.as_str()))
    }
}

impl<S: Into<String>> Extend<S> for DenyList {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// Snapshot `source` and apply both filters, in order.
pub fn list_targets(source: &dyn TargetSource, deny: &DenyList) -> Vec<Target> {
    source
        .list()
        .into_iter()
        .filter(|target| !target.display_name.is_empty())
        .filter(|target| {
            let denied = deny.denies(&target.display_name);
            if denied {
                debug!(pid = %target.id, name = %target.display_name, "skipping deny-listed process");
            }
            !denied
        })
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use latch_core::Target;

    use super::TargetSource;

    /// Fixed list of targets for tests.
    #[derive(Debug, Clone, Default)]
    pub struct StaticSource {
        targets: Vec<Target>,
    }

    impl StaticSource {
        pub fn new(targets: Vec<Target>) -> Self {
            Self { targets }
        }
    }

    impl TargetSource for StaticSource {
        fn list(&self) -> Vec<Target> {
            self.targets.clone()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::StaticSource;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JVM discovery through procfs.

use std::fs;
use std::path::{Path, PathBuf};

use latch_core::Target;
use tracing::{trace, warn};

use super::TargetSource;

/// JVM launcher options whose value is the following argument.
const OPTIONS_WITH_VALUE: &[&str] = &[
    "-cp",
    "-classpath",
    "--class-path",
    "-p",
    "--module-path",
    "--upgrade-module-path",
    "--add-modules",
    "--limit-modules",
    "--add-reads",
    "--add-exports",
    "--add-opens",
    "--patch-module",
];

/// Lists Java processes visible under a procfs root.
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    root: PathBuf,
    self_pid: u32,
    euid: u32,
}

impl ProcfsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            self_pid: std::process::id(),
            euid: nix::unistd::geteuid().as_raw(),
        }
    }

    /// Evaluate attachability as if running under `euid`.
    pub fn with_euid(mut self, euid: u32) -> Self {
        self.euid = euid;
        self
    }

    fn read_target(&self, pid: u32) -> Option<Target> {
        let dir = self.root.join(pid.to_string());
        let raw = fs::read(dir.join("cmdline")).ok()?;
        let argv = split_cmdline(&raw);
        if !is_java(argv.first()?) {
            return None;
        }

        let mut target = Target::new(pid.to_string(), display_name(&argv[1..]))
            .with_command_line(argv.join(" "))
            .with_attachable(self.attachable(&dir));
        if let Some(version) = vm_version(&dir) {
            target = target.with_vm_version(version);
        }
        trace!(pid, name = %target.display_name, "found jvm");
        Some(target)
    }

    /// Same effective uid as ours, or we are root.
    fn attachable(&self, dir: &Path) -> bool {
        if self.euid == 0 {
            return true;
        }
        effective_uid(dir).is_some_and(|uid| uid == self.euid)
    }
}

impl TargetSource for ProcfsSource {
    fn list(&self) -> Vec<Target> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "cannot read process table");
                return Vec::new();
            }
        };

        let mut pids: Vec<u32> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .filter(|pid| *pid != self.self_pid)
            .collect();
        pids.sort_unstable();

        pids.into_iter().filter_map(|pid| self.read_target(pid)).collect()
    }
}

fn split_cmdline(raw: &[u8]) -> Vec<String> {
    raw.split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect()
}

fn is_java(argv0: &str) -> bool {
    Path::new(argv0).file_name().and_then(|n| n.to_str()) == Some("java")
}

/// Name a JVM the way JVM tooling does: the main class (or `-jar` file, or
/// module) followed by the application arguments. Launcher options are skipped.
pub fn display_name(args: &[String]) -> String {
    let mut iter = args.iter().map(String::as_str);
    while let Some(arg) = iter.next() {
        match arg {
            "-jar" | "-m" | "--module" => return join(iter),
            opt if OPTIONS_WITH_VALUE.contains(&opt) => {
                iter.next();
            }
            opt if opt.starts_with("--module=") => {
                let module = opt.trim_start_matches("--module=");
                return join(std::iter::once(module).chain(iter));
            }
            opt if opt.starts_with('-') => {}
            main => return join(std::iter::once(main).chain(iter)),
        }
    }
    String::new()
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn effective_uid(dir: &Path) -> Option<u32> {
    let status = fs::read_to_string(dir.join("status")).ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|fields| fields.split_whitespace().nth(1))
        .and_then(|uid| uid.parse().ok())
}

/// `JAVA_VERSION` from the `release` file of the JDK the process runs.
fn vm_version(dir: &Path) -> Option<String> {
    let exe = fs::read_link(dir.join("exe")).ok()?;
    // Prefer the process's own mount namespace, then the host view.
    let in_ns = exe.strip_prefix("/").ok().map(|rel| dir.join("root").join(rel));
    let bin_dir = in_ns
        .filter(|path| path.exists())
        .unwrap_or(exe)
        .parent()?
        .to_path_buf();
    let home = bin_dir.parent()?;
    // JDK 8 keeps java under jre/bin with the release file one level up.
    let version = [Some(home), home.parent()]
        .into_iter()
        .flatten()
        .find_map(|dir| fs::read_to_string(dir.join("release")).ok())
        .and_then(|release| parse_release(&release));
    version
}

fn parse_release(release: &str) -> Option<String> {
    release
        .lines()
        .find_map(|line| line.strip_prefix("JAVA_VERSION="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "procfs_tests.rs"]
mod tests;

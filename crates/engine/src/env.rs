// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

fn millis(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// First candidate callback port (`LATCH_BASE_PORT`, default 17400).
pub fn base_port() -> u16 {
    std::env::var("LATCH_BASE_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(17400)
}

/// Number of sequential ports tried (`LATCH_PORT_ATTEMPTS`, default 500).
pub fn port_attempts() -> u16 {
    std::env::var("LATCH_PORT_ATTEMPTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(500)
}

/// Callback listener address (`LATCH_BIND_HOST`, default loopback).
pub fn bind_host() -> IpAddr {
    std::env::var("LATCH_BIND_HOST")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

pub fn flush_quiet() -> Duration {
    millis("LATCH_FLUSH_QUIET_MS", Duration::from_millis(250))
}

pub fn flush_max() -> Duration {
    millis("LATCH_FLUSH_MAX_MS", Duration::from_secs(1))
}

pub fn stop_timeout() -> Duration {
    millis("LATCH_STOP_TIMEOUT_MS", Duration::from_secs(1))
}

/// Upper bound for reading one frame from an accepted connection.
pub fn decode_timeout() -> Duration {
    millis("LATCH_DECODE_TIMEOUT_MS", Duration::from_secs(5))
}

/// How long to wait for a target's attach socket to show up.
pub fn attach_timeout() -> Duration {
    millis("LATCH_ATTACH_TIMEOUT_MS", Duration::from_secs(10))
}

/// Temp dir holding HotSpot attach sockets (`LATCH_TMPDIR`, default `/tmp`).
pub fn tmp_dir() -> PathBuf {
    std::env::var("LATCH_TMPDIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// procfs mount (`LATCH_PROC_ROOT`, default `/proc`).
pub fn proc_root() -> PathBuf {
    std::env::var("LATCH_PROC_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/proc"))
}

/// Default payload path (`LATCH_AGENT`).
pub fn agent_path() -> Option<PathBuf> {
    std::env::var("LATCH_AGENT").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Log filter directives (`LATCH_LOG`, default `warn`).
pub fn log_filter() -> String {
    std::env::var("LATCH_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "warn".to_string())
}

/// Log to this file instead of stderr (`LATCH_LOG_FILE`).
pub fn log_file() -> Option<PathBuf> {
    std::env::var("LATCH_LOG_FILE").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

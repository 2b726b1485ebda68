// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod attach;
pub mod list;
pub mod send;

use std::path::PathBuf;

use latch_engine::{env, DenyList};

use crate::exit_error::ExitError;

/// Parse a `KEY=VALUE` argument. The value may itself contain `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

/// Default deny list plus `--exclude` entries.
pub(crate) fn deny_list(exclude: Vec<String>) -> DenyList {
    let mut deny = DenyList::default();
    deny.extend(exclude);
    deny
}

/// Resolve the payload path from `--agent` or `LATCH_AGENT`.
///
/// The target resolves the path from its own working directory, so it is
/// made absolute here.
pub(crate) fn resolve_agent(flag: Option<PathBuf>) -> Result<PathBuf, ExitError> {
    let agent = flag
        .or_else(env::agent_path)
        .ok_or_else(|| ExitError::usage("no payload given: pass --agent or set LATCH_AGENT"))?;
    std::fs::canonicalize(&agent)
        .map_err(|e| ExitError::usage(format!("payload {} not found: {e}", agent.display())))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

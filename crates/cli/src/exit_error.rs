// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Command handlers return `ExitError` instead of calling
//! `std::process::exit()`, so `main()` can flush logs before terminating.

use std::fmt;

/// Nothing matched, or a status message could not be delivered.
pub const EXIT_FAILURE: i32 = 1;
/// Invalid invocation.
pub const EXIT_USAGE: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Exit code and message for an error returned by a command handler.
pub fn exit_status(error: &anyhow::Error) -> (i32, String) {
    match error.downcast_ref::<ExitError>() {
        Some(exit) => (exit.code, exit.message.clone()),
        None => (EXIT_FAILURE, format!("error: {error:#}")),
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;

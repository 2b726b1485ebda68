// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! latch-core: data model shared by the attach controller, the callback
//! protocol and the report sinks.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod args;
pub mod message;
pub mod record;
pub mod target;

pub use args::{ArgsError, InjectionArguments};
pub use message::{
    Identity, Level, ParseLevelError, StatusMessage, ERROR_LABEL, IDENTITY_LABEL, SUCCESS_LABEL,
};
pub use record::AttachRecord;
pub use target::Target;

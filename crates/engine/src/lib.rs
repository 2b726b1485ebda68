// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! latch-engine: process discovery, payload attach and status collection.
//!
//! A batch runs on two execution contexts: the caller drives the lister and
//! the [`Orchestrator`] sequentially, while a spawned task runs the
//! [`StatusServer`] accept loop. They share nothing but the [`ReportSink`].

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod attach;
pub mod batch;
pub mod config;
pub mod discovery;
pub mod env;
pub mod orchestrator;
pub mod report;
pub mod server;

pub use attach::{classify, AttachError, Attacher, HotSpotAttacher, HotSpotConfig, BENIGN_ATTACH_QUIRK};
pub use batch::{Batch, BatchSummary, Selection};
pub use config::Config;
pub use discovery::{list_targets, DenyList, ProcfsSource, TargetSource};
pub use orchestrator::{AttachOutcome, Orchestrator};
pub use report::{ReportFormat, ReportSink};
pub use server::{ServerConfig, ServerHandle, ServerPhase, StatusServer};

#[cfg(any(test, feature = "test-support"))]
pub use attach::FakeAttacher;
#[cfg(any(test, feature = "test-support"))]
pub use discovery::StaticSource;
#[cfg(any(test, feature = "test-support"))]
pub use report::{RecordingSink, SharedBuffer, SinkEvent};

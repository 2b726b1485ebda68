// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use latch_core::InjectionArguments;
use latch_engine::{report, Batch, Config, HotSpotAttacher, ProcfsSource};

use crate::color;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ListArgs {
    /// Attach to each process and report the applications it hosts
    #[arg(long)]
    pub identify: bool,

    /// Payload used by --identify [default: $LATCH_AGENT]
    #[arg(long, value_name = "PATH")]
    pub agent: Option<PathBuf>,

    /// Skip processes whose display name contains TEXT
    #[arg(long, value_name = "TEXT")]
    pub exclude: Vec<String>,

    #[arg(short = 'o', long = "output", value_enum, default_value_t)]
    pub output: OutputFormat,
}

pub async fn handle(args: ListArgs, config: Config) -> Result<()> {
    let agent = if args.identify { super::resolve_agent(args.agent)? } else { PathBuf::new() };

    let sink = report::build(args.output.into(), color::should_colorize());
    let attacher = HotSpotAttacher::new(agent, config.hotspot.clone());
    let source = ProcfsSource::new(config.proc_root.clone());
    let batch =
        Batch::new(config, sink, Arc::new(attacher), Arc::new(source)).with_deny(super::deny_list(args.exclude));

    batch.run_list(args.identify, &InjectionArguments::new()).await;
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgGroup, Args};
use latch_core::InjectionArguments;
use latch_engine::{report, Batch, Config, HotSpotAttacher, ProcfsSource, Selection};

use crate::color;
use crate::exit_error::{ExitError, EXIT_FAILURE};
use crate::output::OutputFormat;

#[derive(Args)]
#[command(group(ArgGroup::new("selection").required(true).args(["pids", "all"])))]
pub struct AttachArgs {
    /// Process id to attach to (repeatable)
    #[arg(long = "pid", value_name = "ID")]
    pub pids: Vec<String>,

    /// Attach to every candidate process
    #[arg(long)]
    pub all: bool,

    /// Payload to load [default: $LATCH_AGENT]
    #[arg(long, value_name = "PATH")]
    pub agent: Option<PathBuf>,

    /// Application name reported by the payload
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Environment override passed to the payload (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = super::parse_key_value)]
    pub env: Vec<(String, String)>,

    /// System property override passed to the payload (repeatable)
    #[arg(long = "prop", value_name = "KEY=VALUE", value_parser = super::parse_key_value)]
    pub props: Vec<(String, String)>,

    /// Skip processes whose display name contains TEXT
    #[arg(long, value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Do not listen for status messages from the payload
    #[arg(long)]
    pub no_callback: bool,

    #[arg(short = 'o', long = "output", value_enum, default_value_t)]
    pub output: OutputFormat,
}

impl AttachArgs {
    fn base_arguments(&self) -> InjectionArguments {
        let mut base = InjectionArguments::new();
        for (key, value) in &self.env {
            base = base.env(key, value);
        }
        for (key, value) in &self.props {
            base = base.property(key, value);
        }
        if let Some(name) = &self.app_name {
            base = base.app_name(name);
        }
        base
    }

    fn selection(&self) -> Selection {
        if self.all {
            Selection::All
        } else {
            Selection::Ids(self.pids.clone())
        }
    }
}

pub async fn handle(args: AttachArgs, config: Config) -> Result<()> {
    let agent = super::resolve_agent(args.agent.clone())?;
    let base = args.base_arguments();
    let selection = args.selection();

    let sink = report::build(args.output.into(), color::should_colorize());
    let attacher = HotSpotAttacher::new(agent, config.hotspot.clone());
    let source = ProcfsSource::new(config.proc_root.clone());
    let batch =
        Batch::new(config, sink, Arc::new(attacher), Arc::new(source)).with_deny(super::deny_list(args.exclude));

    let summary = batch.run_attach(&selection, &base, !args.no_callback).await;
    if summary.attempted == 0 {
        return Err(ExitError::new(EXIT_FAILURE, "no matching process to attach to").into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "attach_tests.rs"]
mod tests;

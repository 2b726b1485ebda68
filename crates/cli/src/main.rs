// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! latch: attach a payload to running JVMs and collect what it reports back.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod commands;
mod exit_error;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use latch_engine::Config;

use crate::commands::{attach, list, send};

#[derive(Parser)]
#[command(name = "latch", version, about = "Attach a payload to running JVMs and collect its status reports")]
#[command(styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate processes
    List(list::ListArgs),
    /// Load the payload into running processes and report the outcome
    Attach(attach::AttachArgs),
    /// Send one status message to a callback listener
    Send(send::SendArgs),
}

#[tokio::main]
async fn main() {
    let guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    };

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::List(args) => list::handle(args, Config::load()).await,
        Commands::Attach(args) => attach::handle(args, Config::load()).await,
        Commands::Send(args) => send::handle(args).await,
    };

    if let Err(e) = result {
        let (code, message) = exit_error::exit_status(&e);
        if !message.is_empty() {
            eprintln!("{message}");
        }
        drop(guard);
        std::process::exit(code);
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

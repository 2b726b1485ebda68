// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;
use latch_core::{Level, StatusMessage};
use tracing::debug;

use crate::exit_error::{ExitError, EXIT_FAILURE};

#[derive(Args)]
pub struct SendArgs {
    /// Callback listener host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Callback listener port
    #[arg(long)]
    pub port: u16,

    /// Correlation id (the target's process id)
    #[arg(long)]
    pub id: String,

    /// INFO, WARN or ERROR
    #[arg(long, default_value = "INFO")]
    pub level: Level,

    #[arg(long)]
    pub label: String,

    pub message: String,
}

pub async fn handle(args: SendArgs) -> Result<()> {
    let message = StatusMessage::new(args.id, args.level, args.label, args.message);
    latch_wire::send(&args.host, args.port, &message).await.map_err(|e| {
        ExitError::new(EXIT_FAILURE, format!("cannot deliver status message to {}:{}: {e}", args.host, args.port))
    })?;
    debug!(host = %args.host, port = args.port, "status message sent");
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn send_parses_level_case_insensitively() {
    let cli = Cli::try_parse_from(["latch", "send", "--port", "17400", "--id", "42", "--level", "warn", "--label", "Agent", "hello"])
        .unwrap();
    match cli.command {
        Commands::Send(args) => {
            assert_eq!(args.level, latch_core::Level::Warn);
            assert_eq!(args.host, "127.0.0.1");
            assert_eq!(args.message, "hello");
        }
        _ => panic!("expected send"),
    }
}

#[test]
fn send_rejects_unknown_level() {
    let result = Cli::try_parse_from(["latch", "send", "--port", "1", "--id", "1", "--level", "loud", "--label", "x", "y"]);
    assert!(result.is_err());
}

#[test]
fn list_defaults() {
    let cli = Cli::try_parse_from(["latch", "list"]).unwrap();
    match cli.command {
        Commands::List(args) => {
            assert!(!args.identify);
            assert!(args.exclude.is_empty());
            assert_eq!(args.output, output::OutputFormat::Text);
        }
        _ => panic!("expected list"),
    }
}

//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("attach").stdout_has("list");
}

#[test]
fn no_args_is_a_usage_error() {
    cli().exits(2).stderr_has("Usage:");
}

#[test]
fn attach_help_lists_flags() {
    cli()
        .args(&["attach", "--help"])
        .passes()
        .stdout_has("--pid")
        .stdout_has("--all")
        .stdout_has("--no-callback")
        .stdout_has("KEY=VALUE");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

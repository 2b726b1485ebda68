// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use latch_core::{Level, StatusMessage};

pub mod codes {
    /// Entry lines: pastel cyan / steel blue
    pub const HEADER: u8 = 74;
    /// INFO: light grey
    pub const INFO: u8 = 250;
    /// WARN: amber
    pub const WARN: u8 = 178;
    /// ERROR: soft red
    pub const ERROR: u8 = 167;
    /// Success marker: green
    pub const SUCCESS: u8 = 114;
}

const RESET: &str = "\x1b[0m";

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

pub fn paint(code: u8, text: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

pub fn for_level(level: Level) -> u8 {
    match level {
        Level::Info => codes::INFO,
        Level::Warn => codes::WARN,
        Level::Error => codes::ERROR,
    }
}

pub fn for_message(message: &StatusMessage) -> u8 {
    if message.is_success() {
        codes::SUCCESS
    } else {
        for_level(message.level)
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;

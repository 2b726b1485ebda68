// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status callback protocol.
//!
//! One message per TCP connection, no response. Frame: 8-byte big-endian
//! version marker, then id, level name, label and message text, each a
//! 2-byte big-endian length prefix followed by UTF-8 bytes.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod frame;

pub use client::{send, StatusClient, CONNECT_TIMEOUT, LINGER};
pub use frame::{
    decode_frame, encode_frame, read_status, write_status, ProtocolError, MAX_STRING_LEN,
    PROTOCOL_VERSION,
};

#[cfg(test)]
mod property_tests;

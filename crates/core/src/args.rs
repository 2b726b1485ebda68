// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arguments handed to a target together with the payload.
//!
//! Encoded form: JSON, zlib-compressed, base64 armoured. The attach call only
//! carries a single string argument, so the armour keeps it free of `=`/`,`
//! separators and NULs.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Target;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("failed to serialize arguments: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to compress arguments: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-target payload arguments.
///
/// A batch builds one base instance from the command line and derives a copy
/// per target with [`InjectionArguments::for_target`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionArguments {
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    /// Correlation id, assigned at attach time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    /// Ask the payload to report its identity only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub discover: bool,
}

impl InjectionArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn discover(mut self, discover: bool) -> Self {
        self.discover = discover;
        self
    }

    /// Derive the arguments for one target: the base plus the callback port,
    /// the correlation id and the command line hint.
    pub fn for_target(&self, target: &Target, server_port: Option<u16>) -> Self {
        let mut args = self.clone();
        args.server_port = server_port;
        args.id = Some(target.id.clone());
        args.command_line = Some(target.command().to_string());
        args
    }

    pub fn to_json(&self) -> Result<String, ArgsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Armoured transport form.
    pub fn encode(&self) -> Result<String, ArgsError> {
        let json = self.to_json()?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes())?;
        let compressed = encoder.finish()?;
        Ok(B64.encode(compressed))
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// Also accepts base64 without compression and raw JSON, which is what
    /// hand-written test payloads tend to send.
    pub fn decode(encoded: &str) -> Result<Self, ArgsError> {
        let trimmed = encoded.trim();
        let json = match B64.decode(trimmed) {
            Ok(bytes) => {
                let mut inflated = String::new();
                match ZlibDecoder::new(bytes.as_slice()).read_to_string(&mut inflated) {
                    Ok(_) => inflated,
                    Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
                }
            }
            Err(_) => trimmed.to_string(),
        };
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status messages reported back by injected payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label marking a fully successful attach; the message carries the endpoint.
pub const SUCCESS_LABEL: &str = "Url";

/// Label of the identity report sent by payloads in discovery mode.
pub const IDENTITY_LABEL: &str = "Identity";

/// Label used for attach failures raised by the controller itself.
pub const ERROR_LABEL: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" | "SEVERE" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// One unit of asynchronous feedback, scoped to a correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub id: String,
    pub level: Level,
    pub label: String,
    pub message: String,
}

impl StatusMessage {
    pub fn new(
        id: impl Into<String>,
        level: Level,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), level, label: label.into(), message: message.into() }
    }

    pub fn info(id: impl Into<String>, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Level::Info, label, message)
    }

    pub fn warn(id: impl Into<String>, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Level::Warn, label, message)
    }

    pub fn error(id: impl Into<String>, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(id, Level::Error, label, message)
    }

    /// Success marker carrying the endpoint the payload brought up.
    pub fn success(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(id, Level::Info, SUCCESS_LABEL, url)
    }

    pub fn is_success(&self) -> bool {
        self.label == SUCCESS_LABEL
    }

    pub fn is_identity(&self) -> bool {
        self.label == IDENTITY_LABEL
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.level, self.label, self.message)
    }
}

/// What a payload in discovery mode says about the application it runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub application_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl Identity {
    /// Parse an identity message body.
    ///
    /// JSON object first; anything else is read as a comma separated list of
    /// application names.
    pub fn parse(body: &str) -> Self {
        if let Ok(identity) = serde_json::from_str::<Identity>(body) {
            return identity;
        }
        let application_names = body
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Identity { application_names, container_name: None }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame codec for status messages.

use latch_core::{Level, StatusMessage};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Version marker written at the start of every frame.
pub const PROTOCOL_VERSION: i64 = 1;

/// Longest string a 2-byte length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Errors from encoding, decoding or transporting a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,

    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(i64),

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("string field too long: {0} bytes")]
    StringTooLong(usize),

    #[error("unknown level: {0}")]
    UnknownLevel(String),
}

impl From<std::io::Error> for ProtocolError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    }
}

fn fields(message: &StatusMessage) -> [&str; 4] {
    [&message.id, message.level.as_str(), &message.label, &message.message]
}

fn assemble(
    version: i64,
    [id, level, label, message]: [String; 4],
) -> Result<StatusMessage, ProtocolError> {
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }
    let level: Level = level.parse().map_err(|_| ProtocolError::UnknownLevel(level))?;
    Ok(StatusMessage { id, level, label, message })
}

/// Encode a message into a complete frame.
pub fn encode_frame(message: &StatusMessage) -> Result<Vec<u8>, ProtocolError> {
    let fields = fields(message);
    let mut buf = Vec::with_capacity(8 + fields.iter().map(|f| 2 + f.len()).sum::<usize>());
    buf.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    for field in fields {
        let len = u16::try_from(field.len())
            .map_err(|_| ProtocolError::StringTooLong(field.len()))?;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(field.as_bytes());
    }
    Ok(buf)
}

/// Decode a frame from a byte slice. Trailing bytes are ignored.
pub fn decode_frame(bytes: &[u8]) -> Result<StatusMessage, ProtocolError> {
    let mut cursor = bytes;
    let version = i64::from_be_bytes(take::<8>(&mut cursor)?);
    let mut strings: [String; 4] = Default::default();
    for slot in &mut strings {
        let len = u16::from_be_bytes(take::<2>(&mut cursor)?) as usize;
        if cursor.len() < len {
            return Err(ProtocolError::ConnectionClosed);
        }
        let (head, rest) = cursor.split_at(len);
        *slot = std::str::from_utf8(head).map_err(|_| ProtocolError::InvalidUtf8)?.to_string();
        cursor = rest;
    }
    assemble(version, strings)
}

fn take<const N: usize>(cursor: &mut &[u8]) -> Result<[u8; N], ProtocolError> {
    if cursor.len() < N {
        return Err(ProtocolError::ConnectionClosed);
    }
    let (head, rest) = cursor.split_at(N);
    let mut out = [0u8; N];
    out.copy_from_slice(head);
    *cursor = rest;
    Ok(out)
}

/// Read one frame from a stream.
pub async fn read_status<R>(reader: &mut R) -> Result<StatusMessage, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let version = reader.read_i64().await?;
    // Fail before reading the body: an unknown version says nothing about its layout.
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }
    let mut strings: [String; 4] = Default::default();
    for slot in &mut strings {
        *slot = read_string(reader).await?;
    }
    assemble(version, strings)
}

async fn read_string<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let len = reader.read_u16().await? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|_| ProtocolError::InvalidUtf8)
}

/// Write one frame to a stream and flush it.
pub async fn write_status<W>(writer: &mut W, message: &StatusMessage) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HotSpot dynamic attach over the target's `.java_pid<pid>` socket.
//!
//! When the socket is missing the listener is started by dropping an
//! `.attach_pid<pid>` trigger file and sending `SIGQUIT`, then polling for
//! the socket. Pids are translated into the target's own pid namespace so
//! containerised JVMs can be reached through `/proc/<pid>/root`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use latch_core::Target;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::Instant;
use tracing::debug;

use super::{AttachError, Attacher};

const PROTOCOL_VERSION: &str = "1";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct HotSpotConfig {
    /// Temp directory used when the target has no visible mount namespace.
    pub tmp_dir: PathBuf,
    pub proc_root: PathBuf,
    /// How long to wait for the attach listener after signalling.
    pub socket_timeout: Duration,
}

impl Default for HotSpotConfig {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from("/tmp"),
            proc_root: PathBuf::from("/proc"),
            socket_timeout: Duration::from_secs(10),
        }
    }
}

/// Loads a `java.lang.instrument` agent jar into a running HotSpot VM.
#[derive(Debug, Clone)]
pub struct HotSpotAttacher {
    agent: PathBuf,
    config: HotSpotConfig,
}

impl HotSpotAttacher {
    pub fn new(agent: impl Into<PathBuf>, config: HotSpotConfig) -> Self {
        Self { agent: agent.into(), config }
    }

    pub fn agent(&self) -> &Path {
        &self.agent
    }

    /// Pid as seen inside the target's own namespace (last `NSpid:` field).
    async fn namespaced_pid(&self, pid: i32) -> i32 {
        let status = self.config.proc_root.join(pid.to_string()).join("status");
        fs::read_to_string(status)
            .await
            .ok()
            .and_then(|text| {
                text.lines()
                    .find_map(|line| line.strip_prefix("NSpid:"))
                    .and_then(|fields| fields.split_whitespace().last())
                    .and_then(|field| field.parse().ok())
            })
            .unwrap_or(pid)
    }

    async fn tmp_dir(&self, pid: i32) -> PathBuf {
        let namespaced = self.config.proc_root.join(pid.to_string()).join("root/tmp");
        if fs::metadata(&namespaced).await.is_ok_and(|meta| meta.is_dir()) {
            namespaced
        } else {
            self.config.tmp_dir.clone()
        }
    }

    async fn create_trigger(&self, pid: i32, ns_pid: i32, tmp: &Path) -> Result<PathBuf, AttachError> {
        let name = format!(".attach_pid{ns_pid}");
        let cwd = self.config.proc_root.join(pid.to_string()).join("cwd").join(&name);
        let mut last = None;
        for path in [cwd, tmp.join(&name)] {
            match fs::File::create(&path).await {
                Ok(_) => return Ok(path),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "cannot create attach trigger");
                    last = Some(e);
                }
            }
        }
        Err(last.map(AttachError::Io).unwrap_or_else(|| AttachError::Other("no trigger path".into())))
    }

    async fn start_listener(&self, pid: i32, ns_pid: i32, tmp: &Path, socket: &Path) -> Result<(), AttachError> {
        let trigger = self.create_trigger(pid, ns_pid, tmp).await?;
        let result = self.signal_and_wait(pid, socket).await;
        let _ = fs::remove_file(&trigger).await;
        result
    }

    async fn signal_and_wait(&self, pid: i32, socket: &Path) -> Result<(), AttachError> {
        kill(Pid::from_raw(pid), Signal::SIGQUIT).map_err(|errno| match errno {
            Errno::ESRCH => AttachError::NoSuchProcess(pid),
            Errno::EPERM => AttachError::PermissionDenied(pid),
            other => AttachError::Io(other.into()),
        })?;

        let timeout = self.config.socket_timeout;
        let deadline = Instant::now() + timeout;
        while !exists(socket).await {
            if Instant::now() >= deadline {
                return Err(AttachError::ListenerTimeout { pid, waited_ms: timeout.as_millis() as u64 });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Attacher for HotSpotAttacher {
    async fn inject(&self, target: &Target, payload: &str) -> Result<(), AttachError> {
        let pid: i32 = match target.id.parse() {
            Ok(pid) if pid > 0 => pid,
            _ => return Err(AttachError::InvalidPid(target.id.clone())),
        };
        let ns_pid = self.namespaced_pid(pid).await;
        let tmp = self.tmp_dir(pid).await;
        let socket = tmp.join(format!(".java_pid{ns_pid}"));

        if !exists(&socket).await {
            debug!(pid, ns_pid, "starting attach listener");
            self.start_listener(pid, ns_pid, &tmp, &socket).await?;
        }

        let mut stream = UnixStream::connect(&socket).await?;
        let option = format!("{}={}", self.agent.display(), payload);
        stream.write_all(&encode_request("load", ["instrument", "false", &option])).await?;

        let mut response = String::new();
        stream.read_to_string(&mut response).await?;
        debug!(pid, response = %response.trim(), "attach listener replied");
        parse_response(&response)
    }
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// `<version>\0<command>\0<arg>\0<arg>\0<arg>\0`
pub(crate) fn encode_request(command: &str, args: [&str; 3]) -> Vec<u8> {
    let mut buf = Vec::new();
    for part in [PROTOCOL_VERSION, command].into_iter().chain(args) {
        buf.extend_from_slice(part.as_bytes());
        buf.push(0);
    }
    buf
}

/// First line is the command status; for `load` the second line carries the
/// agent's return code, either bare or as `return code: N`.
pub(crate) fn parse_response(response: &str) -> Result<(), AttachError> {
    if response.trim().is_empty() {
        return Err(AttachError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "attach listener closed without a reply",
        )));
    }

    let mut lines = response.lines();
    let status_line = lines.next().unwrap_or_default().trim();
    let status: i32 = status_line
        .parse()
        .map_err(|_| AttachError::NonNumeric(status_line.to_string()))?;
    if status != 0 {
        let detail = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        return Err(AttachError::Command { code: status, detail });
    }

    match lines.next().map(str::trim) {
        None | Some("") => Ok(()),
        Some(line) => {
            let code_text = line.strip_prefix("return code:").map(str::trim).unwrap_or(line);
            match code_text.parse::<i32>() {
                Ok(0) => Ok(()),
                Ok(code) => Err(AttachError::AgentInit(code)),
                Err(_) => Err(AttachError::NonNumeric(line.to_string())),
            }
        }
    }
}

#[cfg(test)]
#[path = "hotspot_tests.rs"]
mod tests;

//! Shared helpers for CLI specs.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Environment variables that would leak host settings into a spec run.
const SCRUBBED: &[&str] = &[
    "LATCH_AGENT",
    "LATCH_BASE_PORT",
    "LATCH_PORT_ATTEMPTS",
    "LATCH_BIND_HOST",
    "LATCH_PROC_ROOT",
    "LATCH_TMPDIR",
    "LATCH_LOG",
    "LATCH_LOG_FILE",
    "COLOR",
];

/// `latch` with a scrubbed environment and colour disabled.
pub fn cli() -> Cli {
    let mut cmd = Command::cargo_bin("latch").unwrap();
    for var in SCRUBBED {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    Cli { cmd }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(self) -> RunAssert {
        self.exits(0)
    }

    pub fn exits(self, code: i32) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code, Some(code), "unexpected exit code\nstdout: {}\nstderr: {}", run.stdout, run.stderr);
        run
    }

    fn run(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        RunAssert {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub struct RunAssert {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl RunAssert {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}:\n{}", self.stderr);
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}):\n{}", self.stdout))
    }
}

/// A fake procfs tree plus a temp dir for attach sockets.
pub struct Host {
    proc: TempDir,
    tmp: TempDir,
    payload: PathBuf,
    uid: u32,
}

impl Host {
    pub fn new() -> Self {
        let proc = TempDir::new().unwrap();
        let tmp = TempDir::new().unwrap();
        let payload = tmp.path().join("payload.jar");
        fs::write(&payload, b"PK").unwrap();
        let uid = fs::metadata(&payload).unwrap().uid();
        Self { proc, tmp, payload, uid }
    }

    /// Add a process running `argv`, owned by the current user.
    pub fn process(&self, pid: u32, argv: &[&str]) -> &Self {
        self.process_as(pid, self.uid, argv)
    }

    pub fn process_as(&self, pid: u32, uid: u32, argv: &[&str]) -> &Self {
        let dir = self.proc.path().join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        let mut cmdline = argv.join("\0");
        cmdline.push('\0');
        fs::write(dir.join("cmdline"), cmdline).unwrap();
        fs::write(
            dir.join("status"),
            format!("Name:\tjava\nUid:\t{uid}\t{uid}\t{uid}\t{uid}\nGid:\t100\t100\t100\t100\n"),
        )
        .unwrap();
        self
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn tmp(&self) -> &Path {
        self.tmp.path()
    }

    pub fn payload(&self) -> &str {
        self.payload.to_str().unwrap()
    }

    /// `latch` pointed at this host, with an ephemeral callback port.
    pub fn latch(&self) -> Cli {
        cli()
            .env("LATCH_PROC_ROOT", self.proc.path())
            .env("LATCH_TMPDIR", self.tmp.path())
            .env("LATCH_BASE_PORT", "0")
            .env("LATCH_PORT_ATTEMPTS", "1")
            .env("LATCH_FLUSH_QUIET_MS", "20")
            .env("LATCH_FLUSH_MAX_MS", "200")
            .env("LATCH_ATTACH_TIMEOUT_MS", "200")
    }
}

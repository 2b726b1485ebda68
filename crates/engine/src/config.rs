// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::attach::HotSpotConfig;
use crate::env;
use crate::server::ServerConfig;

/// Batch configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub hotspot: HotSpotConfig,
    /// procfs root used by the lister
    pub proc_root: PathBuf,
}

impl Config {
    /// Load configuration from `LATCH_*` environment variables.
    pub fn load() -> Self {
        let proc_root = env::proc_root();
        Self {
            server: ServerConfig {
                host: env::bind_host(),
                base_port: env::base_port(),
                attempts: env::port_attempts(),
                flush_quiet: env::flush_quiet(),
                flush_max: env::flush_max(),
                stop_timeout: env::stop_timeout(),
                decode_timeout: env::decode_timeout(),
            },
            hotspot: HotSpotConfig {
                tmp_dir: env::tmp_dir(),
                proc_root: proc_root.clone(),
                socket_timeout: env::attach_timeout(),
            },
            proc_root,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let hotspot = HotSpotConfig::default();
        Self { server: ServerConfig::default(), proc_root: hotspot.proc_root.clone(), hotspot }
    }
}

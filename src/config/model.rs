// src/config/model.rs

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{Result, WaitserveError};

/// Raw configuration as read from a TOML file, before validation.
///
/// ```toml
/// [server]
/// root = "./site"
/// bind = "127.0.0.1"
/// port = 8080
/// prefix = "/"
/// wait_timeout_secs = 0
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Directory to serve. Usually given on the command line instead.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// URL path prefix stripped from request paths before resolving them
    /// under `root`. Must start with `/`.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Upper bound on a single long-poll, in seconds. `0` waits forever.
    #[serde(default)]
    pub wait_timeout_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_prefix() -> String {
    "/".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            root: None,
            bind: default_bind(),
            port: default_port(),
            prefix: default_prefix(),
            wait_timeout_secs: 0,
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// `Default`, so the invariants checked there always hold.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerSection,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ServerSection::default())
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(server: ServerSection) -> Self {
        Self { server }
    }

    /// `None` means long-polls are unbounded.
    pub fn wait_timeout(&self) -> Option<Duration> {
        match self.server.wait_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.bind, self.server.port)
            .parse()
            .map_err(|e| {
                WaitserveError::ConfigError(format!(
                    "invalid listen address {}:{}: {e}",
                    self.server.bind, self.server.port
                ))
            })
    }
}

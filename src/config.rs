//! Server configuration.
//!
//! Defaults, optionally overlaid by a YAML file, then by the `LISTEN` and
//! `ROOT` environment variables:
//!
//! ```yaml
//! server:
//!   listen_addr: "127.0.0.1:8080"
//!   idle_timeout_ms: 0
//! static_files:
//!   root: "."
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Close sessions idle for this long. 0 keeps them open forever.
    pub idle_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            idle_timeout_ms: 0,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Defaults plus environment overrides.
    pub fn load() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Reads a YAML file, then applies environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut cfg = Self::from_yaml(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Parses YAML only; the environment is not consulted.
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.server.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("ROOT") {
            self.static_files.root = PathBuf::from(root);
        }
    }

    /// Listen on every interface at `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.listen_addr = format!("0.0.0.0:{port}");
        self
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.server.idle_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

/// Validates a port argument: decimal digits only, within `u16`.
pub fn parse_port(s: &str) -> Result<u16, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{s} is not a valid port number"));
    }
    s.parse()
        .map_err(|_| format!("{s} is not a valid port number"))
}

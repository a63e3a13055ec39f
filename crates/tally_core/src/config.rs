//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Port used when neither the config file nor `PORT` says otherwise.
pub const DEFAULT_PORT: u16 = 3334;

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(with = "socket_addr_serde")]
    pub listen_addr: SocketAddr,

    /// Number of PDF chunks buffered per response before the producer waits.
    pub pdf_stream_capacity: usize,

    /// Directory the standalone sample export writes into.
    pub output_dir: PathBuf,

    /// When set, logs are also written to daily files in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            pdf_stream_capacity: 8,
            output_dir: PathBuf::from("output"),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Save the config to a JSON file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Load config from a JSON file. A missing file is `Ok(None)`; an
    /// unreadable or corrupt one is an error.
    pub fn try_load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("Corrupt config file {}", path.display()))?;
        Ok(Some(config))
    }

    /// Load config from a JSON file, or return defaults if the file is
    /// missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("{e:#}, using defaults");
                Self::default()
            }
        }
    }

    /// Apply `PORT` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` in place of the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(raw) = lookup(PORT_ENV) else {
            return;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.listen_addr.set_port(port),
            Err(e) => tracing::warn!("Ignoring invalid {PORT_ENV}={raw:?}: {e}"),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.listen_addr.set_port(port);
        self
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

mod socket_addr_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::net::SocketAddr;

    pub fn serialize<S: Serializer>(addr: &SocketAddr, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&addr.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SocketAddr, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

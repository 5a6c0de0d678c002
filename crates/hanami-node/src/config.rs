//! TOML configuration for a Hanami node.
//!
//! The file lives at `/etc/<name>/<name>.conf` unless `--config` (or the
//! `HANAMI_CONFIG` environment variable) points elsewhere:
//!
//! ```toml
//! [default]
//! debug = false
//! log_path = "/var/log"
//! address = "127.0.0.1"
//! port = 4710
//! endpoints = ""
//! max_message_size = 1048576
//!
//! [groups.collector]
//! address = "10.0.0.2"
//! port = 4711
//! ```
//!
//! Every key has a default, so an empty file (or none at all, at the default
//! path) yields a usable configuration.  `[groups.<name>]` sections name the
//! outbound targets that `send --group <name>` resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hanami_core::HEADER_SIZE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for loading and validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A server was requested but no listen address is configured.
    #[error("[default] address must be set to run a server")]
    MissingListenAddress,

    /// A `[groups.<name>]` section is incomplete.
    #[error("group '{name}': {reason}")]
    InvalidGroup { name: String, reason: &'static str },

    /// `max_message_size` cannot even hold a header.
    #[error("max_message_size {configured} is smaller than a message header ({minimum} bytes)")]
    MessageSizeTooSmall { configured: usize, minimum: usize },

    /// No `[groups.<name>]` section with that name.
    #[error("no group named '{0}' in config")]
    UnknownGroup(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub default: DefaultConfig,
    /// Named outbound targets.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupConfig>,
}

/// The `[default]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultConfig {
    /// Log at `debug` instead of `info`.
    #[serde(default)]
    pub debug: bool,
    /// Directory that receives `<name>.log`.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// Listen address for `listen`.
    #[serde(default = "default_address")]
    pub address: String,
    /// Listen port for `listen`.  `0` lets the OS pick one.
    #[serde(default)]
    pub port: u16,
    /// Free-form endpoint list, passed through untouched.
    #[serde(default)]
    pub endpoints: String,
    /// Largest frame a connection may announce, header included.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

/// One `[groups.<name>]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: u16,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log")
}
fn default_address() -> String {
    "127.0.0.1".to_string()
}
fn default_max_message_size() -> usize {
    1024 * 1024
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            address: default_address(),
            port: 0,
            endpoints: String::new(),
            max_message_size: default_max_message_size(),
        }
    }
}

impl DefaultConfig {
    /// `address:port` to bind the listener to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl GroupConfig {
    /// `address:port` to connect to.
    pub fn target_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl AppConfig {
    /// Checks the settings a run actually depends on.
    ///
    /// `create_server` adds the listen-address requirement.
    ///
    /// # Errors
    ///
    /// The first violated rule, as a [`ConfigError`] variant.
    pub fn validate(&self, create_server: bool) -> Result<(), ConfigError> {
        if create_server && self.default.address.trim().is_empty() {
            return Err(ConfigError::MissingListenAddress);
        }
        if self.default.max_message_size < HEADER_SIZE {
            return Err(ConfigError::MessageSizeTooSmall {
                configured: self.default.max_message_size,
                minimum: HEADER_SIZE,
            });
        }
        for (name, group) in &self.groups {
            if group.address.trim().is_empty() {
                return Err(ConfigError::InvalidGroup {
                    name: name.clone(),
                    reason: "address is empty",
                });
            }
            if group.port == 0 {
                return Err(ConfigError::InvalidGroup {
                    name: name.clone(),
                    reason: "port is 0",
                });
            }
        }
        Ok(())
    }

    /// Looks up an outbound target by group name.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownGroup`] if no such section exists.
    pub fn group(&self, name: &str) -> Result<&GroupConfig, ConfigError> {
        self.groups
            .get(name)
            .ok_or_else(|| ConfigError::UnknownGroup(name.to_string()))
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// `/etc/<name>/<name>.conf`.
pub fn default_config_path(name: &str) -> PathBuf {
    PathBuf::from("/etc").join(name).join(format!("{name}.conf"))
}

/// Reads and parses the config file at `path`.
///
/// A missing file yields `AppConfig::default()` unless `explicit` is set, in
/// which case the caller asked for that file and its absence is an error.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors (including "not found"
/// when `explicit`), and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path, explicit: bool) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

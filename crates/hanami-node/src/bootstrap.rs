//! Process start-up: configuration first, then logging.
//!
//! ```text
//! initialize(name, --config, create_server)
//!  └─ load_config()       -- default path or explicit file
//!  └─ validate()          -- listen address only checked when serving
//!  └─ init_logging()      -- console + <log_path>/<name>.log
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{default_config_path, load_config, AppConfig, DefaultConfig};

/// Level used when `RUST_LOG` is not set.
pub fn default_level(cfg: &DefaultConfig) -> &'static str {
    if cfg.debug {
        "debug"
    } else {
        "info"
    }
}

/// `<log_path>/<name>.log`.
pub fn log_file_path(cfg: &DefaultConfig, name: &str) -> PathBuf {
    cfg.log_path.join(format!("{name}.log"))
}

/// Opens the log file for appending, or `None` if its directory is not
/// writable.
fn open_log_file(path: &Path) -> Option<File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Installs the global tracing subscriber.
///
/// Console output goes to stderr; stdout is reserved for command output.  A
/// second, ANSI-free layer writes to [`log_file_path`] when that file can be
/// opened.  `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(cfg: &DefaultConfig, name: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(cfg)));

    let path = log_file_path(cfg, name);
    let file_layer = open_log_file(&path).map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });
    let file_missing = file_layer.is_none();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if file_missing {
        warn!("cannot write log file {}; logging to console only", path.display());
    }
    Ok(())
}

/// Loads and validates the configuration, then initializes logging.
///
/// `config_path` is the explicit `--config` value; without it the file at
/// [`default_config_path`] is used, and its absence only warns.
///
/// # Errors
///
/// Config load or validation failures, or a logging set-up failure.
pub fn initialize(
    name: &str,
    config_path: Option<&Path>,
    create_server: bool,
) -> anyhow::Result<AppConfig> {
    let explicit = config_path.is_some();
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_config_path(name));

    let cfg = load_config(&path, explicit)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    cfg.validate(create_server)
        .with_context(|| format!("invalid config {}", path.display()))?;

    init_logging(&cfg.default, name)?;

    if !explicit && !path.exists() {
        warn!("config file {} not found; using defaults", path.display());
    } else {
        debug!("loaded config from {}", path.display());
    }
    Ok(cfg)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

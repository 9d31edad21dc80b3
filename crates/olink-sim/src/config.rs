//! Simulator Configuration
//!
//! YAML-backed settings shared by the station and terminal runtimes.
//! Resolution order: the file named in `OLINK_CONFIG`, then
//! `./olink.yaml`, then built-in defaults. A file only needs the keys
//! it wants to override.
//!
//! ```yaml
//! buffer_dir: rxbuffer_files
//! noise_variance: 0.001
//! station_poll_ms: 1000
//! terminal_poll_ms: 500
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "OLINK_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "olink.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Settings for one simulator process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Directory holding the per-endpoint inbox files.
    pub buffer_dir: PathBuf,
    /// Per-axis AWGN variance applied to every transmitted waveform.
    pub noise_variance: f64,
    /// Channel seed; omit for a fresh seed per run.
    pub noise_seed: Option<u64>,
    /// Station inbox poll interval in milliseconds.
    pub station_poll_ms: u64,
    /// Terminal inbox poll interval in milliseconds.
    pub terminal_poll_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            buffer_dir: PathBuf::from("rxbuffer_files"),
            noise_variance: 0.001,
            noise_seed: None,
            station_poll_ms: 1000,
            terminal_poll_ms: 500,
        }
    }
}

impl SimConfig {
    /// Load configuration from the standard locations, falling back to
    /// defaults when no file is present. A file that exists but does
    /// not read or parse is an error rather than a silent default.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.exists() {
            return Self::load_from(local);
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn station_poll(&self) -> Duration {
        Duration::from_millis(self.station_poll_ms)
    }

    pub fn terminal_poll(&self) -> Duration {
        Duration::from_millis(self.terminal_poll_ms)
    }
}

//! Widget configuration.
//!
//! Settings live in an optional `config.toml` at
//! `~/.config/calwidget/config.toml`. Every key has a default, so a missing
//! file or a partial one is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default header icon.
pub const DEFAULT_ICON_URL: &str =
    "https://ssl.gstatic.com/calendar/images/dynamiclogo_2020q4/calendar_17_2x.png";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration for the calendar widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Seconds between two automatic refreshes.
    pub refresh_interval_secs: u64,

    /// Delay before the first fetch once the window is shown.
    pub initial_delay_ms: u64,

    /// Maximum number of events fetched per refresh.
    pub max_results: usize,

    /// Calendar to list events from.
    pub calendar_id: String,

    /// OAuth client configuration downloaded from the Google Cloud Console.
    pub credentials_path: PathBuf,

    /// Where the access/refresh token pair is cached.
    pub token_path: PathBuf,

    /// Start with the dark palette.
    pub dark_mode: bool,

    /// Header icon location.
    pub icon_url: String,

    /// HTTP timeout for OAuth, API and icon requests.
    pub request_timeout_secs: u64,

    /// Inclusive port range for the OAuth redirect listener; `[0, 0]` lets
    /// the OS pick a free port.
    pub loopback_ports: [u16; 2],

    /// Verbose logging.
    pub debug: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 5 * 60,
            initial_delay_ms: 500,
            max_results: 100,
            calendar_id: "primary".to_string(),
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            dark_mode: false,
            icon_url: DEFAULT_ICON_URL.to_string(),
            request_timeout_secs: 30,
            loopback_ports: [0, 0],
            debug: false,
        }
    }
}

impl WidgetConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calwidget")
            .join("config.toml")
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn loopback_port_range(&self) -> (u16, u16) {
        let [start, end] = self.loopback_ports;
        (start, end)
    }
}

//! Configuration management
//!
//! A `Config` is built once at startup (defaults, optionally overlaid by a
//! TOML file) and handed to the clients that need it. Missing keys fall back
//! to their defaults, so a file only has to name what it changes:
//!
//! ```toml
//! adb_path = "/opt/platform-tools/adb"
//! wireless_port = 5555
//!
//! [timeouts]
//! install = 180
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::{DEFAULT_ADB_PATH, DEFAULT_SCRCPY_PATH, DEFAULT_WIRELESS_PORT};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or name of the device bridge binary
    pub adb_path: String,

    /// Path or name of the mirroring binary
    pub scrcpy_path: String,

    /// TCP port used for wireless pairing
    pub wireless_port: u16,

    /// Interval for device-list refresh and session liveness polling
    pub refresh_interval_secs: u64,

    /// Preset applied when mirroring without explicit options
    pub default_preset: String,

    /// Log level
    pub log_level: String,

    /// Directory for the timestamped log file; empty logs to the console only
    pub log_dir: String,

    /// Per-call timeouts
    pub timeouts: Timeouts,
}

/// Timeouts in seconds, one per class of tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Version probes
    pub probe: u64,
    /// `devices -l`
    pub list: u64,
    /// getprop / setprop / dumpsys
    pub property: u64,
    /// Package install
    pub install: u64,
    /// Remote screencap and the pull that follows it
    pub capture: u64,
    /// Remote file removal after a screenshot
    pub cleanup: u64,
    /// push / pull
    pub transfer: u64,
    /// Arbitrary shell command
    pub shell: u64,
    /// reboot
    pub reboot: u64,
    /// connect / disconnect / tcpip
    pub pairing: u64,
    /// getprop lookups during WiFi address discovery
    pub ip_property: u64,
    /// `ip addr show` / `ifconfig` during WiFi address discovery
    pub ip_command: u64,
    /// Grace period between terminate and kill when stopping a session
    pub stop_grace: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: 5,
            list: 10,
            property: 5,
            install: 120,
            capture: 10,
            cleanup: 5,
            transfer: 60,
            shell: 30,
            reboot: 10,
            pairing: 10,
            ip_property: 3,
            ip_command: 5,
            stop_grace: 5,
        }
    }
}

impl Timeouts {
    /// Convert a field value to a `Duration`
    pub fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adb_path: DEFAULT_ADB_PATH.to_string(),
            scrcpy_path: DEFAULT_SCRCPY_PATH.to_string(),
            wireless_port: DEFAULT_WIRELESS_PORT,
            refresh_interval_secs: 3,
            default_preset: "default".to_string(),
            log_level: "info".to_string(),
            log_dir: String::new(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(format!("invalid TOML: {}", e)))
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Log directory, if file logging is configured
    pub fn file_log_dir(&self) -> Option<&str> {
        Some(self.log_dir.as_str()).filter(|dir| !dir.trim().is_empty())
    }

    /// Refresh interval as a `Duration`, never shorter than one second
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

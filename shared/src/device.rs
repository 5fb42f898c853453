//! Device records and `adb devices -l` parsing

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Connection state as reported by the device bridge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceState {
    /// Connected and authorized (`device`)
    Online,
    Offline,
    Unauthorized,
    /// Waiting for the user to accept the RSA prompt
    Authorizing,
    /// Missing udev / USB permissions
    NoPermission,
    Recovery,
    Sideload,
    Bootloader,
    Host,
    /// Any state token this crate does not know about
    Other(String),
}

impl DeviceState {
    /// The tool's own token for this state
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "device",
            Self::Offline => "offline",
            Self::Unauthorized => "unauthorized",
            Self::Authorizing => "authorizing",
            Self::NoPermission => "no permissions",
            Self::Recovery => "recovery",
            Self::Sideload => "sideload",
            Self::Bootloader => "bootloader",
            Self::Host => "host",
            Self::Other(s) => s,
        }
    }

    /// Parse a state token
    pub fn from_token(token: &str) -> Self {
        match token {
            "device" => Self::Online,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            "authorizing" => Self::Authorizing,
            "no" | "no permissions" => Self::NoPermission,
            "recovery" => Self::Recovery,
            "sideload" => Self::Sideload,
            "bootloader" => Self::Bootloader,
            "host" => Self::Host,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::from_token(&token))
    }
}

/// A connected device, as seen by one enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Transport-qualified identifier (USB serial or `host:port`)
    pub id: String,

    /// Connection state
    pub state: DeviceState,

    /// `ro.product.model`; empty unless online
    pub model: String,

    /// `ro.product.manufacturer`; empty unless online
    pub manufacturer: String,

    /// `ro.build.version.release`; empty unless online
    pub android_version: String,

    /// Battery level such as `"87%"`; empty unless online
    pub battery_level: String,

    /// `key:value` tokens printed after the state (product, model, transport_id...)
    pub attributes: BTreeMap<String, String>,
}

impl Device {
    pub fn new(id: impl Into<String>, state: DeviceState) -> Self {
        Self {
            id: id.into(),
            state,
            model: String::new(),
            manufacturer: String::new(),
            android_version: String::new(),
            battery_level: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Connected over TCP (`host:port`) rather than USB
    pub fn is_wireless(&self) -> bool {
        match self.id.rsplit_once(':') {
            Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
            None => false,
        }
    }

    /// Best label for display: the queried model, else the `-l` model attribute, else the id
    pub fn display_name(&self) -> &str {
        if !self.model.is_empty() {
            &self.model
        } else if let Some(model) = self.attributes.get("model") {
            model
        } else {
            &self.id
        }
    }
}

/// Parse the output of `adb devices -l`.
///
/// The first line is the `List of devices attached` header and is skipped.
/// Each remaining non-blank line yields one record; lines with fewer than
/// two tokens are ignored. Descriptive fields are left empty.
pub fn parse_device_list(stdout: &str) -> Vec<Device> {
    stdout
        .trim()
        .lines()
        .skip(1)
        .filter_map(parse_device_line)
        .collect()
}

fn parse_device_line(line: &str) -> Option<Device> {
    let mut tokens = line.split_whitespace();
    let id = tokens.next()?;
    let mut state_token = tokens.next()?.to_string();

    let mut rest: Vec<&str> = tokens.collect();
    // "no permissions (...)" is the one state that spans two tokens
    if state_token == "no" && rest.first() == Some(&"permissions") {
        state_token.push_str(" permissions");
        rest.remove(0);
    }

    let mut device = Device::new(id, DeviceState::from_token(&state_token));
    for token in rest {
        if let Some((key, value)) = token.split_once(':') {
            if !key.is_empty() {
                device.attributes.insert(key.to_string(), value.to_string());
            }
        }
    }
    Some(device)
}

/// Extract the battery level from `dumpsys battery` output as `"NN%"`
pub fn parse_battery_level(dump: &str) -> Option<String> {
    let re = Regex::new(r"level: (\d+)").ok()?;
    re.captures(dump).map(|caps| format!("{}%", &caps[1]))
}

/// Extract the version number from `adb version` output
pub fn parse_adb_version(stdout: &str) -> Option<String> {
    let re = Regex::new(r"version ([\d.]+)").ok()?;
    re.captures(stdout).map(|caps| caps[1].to_string())
}

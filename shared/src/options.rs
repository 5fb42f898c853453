//! Mirroring options and presets
//!
//! [`MirrorOptions`] is a flat bag of independent settings. Each set field
//! becomes exactly one flag (or flag group) on the scrcpy command line,
//! always in the order the fields are declared; unset fields emit nothing.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Capture orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "0")]
    Natural,
    #[serde(rename = "90")]
    Deg90,
    #[serde(rename = "180")]
    Deg180,
    #[serde(rename = "270")]
    Deg270,
}

impl Orientation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Natural => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Natural),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }
}

/// Video codec requested from the device encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    H265,
    Av1,
}

impl VideoCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "h265",
            Self::Av1 => "av1",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoCodec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "h264" => Ok(Self::H264),
            "h265" | "hevc" => Ok(Self::H265),
            "av1" => Ok(Self::Av1),
            other => Err(Error::Other(format!("unknown video codec: {}", other))),
        }
    }
}

/// scrcpy settings for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    /// Cap on the larger video dimension
    pub max_size: Option<u32>,

    /// Video bit rate, e.g. `"8M"`
    pub bit_rate: Option<String>,

    pub max_fps: Option<u32>,

    /// Lock capture to an orientation
    pub capture_orientation: Option<Orientation>,

    pub fullscreen: bool,
    pub always_on_top: bool,
    pub borderless: bool,

    pub turn_screen_off: bool,
    pub stay_awake: bool,
    pub show_touches: bool,
    pub disable_screensaver: bool,

    /// Record the session to this file
    pub record_file: Option<PathBuf>,

    /// Record without opening a window
    pub no_display: bool,

    pub no_audio: bool,

    pub video_codec: Option<VideoCodec>,

    pub window_title: Option<String>,

    /// Window origin (x, y)
    pub window_position: Option<(i32, i32)>,

    /// Window size (width, height)
    pub window_size: Option<(u32, u32)>,
}

impl MirrorOptions {
    /// Translate to scrcpy arguments
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(max_size) = self.max_size {
            args.extend(["-m".to_string(), max_size.to_string()]);
        }
        if let Some(bit_rate) = &self.bit_rate {
            args.extend(["-b".to_string(), bit_rate.clone()]);
        }
        if let Some(max_fps) = self.max_fps {
            args.extend(["--max-fps".to_string(), max_fps.to_string()]);
        }
        if let Some(orientation) = self.capture_orientation {
            args.push(format!("--capture-orientation={}", orientation.degrees()));
        }

        let switches = [
            (self.fullscreen, "-f"),
            (self.always_on_top, "--always-on-top"),
            (self.borderless, "--window-borderless"),
            (self.turn_screen_off, "--turn-screen-off"),
            (self.stay_awake, "--stay-awake"),
            (self.show_touches, "--show-touches"),
            (self.disable_screensaver, "--disable-screensaver"),
        ];
        args.extend(
            switches
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag.to_string()),
        );

        if let Some(path) = &self.record_file {
            args.extend(["-r".to_string(), path.to_string_lossy().into_owned()]);
        }
        if self.no_display {
            args.push("-N".to_string());
        }
        if self.no_audio {
            args.push("--no-audio".to_string());
        }
        if let Some(codec) = self.video_codec {
            args.extend(["--video-codec".to_string(), codec.as_str().to_string()]);
        }
        if let Some(title) = &self.window_title {
            args.extend(["--window-title".to_string(), title.clone()]);
        }
        if let Some((x, y)) = self.window_position {
            args.extend([
                "--window-x".to_string(),
                x.to_string(),
                "--window-y".to_string(),
                y.to_string(),
            ]);
        }
        if let Some((width, height)) = self.window_size {
            args.extend([
                "--window-width".to_string(),
                width.to_string(),
                "--window-height".to_string(),
                height.to_string(),
            ]);
        }

        args
    }
}

/// Named option bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    Quality,
    Performance,
    LowLatency,
    Record,
    #[default]
    Default,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Quality,
        Preset::Performance,
        Preset::LowLatency,
        Preset::Record,
        Preset::Default,
    ];

    /// Look a preset up by name. Unknown names map to [`Preset::Default`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "quality" => Self::Quality,
            "performance" => Self::Performance,
            "low-latency" | "low_latency" | "lowlatency" => Self::LowLatency,
            "record" => Self::Record,
            _ => Self::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Performance => "performance",
            Self::LowLatency => "low-latency",
            Self::Record => "record",
            Self::Default => "default",
        }
    }

    /// The option set this preset stands for
    pub fn options(&self) -> MirrorOptions {
        match self {
            Self::Quality => MirrorOptions {
                bit_rate: Some("16M".to_string()),
                max_fps: Some(60),
                video_codec: Some(VideoCodec::H265),
                stay_awake: true,
                disable_screensaver: true,
                ..Default::default()
            },
            Self::Performance => MirrorOptions {
                max_size: Some(720),
                bit_rate: Some("4M".to_string()),
                max_fps: Some(30),
                video_codec: Some(VideoCodec::H264),
                stay_awake: true,
                ..Default::default()
            },
            Self::LowLatency => MirrorOptions {
                max_size: Some(1024),
                bit_rate: Some("8M".to_string()),
                max_fps: Some(60),
                video_codec: Some(VideoCodec::H264),
                no_audio: true,
                disable_screensaver: true,
                ..Default::default()
            },
            Self::Record => MirrorOptions {
                bit_rate: Some("16M".to_string()),
                max_fps: Some(60),
                video_codec: Some(VideoCodec::H265),
                stay_awake: true,
                ..Default::default()
            },
            Self::Default => MirrorOptions {
                bit_rate: Some("8M".to_string()),
                stay_awake: true,
                video_codec: Some(VideoCodec::H264),
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for a preset name; total over all inputs
pub fn preset_options(name: &str) -> MirrorOptions {
    Preset::from_name(name).options()
}

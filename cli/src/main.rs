//! DroidDeck
//!
//! Command-line front-end for managing Android devices through adb and
//! mirroring them with scrcpy.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use droiddeck_shared::options::{Orientation, VideoCodec};
use droiddeck_shared::{logging, Config, MirrorOptions, Preset, RebootMode};
use tracing::{debug, info};

/// DroidDeck
///
/// Lists and manages Android devices over adb and mirrors their screens with scrcpy.
#[derive(Parser, Debug)]
#[command(name = "droiddeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// adb binary to use
    #[arg(long, global = true)]
    adb: Option<String>,

    /// scrcpy binary to use
    #[arg(long, global = true)]
    scrcpy: Option<String>,

    /// Print machine-readable JSON where supported
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether adb and scrcpy are installed, with versions
    Check,

    /// List connected devices
    Devices,

    /// Refresh the device list periodically until interrupted
    Watch {
        /// Seconds between refreshes (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show detailed properties of a device
    Info { serial: String },

    /// Read or write a system property
    #[command(subcommand)]
    Prop(PropCommand),

    /// Install (or reinstall) an APK
    Install { serial: String, apk: PathBuf },

    /// Capture the device screen to a local PNG
    Screenshot {
        serial: String,
        #[arg(default_value = "screenshot.png")]
        output: PathBuf,
    },

    /// Copy a local file to the device
    Push {
        serial: String,
        local: PathBuf,
        remote: String,
    },

    /// Copy a device file to the local machine
    Pull {
        serial: String,
        remote: String,
        local: PathBuf,
    },

    /// Run a shell command on the device
    Shell {
        serial: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Reboot the device
    Reboot {
        serial: String,
        /// system, recovery, bootloader or sideload
        #[arg(long, default_value = "system")]
        mode: RebootMode,
    },

    /// Connect to a device over WiFi
    Connect {
        host: String,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Disconnect a wireless device
    Disconnect { device: String },

    /// Switch a USB-connected device to listen for wireless connections
    Tcpip {
        serial: String,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Find the WiFi address of a device
    Ip { serial: String },

    /// List mirroring presets and the flags they produce
    Presets,

    /// Mirror a device until scrcpy exits or Ctrl-C is pressed
    Mirror(MirrorArgs),
}

#[derive(Subcommand, Debug)]
pub enum PropCommand {
    Get { serial: String, name: String },
    Set {
        serial: String,
        name: String,
        value: String,
    },
}

/// Mirroring target plus option overrides applied on top of a preset
#[derive(Args, Debug, Default)]
pub struct MirrorArgs {
    /// Device serial (default: the only attached device)
    #[arg(short, long, conflicts_with = "wireless")]
    serial: Option<String>,

    /// Pair with this host over WiFi and mirror it
    #[arg(short, long)]
    wireless: Option<String>,

    /// Port for --wireless
    #[arg(long)]
    port: Option<u16>,

    /// quality, performance, low-latency, record or default
    #[arg(short, long)]
    preset: Option<String>,

    #[arg(short = 'm', long)]
    max_size: Option<u32>,

    /// e.g. 8M
    #[arg(short = 'b', long)]
    bit_rate: Option<String>,

    #[arg(long)]
    max_fps: Option<u32>,

    /// 0, 90, 180 or 270
    #[arg(long, value_parser = parse_orientation)]
    orientation: Option<Orientation>,

    #[arg(short, long)]
    fullscreen: bool,

    #[arg(long)]
    always_on_top: bool,

    #[arg(long)]
    borderless: bool,

    #[arg(long)]
    turn_screen_off: bool,

    #[arg(long)]
    stay_awake: bool,

    #[arg(long)]
    show_touches: bool,

    #[arg(long)]
    disable_screensaver: bool,

    /// Record to this file
    #[arg(short, long)]
    record: Option<PathBuf>,

    /// Record without a window
    #[arg(long)]
    no_display: bool,

    #[arg(long)]
    no_audio: bool,

    /// h264, h265 or av1
    #[arg(long)]
    codec: Option<VideoCodec>,

    #[arg(long)]
    window_title: Option<String>,

    /// X,Y
    #[arg(long, value_parser = parse_pair::<i32>)]
    window_position: Option<(i32, i32)>,

    /// WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    window_size: Option<(u32, u32)>,
}

impl MirrorArgs {
    /// Start from the named preset (or `default_preset`) and overlay every
    /// option given on the command line.
    pub fn to_options(&self, default_preset: &str) -> MirrorOptions {
        let preset = Preset::from_name(self.preset.as_deref().unwrap_or(default_preset));
        let mut options = preset.options();

        if self.max_size.is_some() {
            options.max_size = self.max_size;
        }
        if self.bit_rate.is_some() {
            options.bit_rate = self.bit_rate.clone();
        }
        if self.max_fps.is_some() {
            options.max_fps = self.max_fps;
        }
        if self.orientation.is_some() {
            options.capture_orientation = self.orientation;
        }
        options.fullscreen |= self.fullscreen;
        options.always_on_top |= self.always_on_top;
        options.borderless |= self.borderless;
        options.turn_screen_off |= self.turn_screen_off;
        options.stay_awake |= self.stay_awake;
        options.show_touches |= self.show_touches;
        options.disable_screensaver |= self.disable_screensaver;
        if self.record.is_some() {
            options.record_file = self.record.clone();
        }
        options.no_display |= self.no_display;
        options.no_audio |= self.no_audio;
        if self.codec.is_some() {
            options.video_codec = self.codec;
        }
        if self.window_title.is_some() {
            options.window_title = self.window_title.clone();
        }
        if self.window_position.is_some() {
            options.window_position = self.window_position;
        }
        if self.window_size.is_some() {
            options.window_size = self.window_size;
        }

        options
    }
}

fn parse_orientation(s: &str) -> Result<Orientation, String> {
    s.parse::<u16>()
        .ok()
        .and_then(Orientation::from_degrees)
        .ok_or_else(|| format!("expected 0, 90, 180 or 270, got {}", s))
}

fn parse_pair<T: std::str::FromStr>(s: &str) -> Result<(T, T), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {}", s))?;
    match (a.trim().parse(), b.trim().parse()) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        _ => Err(format!("expected X,Y, got {}", s)),
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    parse_pair::<u32>(&s.replacen(['x', 'X'], ",", 1))
        .map_err(|_| format!("expected WIDTHxHEIGHT, got {}", s))
}

/// Defaults, then the config file, then command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    if let Some(adb) = &cli.adb {
        config.adb_path = adb.clone();
    }
    if let Some(scrcpy) = &cli.scrcpy {
        config.scrcpy_path = scrcpy.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match config.file_log_dir() {
        Some(dir) => logging::init_logging(dir, "droiddeck", &config.log_level)?,
        None => logging::init_console_logging(&config.log_level),
    }

    info!("DroidDeck v{}", env!("CARGO_PKG_VERSION"));
    debug!("config: {:?}", config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(commands::run(cli.command, &config, cli.json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mirror_overrides_preset() {
        let cli = Cli::parse_from([
            "droiddeck", "mirror", "--preset", "performance", "--max-fps", "60",
            "--orientation", "90", "--window-size", "800x600", "--no-audio",
        ]);
        let Command::Mirror(args) = cli.command else {
            panic!("expected mirror");
        };
        let options = args.to_options("default");
        assert_eq!(options.max_size, Some(720));
        assert_eq!(options.max_fps, Some(60));
        assert_eq!(options.capture_orientation, Some(Orientation::Deg90));
        assert_eq!(options.window_size, Some((800, 600)));
        assert!(options.no_audio);
        assert!(options.stay_awake);
    }

    #[test]
    fn test_mirror_uses_configured_default_preset() {
        let options = MirrorArgs::default().to_options("quality");
        assert_eq!(options, Preset::Quality.options());
    }

    #[test]
    fn test_bad_orientation_rejected() {
        let result = Cli::try_parse_from(["droiddeck", "mirror", "--orientation", "45"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_shell_keeps_hyphenated_args() {
        let cli = Cli::parse_from(["droiddeck", "shell", "ABC", "ls", "-la", "/sdcard"]);
        let Command::Shell { serial, command } = cli.command else {
            panic!("expected shell");
        };
        assert_eq!(serial, "ABC");
        assert_eq!(command, vec!["ls", "-la", "/sdcard"]);
    }

    #[test]
    fn test_log_dir_layering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_dir = \"/var/log/droiddeck\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from(["droiddeck", "--config", path.as_str(), "devices"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.file_log_dir(), Some("/var/log/droiddeck"));

        let cli = Cli::parse_from(["droiddeck", "--config", path.as_str(), "--log-dir", "/tmp/dd", "devices"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.file_log_dir(), Some("/tmp/dd"));

        let cli = Cli::parse_from(["droiddeck", "devices"]);
        assert_eq!(load_config(&cli).unwrap().file_log_dir(), None);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from(["droiddeck", "devices", "--adb", "/opt/adb", "--log-level", "debug"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.adb_path, "/opt/adb");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scrcpy_path, "scrcpy");
    }

    #[test]
    fn test_pair_parsers() {
        assert_eq!(parse_pair::<i32>("10,-20"), Ok((10, -20)));
        assert_eq!(parse_size("1280x720"), Ok((1280, 720)));
        assert!(parse_size("1280").is_err());
    }
}

//! DroidDeck Shared Library
//!
//! This crate provides the core behind the DroidDeck front-ends:
//! - Device bridge client (`adb`): enumeration, properties, transfers, pairing
//! - Mirroring session control (`scrcpy`) and option presets
//! - Configuration, errors and logging utilities

pub mod adb;
pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod netaddr;
pub mod options;
pub mod outcome;
pub mod runner;
pub mod session;

pub use adb::{AdbClient, RebootMode};
pub use config::Config;
pub use device::{Device, DeviceState};
pub use error::{Error, Result};
pub use options::{MirrorOptions, Preset};
pub use outcome::Outcome;
pub use session::SessionController;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default device bridge binary (resolved through PATH)
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Default mirroring binary (resolved through PATH)
pub const DEFAULT_SCRCPY_PATH: &str = "scrcpy";

/// Default TCP port for wireless pairing
pub const DEFAULT_WIRELESS_PORT: u16 = 5555;

//! Device bridge client
//!
//! Thin wrapper over the `adb` command line. Each operation is one (or, for
//! screenshots and address discovery, a short fixed sequence of) tool
//! invocations with its own timeout. A missing binary or an expired timeout
//! never propagates: queries collapse to an empty/false sentinel and actions
//! report a failed [`Outcome`] with a short message. When the tool itself
//! reports failure, its own output is passed back unmodified.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Config, Timeouts};
use crate::device::{parse_adb_version, parse_battery_level, parse_device_list, Device};
use crate::error::{Error, Result};
use crate::netaddr::{self, WIFI_ADDRESS_PROPERTIES};
use crate::outcome::Outcome;
use crate::runner::{args, CommandOutput, CommandRunner, ProcessRunner};

/// Remote path used as scratch space by [`AdbClient::take_screenshot`]
pub const REMOTE_SCREENSHOT_PATH: &str = "/sdcard/screenshot.png";

/// Token `adb install` prints on success
const INSTALL_SUCCESS_TOKEN: &str = "Success";

/// Labelled properties reported by [`AdbClient::device_info`], in display order
const INFO_PROPERTIES: [(&str, &str); 6] = [
    ("Model", "ro.product.model"),
    ("Manufacturer", "ro.product.manufacturer"),
    ("Android", "ro.build.version.release"),
    ("SDK", "ro.build.version.sdk"),
    ("CPU", "ro.product.cpu.abi"),
    ("Serial", "ro.serialno"),
];

/// Target of a reboot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebootMode {
    #[default]
    System,
    Recovery,
    Bootloader,
    Sideload,
}

impl RebootMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Recovery => "recovery",
            Self::Bootloader => "bootloader",
            Self::Sideload => "sideload",
        }
    }
}

impl fmt::Display for RebootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebootMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "system" => Ok(Self::System),
            "recovery" => Ok(Self::Recovery),
            "bootloader" => Ok(Self::Bootloader),
            "sideload" => Ok(Self::Sideload),
            other => Err(Error::Other(format!("unknown reboot mode: {}", other))),
        }
    }
}

/// Whether `adb connect` output reports an established connection.
///
/// Matches both `connected to host:port` and `already connected to host:port`.
pub fn connect_succeeded(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.contains("connected")
        && !lower.contains("failed")
        && !lower.contains("cannot")
        && !lower.contains("unable")
}

/// Client for the device bridge CLI
pub struct AdbClient<R: CommandRunner = ProcessRunner> {
    program: String,
    timeouts: Timeouts,
    runner: Arc<R>,
}

impl<R: CommandRunner> Clone for AdbClient<R> {
    fn clone(&self) -> Self {
        Self {
            program: self.program.clone(),
            timeouts: self.timeouts,
            runner: Arc::clone(&self.runner),
        }
    }
}

impl AdbClient<ProcessRunner> {
    /// Client that spawns the real tool named in `config`
    pub fn new(config: &Config) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }
}

impl<R: CommandRunner> AdbClient<R> {
    pub fn with_runner(config: &Config, runner: Arc<R>) -> Self {
        Self {
            program: config.adb_path.clone(),
            timeouts: config.timeouts,
            runner,
        }
    }

    async fn exec(&self, argv: Vec<String>, timeout_secs: u64) -> Result<CommandOutput> {
        self.runner
            .run(&self.program, &argv, Timeouts::secs(timeout_secs))
            .await
    }

    async fn exec_on(
        &self,
        serial: &str,
        rest: &[&str],
        timeout_secs: u64,
    ) -> Result<CommandOutput> {
        let mut argv = args(["-s", serial]);
        argv.extend(rest.iter().map(|s| s.to_string()));
        self.exec(argv, timeout_secs).await
    }

    /// Run the version probe; absence and timeout both mean unavailable
    pub async fn is_available(&self) -> bool {
        match self.exec(args(["version"]), self.timeouts.probe).await {
            Ok(output) => output.success,
            Err(e) => {
                debug!("adb probe failed: {}", e);
                false
            }
        }
    }

    /// Version number from `adb version`, e.g. `1.0.41`
    pub async fn version(&self) -> Option<String> {
        let output = self.exec(args(["version"]), self.timeouts.probe).await.ok()?;
        if !output.success {
            return None;
        }
        parse_adb_version(&output.stdout)
    }

    /// Enumerate devices. Online devices get their descriptive fields and
    /// battery level filled in. Any failure yields an empty list.
    pub async fn list_devices(&self) -> Vec<Device> {
        let output = match self.exec(args(["devices", "-l"]), self.timeouts.list).await {
            Ok(output) if output.success => output,
            Ok(output) => {
                warn!("adb devices failed: {}", output.error_text());
                return Vec::new();
            }
            Err(e) => {
                warn!("adb devices failed: {}", e);
                return Vec::new();
            }
        };

        let mut devices = parse_device_list(&output.stdout);
        for device in devices.iter_mut().filter(|d| d.state.is_online()) {
            self.populate_device(device).await;
        }
        debug!("enumerated {} device(s)", devices.len());
        devices
    }

    async fn populate_device(&self, device: &mut Device) {
        device.model = self.get_property(&device.id, "ro.product.model").await;
        device.manufacturer = self
            .get_property(&device.id, "ro.product.manufacturer")
            .await;
        device.android_version = self
            .get_property(&device.id, "ro.build.version.release")
            .await;
        device.battery_level = self.battery_level(&device.id).await;
    }

    /// Read one system property; empty string on any failure
    pub async fn get_property(&self, serial: &str, name: &str) -> String {
        match self
            .exec_on(serial, &["shell", "getprop", name], self.timeouts.property)
            .await
        {
            Ok(output) if output.success => output.stdout.trim().to_string(),
            Ok(_) => String::new(),
            Err(e) => {
                debug!("getprop {} on {} failed: {}", name, serial, e);
                String::new()
            }
        }
    }

    /// Write one system property
    pub async fn set_property(&self, serial: &str, name: &str, value: &str) -> Outcome {
        match self
            .exec_on(serial, &["shell", "setprop", name, value], self.timeouts.property)
            .await
        {
            Ok(output) if output.success => Outcome::ok(format!("{} set to {}", name, value)),
            Ok(output) => Outcome::fail(output.combined()),
            Err(e) => e.into(),
        }
    }

    /// Battery level parsed from `dumpsys battery`, such as `"87%"`; empty on failure
    pub async fn battery_level(&self, serial: &str) -> String {
        match self
            .exec_on(serial, &["shell", "dumpsys", "battery"], self.timeouts.property)
            .await
        {
            Ok(output) if output.success => parse_battery_level(&output.stdout).unwrap_or_default(),
            Ok(_) => String::new(),
            Err(e) => {
                debug!("dumpsys battery on {} failed: {}", serial, e);
                String::new()
            }
        }
    }

    /// Labelled device details in display order, battery last
    pub async fn device_info(&self, serial: &str) -> Vec<(&'static str, String)> {
        let mut info = Vec::with_capacity(INFO_PROPERTIES.len() + 1);
        for (label, property) in INFO_PROPERTIES {
            info.push((label, self.get_property(serial, property).await));
        }
        info.push(("Battery", self.battery_level(serial).await));
        info
    }

    /// `install -r`. Success requires both a zero exit and the `Success`
    /// token; otherwise the tool's stdout+stderr is returned verbatim.
    pub async fn install_package(&self, serial: &str, package_path: &str) -> Outcome {
        info!("installing {} on {}", package_path, serial);
        match self
            .exec_on(serial, &["install", "-r", package_path], self.timeouts.install)
            .await
        {
            Ok(output) if output.success && output.stdout.contains(INSTALL_SUCCESS_TOKEN) => {
                Outcome::ok("package installed")
            }
            Ok(output) => {
                warn!("install on {} failed", serial);
                Outcome::fail(output.combined())
            }
            Err(e) => e.into(),
        }
    }

    /// Capture on the device, pull to `output_path`, then delete the remote
    /// file. A failing step skips the rest; cleanup only runs after a
    /// successful pull and its own result is ignored.
    pub async fn take_screenshot(&self, serial: &str, output_path: &str) -> Outcome {
        match self
            .exec_on(
                serial,
                &["shell", "screencap", "-p", REMOTE_SCREENSHOT_PATH],
                self.timeouts.capture,
            )
            .await
        {
            Ok(output) if output.success => {}
            Ok(_) => return Outcome::fail("failed to capture screenshot"),
            Err(e) => return e.into(),
        }

        match self
            .exec_on(
                serial,
                &["pull", REMOTE_SCREENSHOT_PATH, output_path],
                self.timeouts.capture,
            )
            .await
        {
            Ok(output) if output.success => {}
            Ok(_) => return Outcome::fail("failed to transfer screenshot"),
            Err(e) => return e.into(),
        }

        if let Err(e) = self
            .exec_on(
                serial,
                &["shell", "rm", REMOTE_SCREENSHOT_PATH],
                self.timeouts.cleanup,
            )
            .await
        {
            debug!("screenshot cleanup on {} failed: {}", serial, e);
        }

        Outcome::ok(format!("screenshot saved to {}", output_path))
    }

    /// Copy a local file to the device
    pub async fn push_file(&self, serial: &str, local_path: &str, remote_path: &str) -> Outcome {
        self.transfer(serial, "push", local_path, remote_path, remote_path)
            .await
    }

    /// Copy a device file to the local machine
    pub async fn pull_file(&self, serial: &str, remote_path: &str, local_path: &str) -> Outcome {
        self.transfer(serial, "pull", remote_path, local_path, local_path)
            .await
    }

    async fn transfer(
        &self,
        serial: &str,
        verb: &str,
        from: &str,
        to: &str,
        destination: &str,
    ) -> Outcome {
        match self
            .exec_on(serial, &[verb, from, to], self.timeouts.transfer)
            .await
        {
            Ok(output) if output.success => {
                Outcome::ok(format!("file transferred to {}", destination))
            }
            Ok(output) => Outcome::fail(output.combined()),
            Err(e) => e.into(),
        }
    }

    /// Run a shell command; the outcome carries stdout+stderr either way
    pub async fn shell(&self, serial: &str, command: &str) -> Outcome {
        match self
            .exec_on(serial, &["shell", command], self.timeouts.shell)
            .await
        {
            Ok(output) => Outcome {
                success: output.success,
                message: output.combined(),
            },
            Err(e) => e.into(),
        }
    }

    /// Reboot, optionally into a named mode
    pub async fn reboot(&self, serial: &str, mode: RebootMode) -> Outcome {
        let mut argv = vec!["reboot"];
        if mode != RebootMode::System {
            argv.push(mode.as_str());
        }
        match self.exec_on(serial, &argv, self.timeouts.reboot).await {
            Ok(output) if output.success => {
                info!("rebooting {} into {}", serial, mode);
                Outcome::ok(format!("device rebooting into {} mode", mode))
            }
            Ok(_) => Outcome::fail("failed to reboot device"),
            Err(e) => e.into(),
        }
    }

    /// `connect host:port`. The tool exits zero even on a refused
    /// connection, so the output text decides.
    pub async fn connect(&self, host: &str, port: u16) -> Outcome {
        let target = format!("{}:{}", host, port);
        info!("connecting to {}", target);
        match self
            .exec(args(["connect", target.as_str()]), self.timeouts.pairing)
            .await
        {
            Ok(output) if output.success && connect_succeeded(&output.stdout) => {
                Outcome::ok(output.stdout.trim())
            }
            Ok(output) => {
                warn!("connect to {} failed: {}", target, output.error_text());
                Outcome::fail(output.combined())
            }
            Err(e) => e.into(),
        }
    }

    /// `disconnect id`
    pub async fn disconnect(&self, device_id: &str) -> Outcome {
        match self
            .exec(args(["disconnect", device_id]), self.timeouts.pairing)
            .await
        {
            Ok(output) if output.success => Outcome::ok(format!("{} disconnected", device_id)),
            Ok(output) => Outcome::fail(format!(
                "failed to disconnect: {}",
                output.error_text()
            )),
            Err(e) => e.into(),
        }
    }

    /// Switch a USB-connected device to listen for TCP connections on `port`
    pub async fn enable_tcpip(&self, device_id: &str, port: u16) -> Outcome {
        let port_arg = port.to_string();
        match self
            .exec_on(device_id, &["tcpip", port_arg.as_str()], self.timeouts.pairing)
            .await
        {
            Ok(output) if output.success => {
                info!("{} listening for TCP on port {}", device_id, port);
                Outcome::ok(format!("wireless mode enabled on port {}", port))
            }
            Ok(output) => Outcome::fail(format!(
                "failed to enable wireless mode: {}",
                output.error_text()
            )),
            Err(e) => e.into(),
        }
    }

    /// Best-effort lookup of the device's WiFi address.
    ///
    /// Tries, in this order and without retry: the `dhcp.*.ipaddress`
    /// properties, `ip addr show`, then `ifconfig wlan0`. Returns an empty
    /// string when all three come up empty, or as soon as any call cannot
    /// run at all (missing binary, timeout).
    pub async fn discover_wifi_address(&self, device_id: &str) -> String {
        match self.find_wifi_address(device_id).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!("no WiFi address found for {}", device_id);
                String::new()
            }
            Err(e) => {
                debug!("WiFi address lookup on {} aborted: {}", device_id, e);
                String::new()
            }
        }
    }

    async fn find_wifi_address(&self, device_id: &str) -> Result<Option<String>> {
        for property in WIFI_ADDRESS_PROPERTIES {
            let value = self
                .probe(device_id, &["shell", "getprop", property], self.timeouts.ip_property)
                .await?
                .map(|stdout| stdout.trim().to_string())
                .unwrap_or_default();
            if value.is_empty() {
                continue;
            }
            debug!("{} = {}", property, value);
            if netaddr::is_acceptable_address(&value) {
                return Ok(Some(value));
            }
        }

        let ip_addr = self
            .probe(device_id, &["shell", "ip", "addr", "show"], self.timeouts.ip_command)
            .await?;
        if let Some(address) = ip_addr.as_deref().and_then(netaddr::parse_ip_addr_show) {
            debug!("address from ip addr: {}", address);
            return Ok(Some(address));
        }

        let ifconfig = self
            .probe(device_id, &["shell", "ifconfig", "wlan0"], self.timeouts.ip_command)
            .await?;
        if let Some(address) = ifconfig.as_deref().and_then(netaddr::parse_ifconfig) {
            debug!("address from ifconfig: {}", address);
            return Ok(Some(address));
        }

        Ok(None)
    }

    /// Stdout of a successful call, `None` on a non-zero exit
    async fn probe(
        &self,
        serial: &str,
        rest: &[&str],
        timeout_secs: u64,
    ) -> Result<Option<String>> {
        let output = self.exec_on(serial, rest, timeout_secs).await?;
        Ok(output.success.then_some(output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceState;
    use crate::runner::testing::{Reply, ScriptedRunner};

    fn client(runner: ScriptedRunner) -> (AdbClient<ScriptedRunner>, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        (
            AdbClient::with_runner(&Config::default(), Arc::clone(&runner)),
            runner,
        )
    }

    #[tokio::test]
    async fn test_availability() {
        let (adb, _) = client(ScriptedRunner::new().on("version", Reply::ok("Android Debug Bridge version 1.0.41\n")));
        assert!(adb.is_available().await);

        let (adb, _) = client(ScriptedRunner::new().on("version", Reply::NotFound));
        assert!(!adb.is_available().await);

        let (adb, _) = client(ScriptedRunner::new().on("version", Reply::Timeout));
        assert!(!adb.is_available().await);
    }

    #[tokio::test]
    async fn test_version() {
        let (adb, _) = client(ScriptedRunner::new().on("version", Reply::ok("Android Debug Bridge version 1.0.41\n")));
        assert_eq!(adb.version().await.as_deref(), Some("1.0.41"));
    }

    #[tokio::test]
    async fn test_list_devices_populates_online_only() {
        let runner = ScriptedRunner::new()
            .on(
                "devices -l",
                Reply::ok("List of devices attached\nABC123\tdevice\nDEF456\tunauthorized\n"),
            )
            .on("getprop ro.product.model", Reply::ok("Pixel 7\n"))
            .on("getprop ro.product.manufacturer", Reply::ok("Google\n"))
            .on("getprop ro.build.version.release", Reply::ok("14\n"))
            .on("dumpsys battery", Reply::ok("  level: 64\n"));
        let (adb, runner) = client(runner);

        let devices = adb.list_devices().await;
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "ABC123");
        assert_eq!(devices[0].model, "Pixel 7");
        assert_eq!(devices[0].manufacturer, "Google");
        assert_eq!(devices[0].android_version, "14");
        assert_eq!(devices[0].battery_level, "64%");
        assert_eq!(devices[1].state, DeviceState::Unauthorized);
        assert!(devices[1].model.is_empty());

        // one enumeration + four lookups, all aimed at the online device
        let calls = runner.calls();
        assert_eq!(calls.len(), 5);
        assert!(calls[1..].iter().all(|c| c.starts_with("-s ABC123 ")));
    }

    #[tokio::test]
    async fn test_list_devices_failure_is_empty() {
        let (adb, _) = client(ScriptedRunner::new().on("devices", Reply::NotFound));
        assert!(adb.list_devices().await.is_empty());

        let (adb, _) = client(ScriptedRunner::new().on("devices", Reply::Timeout));
        assert!(adb.list_devices().await.is_empty());

        let (adb, _) = client(ScriptedRunner::new().on("devices", Reply::failed("", "daemon not running")));
        assert!(adb.list_devices().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_property_empty_on_failure() {
        let (adb, _) = client(ScriptedRunner::new().on("getprop", Reply::Timeout));
        assert_eq!(adb.get_property("ABC", "ro.product.model").await, "");
    }

    #[tokio::test]
    async fn test_device_info_order() {
        let runner = ScriptedRunner::new()
            .on("ro.product.model", Reply::ok("Pixel 7\n"))
            .on("ro.product.manufacturer", Reply::ok("Google\n"))
            .on("ro.build.version.release", Reply::ok("14\n"))
            .on("ro.build.version.sdk", Reply::ok("34\n"))
            .on("dumpsys battery", Reply::ok("Current Battery Service state:\n  level: 76\n"));
        let (adb, runner) = client(runner);

        let info = adb.device_info("ABC").await;
        let labels: Vec<&str> = info.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Model", "Manufacturer", "Android", "SDK", "CPU", "Serial", "Battery"]
        );
        assert_eq!(info[0].1, "Pixel 7");
        assert_eq!(info[4].1, "");
        assert_eq!(info[6].1, "76%");
        assert_eq!(runner.calls().last().map(String::as_str), Some("-s ABC shell dumpsys battery"));
    }

    #[tokio::test]
    async fn test_set_property() {
        let (adb, runner) = client(ScriptedRunner::new().on("setprop", Reply::ok("")));
        let outcome = adb.set_property("ABC", "debug.layout", "true").await;
        assert!(outcome.success);
        assert_eq!(runner.calls(), vec!["-s ABC shell setprop debug.layout true"]);

        let (adb, _) = client(ScriptedRunner::new().on(
            "setprop",
            Reply::failed("", "Failed to set property 'ro.secure' to '0'.\n"),
        ));
        let outcome = adb.set_property("ABC", "ro.secure", "0").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Failed to set property 'ro.secure' to '0'.\n");
    }

    #[tokio::test]
    async fn test_install_failure_returns_output_verbatim() {
        let (adb, _) = client(ScriptedRunner::new().on(
            "install -r",
            Reply::failed(
                "Performing Streamed Install\n",
                "adb: failed to install app.apk: Failure [INSTALL_FAILED_OLDER_SDK]\n",
            ),
        ));
        let outcome = adb.install_package("ABC", "app.apk").await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "Performing Streamed Install\nadb: failed to install app.apk: Failure [INSTALL_FAILED_OLDER_SDK]\n"
        );
    }

    #[tokio::test]
    async fn test_install_requires_success_token() {
        let (adb, _) = client(ScriptedRunner::new().on("install", Reply::ok("Performing Streamed Install\n")));
        let outcome = adb.install_package("ABC", "app.apk").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Performing Streamed Install\n");

        let (adb, _) = client(ScriptedRunner::new().on("install", Reply::ok("Performing Streamed Install\nSuccess\n")));
        assert!(adb.install_package("ABC", "app.apk").await.success);
    }

    #[tokio::test]
    async fn test_install_timeout() {
        let (adb, _) = client(ScriptedRunner::new().on("install", Reply::Timeout));
        let outcome = adb.install_package("ABC", "app.apk").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "adb timed out after 120s");
    }

    #[tokio::test]
    async fn test_screenshot_sequence() {
        let runner = ScriptedRunner::new()
            .on("screencap", Reply::ok(""))
            .on("pull", Reply::ok("1 file pulled\n"))
            .on("shell rm", Reply::ok(""));
        let (adb, runner) = client(runner);

        let outcome = adb.take_screenshot("ABC", "shot.png").await;
        assert!(outcome.success);
        assert_eq!(
            runner.calls(),
            vec![
                "-s ABC shell screencap -p /sdcard/screenshot.png",
                "-s ABC pull /sdcard/screenshot.png shot.png",
                "-s ABC shell rm /sdcard/screenshot.png",
            ]
        );
    }

    #[tokio::test]
    async fn test_screenshot_short_circuits() {
        let (adb, runner) = client(ScriptedRunner::new().on("screencap", Reply::failed("", "")));
        let outcome = adb.take_screenshot("ABC", "shot.png").await;
        assert!(!outcome.success);
        assert_eq!(runner.calls().len(), 1);

        let runner = ScriptedRunner::new()
            .on("screencap", Reply::ok(""))
            .on("pull", Reply::Timeout);
        let (adb, runner) = client(runner);
        let outcome = adb.take_screenshot("ABC", "shot.png").await;
        assert!(!outcome.success);
        // no cleanup after a failed pull
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_push_failure_text() {
        let (adb, _) = client(ScriptedRunner::new().on(
            "push",
            Reply::failed("", "adb: error: cannot stat 'missing.txt': No such file or directory\n"),
        ));
        let outcome = adb.push_file("ABC", "missing.txt", "/sdcard/").await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("cannot stat"));
    }

    #[tokio::test]
    async fn test_pull_argument_order() {
        let (adb, runner) = client(ScriptedRunner::new().on("pull", Reply::ok("1 file pulled\n")));
        let outcome = adb.pull_file("ABC", "/sdcard/log.txt", "log.txt").await;
        assert!(outcome.success);
        assert!(outcome.message.contains("log.txt"));
        assert_eq!(runner.calls(), vec!["-s ABC pull /sdcard/log.txt log.txt"]);

        let (adb, _) = client(ScriptedRunner::new().on(
            "pull",
            Reply::failed("", "adb: error: failed to stat remote object '/sdcard/nope'\n"),
        ));
        let outcome = adb.pull_file("ABC", "/sdcard/nope", "nope").await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("failed to stat remote object"));
    }

    #[tokio::test]
    async fn test_shell_reports_exit_and_output() {
        let (adb, _) = client(ScriptedRunner::new().on("shell ls", Reply::failed("", "ls: /nope: No such file or directory\n")));
        let outcome = adb.shell("ABC", "ls /nope").await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "ls: /nope: No such file or directory\n");
    }

    #[tokio::test]
    async fn test_reboot_mode_arguments() {
        let (adb, runner) = client(ScriptedRunner::new().on("reboot", Reply::ok("")).on("reboot", Reply::ok("")));
        assert!(adb.reboot("ABC", RebootMode::System).await.success);
        assert!(adb.reboot("ABC", RebootMode::Bootloader).await.success);
        assert_eq!(
            runner.calls(),
            vec!["-s ABC reboot", "-s ABC reboot bootloader"]
        );
    }

    #[test]
    fn test_reboot_mode_parse() {
        assert_eq!("recovery".parse::<RebootMode>().unwrap(), RebootMode::Recovery);
        assert!("fastboot".parse::<RebootMode>().is_err());
    }

    #[test]
    fn test_connect_output_classification() {
        assert!(connect_succeeded("connected to 192.168.1.55:5555"));
        assert!(connect_succeeded("already connected to 192.168.1.55:5555"));
        assert!(!connect_succeeded("failed to connect to 192.168.1.55:5555"));
        assert!(!connect_succeeded("cannot connect to 192.168.1.55:5555: Connection refused"));
        assert!(!connect_succeeded(""));
    }

    #[tokio::test]
    async fn test_connect_zero_exit_but_refused() {
        let (adb, _) = client(ScriptedRunner::new().on(
            "connect 192.168.1.55:5555",
            Reply::ok("failed to connect to '192.168.1.55:5555': Connection refused\n"),
        ));
        let outcome = adb.connect("192.168.1.55", 5555).await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let (adb, runner) = client(ScriptedRunner::new().on("disconnect", Reply::ok("disconnected 192.168.1.55:5555\n")));
        assert!(adb.disconnect("192.168.1.55:5555").await.success);
        assert_eq!(runner.calls(), vec!["disconnect 192.168.1.55:5555"]);

        let (adb, _) = client(ScriptedRunner::new().on(
            "disconnect",
            Reply::failed("", "error: no such device '192.168.1.99:5555'\n"),
        ));
        let outcome = adb.disconnect("192.168.1.99:5555").await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.message,
            "failed to disconnect: error: no such device '192.168.1.99:5555'"
        );
    }

    #[tokio::test]
    async fn test_enable_tcpip() {
        let (adb, runner) = client(ScriptedRunner::new().on("tcpip", Reply::ok("restarting in TCP mode port: 5555\n")));
        assert!(adb.enable_tcpip("ABC", 5555).await.success);
        assert_eq!(runner.calls(), vec!["-s ABC tcpip 5555"]);
    }

    #[tokio::test]
    async fn test_ip_discovery_rejects_gateways_and_moves_on() {
        let runner = ScriptedRunner::new()
            .on("dhcp.wlan0.ipaddress", Reply::ok("192.168.0.1\n"))
            .on("dhcp.wifi.ipaddress", Reply::ok("10.0.0.1\n"))
            .on("dhcp.wlan1.ipaddress", Reply::ok("192.168.1.55\n"));
        let (adb, runner) = client(runner);

        assert_eq!(adb.discover_wifi_address("ABC").await, "192.168.1.55");
        // stopped after the third property
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_ip_discovery_falls_through_to_ip_addr() {
        let runner = ScriptedRunner::new()
            .on("dhcp.wlan0.ipaddress", Reply::ok("192.168.0.1\n"))
            .on(
                "ip addr show",
                Reply::ok("30: wlan0: <UP>\n    inet 192.168.1.80/24 brd 192.168.1.255 scope global wlan0\n"),
            );
        let (adb, runner) = client(runner);

        assert_eq!(adb.discover_wifi_address("ABC").await, "192.168.1.80");
        let calls = runner.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[4], "-s ABC shell ip addr show");
    }

    #[tokio::test]
    async fn test_ip_discovery_aborts_when_tool_cannot_run() {
        let runner = ScriptedRunner::new()
            .on("dhcp.wlan0.ipaddress", Reply::Timeout)
            .on("dhcp.wifi.ipaddress", Reply::ok("192.168.1.55\n"));
        let (adb, runner) = client(runner);
        assert_eq!(adb.discover_wifi_address("ABC").await, "");
        assert_eq!(runner.calls().len(), 1);

        let runner = ScriptedRunner::new().on("ip addr show", Reply::NotFound);
        let (adb, runner) = client(runner);
        assert_eq!(adb.discover_wifi_address("ABC").await, "");
        // four properties, then the failed ip addr; no ifconfig
        assert_eq!(runner.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_ip_discovery_ifconfig_then_empty() {
        let runner = ScriptedRunner::new().on(
            "ifconfig wlan0",
            Reply::ok("wlan0 Link encap:UNSPEC\n  inet addr:192.168.43.12  Bcast:192.168.43.255\n"),
        );
        let (adb, _) = client(runner);
        assert_eq!(adb.discover_wifi_address("ABC").await, "192.168.43.12");

        let (adb, runner) = client(ScriptedRunner::new());
        assert_eq!(adb.discover_wifi_address("ABC").await, "");
        assert_eq!(runner.calls().len(), 6);
    }
}

//! Subcommand execution
//!
//! Each handler forwards to the shared clients and prints the result.
//! Failed outcomes become errors so the process exits non-zero.

use std::path::Path;
use std::time::Duration;

use anyhow::bail;
use droiddeck_shared::options::Preset;
use droiddeck_shared::{AdbClient, Config, Outcome, SessionController};
use tracing::{info, warn};

use crate::output;
use crate::{Command, MirrorArgs, PropCommand};

pub async fn run(command: Command, config: &Config, json: bool) -> anyhow::Result<()> {
    let adb = AdbClient::new(config);

    match command {
        Command::Check => check(config, &adb, json).await,
        Command::Devices => {
            let devices = adb.list_devices().await;
            output::print_devices(&devices, json)
        }
        Command::Watch { interval } => {
            let period = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.refresh_interval());
            watch(&adb, period, json).await
        }
        Command::Info { serial } => {
            let info = adb.device_info(&serial).await;
            output::print_info(&serial, &info, json)
        }
        Command::Prop(PropCommand::Get { serial, name }) => {
            let value = adb.get_property(&serial, &name).await;
            if value.is_empty() {
                bail!("{} is not set or the device did not answer", name);
            }
            println!("{}", value);
            Ok(())
        }
        Command::Prop(PropCommand::Set {
            serial,
            name,
            value,
        }) => report(adb.set_property(&serial, &name, &value).await),
        Command::Install { serial, apk } => {
            report(adb.install_package(&serial, &path_arg(&apk)).await)
        }
        Command::Screenshot { serial, output } => {
            report(adb.take_screenshot(&serial, &path_arg(&output)).await)
        }
        Command::Push {
            serial,
            local,
            remote,
        } => report(adb.push_file(&serial, &path_arg(&local), &remote).await),
        Command::Pull {
            serial,
            remote,
            local,
        } => report(adb.pull_file(&serial, &remote, &path_arg(&local)).await),
        Command::Shell { serial, command } => {
            let outcome = adb.shell(&serial, &command.join(" ")).await;
            print!("{}", outcome.message);
            if !outcome.success {
                bail!("command failed");
            }
            Ok(())
        }
        Command::Reboot { serial, mode } => report(adb.reboot(&serial, mode).await),
        Command::Connect { host, port } => {
            report(adb.connect(&host, port.unwrap_or(config.wireless_port)).await)
        }
        Command::Disconnect { device } => report(adb.disconnect(&device).await),
        Command::Tcpip { serial, port } => {
            report(adb.enable_tcpip(&serial, port.unwrap_or(config.wireless_port)).await)
        }
        Command::Ip { serial } => {
            let address = adb.discover_wifi_address(&serial).await;
            if address.is_empty() {
                bail!("no WiFi address found for {}", serial);
            }
            println!("{}", address);
            Ok(())
        }
        Command::Presets => output::print_presets(&Preset::ALL, json),
        Command::Mirror(args) => mirror(config, args).await,
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Print a successful outcome, or turn a failed one into an error
fn report(outcome: Outcome) -> anyhow::Result<()> {
    if outcome.success {
        println!("{}", outcome.message.trim_end());
        Ok(())
    } else {
        bail!("{}", outcome.message.trim_end())
    }
}

async fn check(config: &Config, adb: &AdbClient, json: bool) -> anyhow::Result<()> {
    let scrcpy = SessionController::new(config);

    let status = output::ToolStatus {
        adb_available: adb.is_available().await,
        adb_version: adb.version().await,
        scrcpy_available: scrcpy.is_available().await,
        scrcpy_version: scrcpy.version().await,
    };
    output::print_tool_status(&status, json)?;

    if !status.adb_available {
        bail!("{} is not available", config.adb_path);
    }
    Ok(())
}

async fn watch(adb: &AdbClient, period: Duration, json: bool) -> anyhow::Result<()> {
    info!("refreshing device list every {:?}", period);
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let devices = adb.list_devices().await;
                output::print_devices(&devices, json)?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(());
            }
        }
    }
}

async fn mirror(config: &Config, args: MirrorArgs) -> anyhow::Result<()> {
    let controller = SessionController::new(config);
    let options = args.to_options(&config.default_preset);

    let outcome = match &args.wireless {
        Some(host) => {
            let port = args.port.unwrap_or(config.wireless_port);
            controller.start_wireless(host, port, Some(&options)).await
        }
        None => controller.start(args.serial.as_deref(), Some(&options)).await,
    };
    report(outcome)?;

    let mut ticker = tokio::time::interval(config.refresh_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Grab the tail first; the poll below clears an exited session
                let recent = controller.recent_output().await;
                if !controller.is_running().await {
                    info!("scrcpy exited");
                    if let Some(last) = recent.last() {
                        warn!("last scrcpy output: {}", last);
                    }
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping scrcpy");
                return report(controller.stop().await);
            }
        }
    }
}

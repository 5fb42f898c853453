//! Human-readable and JSON rendering

use droiddeck_shared::{Device, Preset};
use serde::Serialize;

/// Result of `droiddeck check`
#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub adb_available: bool,
    pub adb_version: Option<String>,
    pub scrcpy_available: bool,
    pub scrcpy_version: Option<String>,
}

#[derive(Serialize)]
struct PresetRow<'a> {
    name: &'a str,
    args: Vec<String>,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub fn print_devices(devices: &[Device], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(devices);
    }
    if devices.is_empty() {
        println!("No devices attached");
        return Ok(());
    }

    println!(
        "{:<24} {:<14} {:<20} {:<14} {:<8} {:<8}",
        "ID", "STATE", "MODEL", "MANUFACTURER", "ANDROID", "BATTERY"
    );
    for device in devices {
        println!(
            "{:<24} {:<14} {:<20} {:<14} {:<8} {:<8}",
            device.id,
            device.state.as_str(),
            or_dash(device.display_name()),
            or_dash(&device.manufacturer),
            or_dash(&device.android_version),
            or_dash(&device.battery_level),
        );
    }
    Ok(())
}

pub fn print_info(serial: &str, info: &[(&'static str, String)], json: bool) -> anyhow::Result<()> {
    if json {
        let map: serde_json::Map<String, serde_json::Value> = info
            .iter()
            .map(|(label, value)| (label.to_string(), serde_json::Value::from(value.as_str())))
            .collect();
        return print_json(&map);
    }

    println!("{}", serial);
    for (label, value) in info {
        println!("  {:<13} {}", format!("{}:", label), or_dash(value));
    }
    Ok(())
}

pub fn print_tool_status(status: &ToolStatus, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(status);
    }

    let describe = |available: bool, version: &Option<String>| match (available, version) {
        (true, Some(version)) => format!("available ({})", version),
        (true, None) => "available".to_string(),
        (false, _) => "not found".to_string(),
    };
    println!("adb:    {}", describe(status.adb_available, &status.adb_version));
    println!("scrcpy: {}", describe(status.scrcpy_available, &status.scrcpy_version));
    Ok(())
}

pub fn print_presets(presets: &[Preset], json: bool) -> anyhow::Result<()> {
    let rows: Vec<PresetRow> = presets
        .iter()
        .map(|preset| PresetRow {
            name: preset.name(),
            args: preset.options().to_args(),
        })
        .collect();

    if json {
        return print_json(&rows);
    }
    for row in rows {
        println!("{:<12} {}", row.name, row.args.join(" "));
    }
    Ok(())
}

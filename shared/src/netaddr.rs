//! Parsing helpers for WiFi address discovery
//!
//! Discovery is best-effort. Each helper only inspects text; the order in
//! which they are tried lives in [`crate::adb::AdbClient::discover_wifi_address`].

use regex::Regex;

/// Properties tried first, in order
pub const WIFI_ADDRESS_PROPERTIES: [&str; 4] = [
    "dhcp.wlan0.ipaddress",
    "dhcp.wifi.ipaddress",
    "dhcp.wlan1.ipaddress",
    "dhcp.eth0.ipaddress",
];

/// Common router addresses that a misconfigured property can report in
/// place of the device's own address. Known limitation: this list is ad hoc
/// and deliberately not extended.
pub const EXCLUDED_GATEWAYS: [&str; 3] = ["192.168.0.1", "192.168.1.1", "10.0.0.1"];

/// Interface-name fragments that mark a wireless/ethernet block in `ip addr show`
const INTERFACE_KEYWORDS: [&str; 4] = ["wlan", "wifi", "wl", "eth"];

/// How many lines after an interface header are scanned for its `inet` line
const INET_LOOKAHEAD: usize = 4;

fn is_dotted_quad_shape(candidate: &str) -> bool {
    candidate.matches('.').count() == 3
}

fn is_excluded_gateway(candidate: &str) -> bool {
    EXCLUDED_GATEWAYS.contains(&candidate)
}

/// Filter for property values and `ip addr` hits: three dots, not loopback,
/// not one of the excluded gateways.
pub fn is_acceptable_address(candidate: &str) -> bool {
    !candidate.is_empty()
        && is_dotted_quad_shape(candidate)
        && !candidate.starts_with("127.")
        && !is_excluded_gateway(candidate)
}

/// Scan `ip addr show` output for the first acceptable address that follows
/// a wireless or ethernet interface header.
pub fn parse_ip_addr_show(output: &str) -> Option<String> {
    let lines: Vec<&str> = output.trim().lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !INTERFACE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }

        let end = (i + 1 + INET_LOOKAHEAD).min(lines.len());
        for inet_line in &lines[i + 1..end] {
            if !(inet_line.contains("inet ") && inet_line.contains('/')) {
                continue;
            }
            for token in inet_line.split_whitespace() {
                if !(is_dotted_quad_shape(token) && token.contains('/')) {
                    continue;
                }
                let address = token.split('/').next().unwrap_or_default();
                if is_acceptable_address(address) {
                    return Some(address.to_string());
                }
            }
        }
    }

    None
}

/// Extract `inet addr:A.B.C.D` from legacy `ifconfig` output.
///
/// Only the gateway exclusions apply here; loopback is not filtered, which
/// matches what `ifconfig wlan0` can report.
pub fn parse_ifconfig(output: &str) -> Option<String> {
    let re = Regex::new(r"inet addr:(\d+\.\d+\.\d+\.\d+)").ok()?;
    let address = re.captures(output)?.get(1)?.as_str();
    if is_excluded_gateway(address) {
        None
    } else {
        Some(address.to_string())
    }
}

//! Command-line arguments
//!
//! Deployed scripts call the daemon as `thermal-bridge -ip 10.0.0.255 -port 7000`.
//! Those single-dash long flags are rewritten to their `--` form before
//! clap sees them. Malformed `ip`/`port` values are ignored with a warning
//! so a typo in a boot script never keeps the sensor offline.

use crate::config::{MIN_PORT, NetworkConfig};
use clap::Parser;
use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// AMG8833 thermal sensor to UDP broadcast bridge
#[derive(Parser, Debug, Default)]
#[command(name = "thermal-bridge", author, version, about, long_about = None)]
pub struct Args {
    /// Destination IPv4 address, usually the subnet broadcast address (also -ip)
    #[arg(long, value_name = "IPV4", num_args = 0..=1)]
    pub ip: Option<Option<String>>,

    /// Destination UDP port, 1024-65535 (also -port)
    #[arg(long, value_name = "PORT", num_args = 0..=1)]
    pub port: Option<Option<String>>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Parse the process arguments, accepting the legacy flag spelling
    pub fn from_env() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Apply `ip`/`port` overrides to the network section
    ///
    /// Invalid values are logged and skipped; the configured value stays.
    pub fn apply_network_overrides(&self, network: &mut NetworkConfig) {
        match &self.ip {
            Some(Some(ip)) => match ip.parse::<Ipv4Addr>() {
                Ok(address) => network.address = address,
                Err(_) => log::warn!(
                    "Ignoring invalid ip '{}', using {}",
                    ip,
                    network.address
                ),
            },
            Some(None) => log::warn!("ip given without a value, using {}", network.address),
            None => {}
        }

        match &self.port {
            Some(Some(port)) => match port.parse::<u16>() {
                Ok(p) if p >= MIN_PORT => network.port = p,
                _ => log::warn!(
                    "Ignoring invalid port '{}' (expected {}-65535), using {}",
                    port,
                    MIN_PORT,
                    network.port
                ),
            },
            Some(None) => log::warn!("port given without a value, using {}", network.port),
            None => {}
        }
    }
}

/// Flags whose value is attached with `=` during normalisation
const VALUE_FLAGS: [&str; 2] = ["ip", "port"];

/// Rewrite `-ip`/`-port` to their double-dash form and attach their values
///
/// `-port -1` becomes `--port=-1`, so a value starting with a dash reaches
/// validation instead of being parsed as a flag. A flag followed by another
/// option, or by nothing, is passed on without a value.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut out = Vec::new();

    while let Some(arg) = args.next() {
        let Some(name) = arg.to_str().and_then(value_flag) else {
            out.push(legacy_with_value(arg));
            continue;
        };

        let value = args
            .next_if(|next| next.to_str().is_none_or(|text| !is_option(text)))
            .map(|next| next.to_string_lossy().into_owned());
        match value {
            Some(value) => out.push(OsString::from(format!("--{}={}", name, value))),
            None => out.push(OsString::from(format!("--{}", name))),
        }
    }
    out
}

/// Flag name if `text` is exactly `-ip`, `--ip`, `-port` or `--port`
fn value_flag(text: &str) -> Option<&'static str> {
    let name = text.strip_prefix("--").or_else(|| text.strip_prefix('-'))?;
    VALUE_FLAGS.into_iter().find(|flag| *flag == name)
}

/// `-ip=..`/`-port=..` to `--ip=..`/`--port=..`
fn legacy_with_value(arg: OsString) -> OsString {
    if let Some(text) = arg.to_str() {
        for flag in VALUE_FLAGS {
            if text
                .strip_prefix('-')
                .and_then(|rest| rest.strip_prefix(flag))
                .is_some_and(|rest| rest.starts_with('='))
            {
                return OsString::from(format!("-{}", text));
            }
        }
    }
    arg
}

/// Whether `text` is one of the daemon's own options rather than a value
fn is_option(text: &str) -> bool {
    text.starts_with("--")
        || value_flag(text).is_some()
        || legacy_with_value(OsString::from(text)) != text
        || matches!(text, "-c" | "-h" | "-V")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(normalize_args(args.iter().copied()))
    }

    #[test]
    fn test_normalize_legacy_flags() {
        let args = normalize_args([
            "thermal-bridge",
            "-ip",
            "10.0.0.255",
            "-port=7000",
            "-c",
            "x.toml",
        ]);
        assert_eq!(
            args,
            vec!["thermal-bridge", "--ip=10.0.0.255", "--port=7000", "-c", "x.toml"]
        );
        // Values that happen to start with the flag text are untouched
        assert_eq!(normalize_args(["-ipx"]), vec!["-ipx"]);
        // A following option is not taken as the value
        assert_eq!(
            normalize_args(["thermal-bridge", "-ip", "-port", "7000"]),
            vec!["thermal-bridge", "--ip", "--port=7000"]
        );
    }

    #[test]
    fn test_parse_legacy_flags() {
        let args = parse(&["thermal-bridge", "-ip", "10.0.0.255", "-port", "7000"]);
        assert_eq!(args.ip, Some(Some("10.0.0.255".to_string())));
        assert_eq!(args.port, Some(Some("7000".to_string())));

        let mut network = NetworkConfig::default();
        args.apply_network_overrides(&mut network);
        assert_eq!(network.address, Ipv4Addr::new(10, 0, 0, 255));
        assert_eq!(network.port, 7000);
    }

    #[test]
    fn test_parse_modern_flags() {
        let args = parse(&[
            "thermal-bridge",
            "--ip",
            "192.168.0.255",
            "--config",
            "/etc/thermal-bridge.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.ip, Some(Some("192.168.0.255".to_string())));
        assert_eq!(args.config, Some(PathBuf::from("/etc/thermal-bridge.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.port.is_none());
    }

    #[test]
    fn test_invalid_values_ignored() {
        let mut network = NetworkConfig::default();
        for (ip, port) in [("300.1.1.1", "80"), ("not-an-ip", "70000"), ("", "abc")] {
            let args = Args {
                ip: Some(Some(ip.to_string())),
                port: Some(Some(port.to_string())),
                ..Default::default()
            };
            args.apply_network_overrides(&mut network);
        }
        assert_eq!(network.address, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(network.port, 6501);
    }

    #[test]
    fn test_port_bounds() {
        let mut network = NetworkConfig::default();
        let args = Args {
            port: Some(Some("1024".to_string())),
            ..Default::default()
        };
        args.apply_network_overrides(&mut network);
        assert_eq!(network.port, 1024);

        let args = Args {
            port: Some(Some("1023".to_string())),
            ..Default::default()
        };
        args.apply_network_overrides(&mut network);
        assert_eq!(network.port, 1024);
    }

    #[test]
    fn test_parse_negative_port_ignored() {
        let args = parse(&["thermal-bridge", "-port", "-1"]);
        assert_eq!(args.port, Some(Some("-1".to_string())));

        let mut network = NetworkConfig::default();
        args.apply_network_overrides(&mut network);
        assert_eq!(network.port, 6501);
    }

    #[test]
    fn test_parse_trailing_flag_without_value() {
        let args = parse(&["thermal-bridge", "-ip"]);
        assert_eq!(args.ip, Some(None));

        let args = parse(&["thermal-bridge", "-ip", "10.0.0.255", "-port"]);
        assert_eq!(args.ip, Some(Some("10.0.0.255".to_string())));
        assert_eq!(args.port, Some(None));

        let mut network = NetworkConfig::default();
        args.apply_network_overrides(&mut network);
        assert_eq!(network.address, Ipv4Addr::new(10, 0, 0, 255));
        assert_eq!(network.port, 6501);
    }

    #[test]
    fn test_parse_flag_followed_by_option() {
        let args = parse(&["thermal-bridge", "-ip", "-port", "7000", "-c", "x.toml"]);
        assert_eq!(args.ip, Some(None));
        assert_eq!(args.port, Some(Some("7000".to_string())));
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_no_args_keeps_config() {
        let args = parse(&["thermal-bridge"]);
        let mut network = NetworkConfig::default();
        args.apply_network_overrides(&mut network);
        assert_eq!(network.address, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(network.port, 6501);
    }
}

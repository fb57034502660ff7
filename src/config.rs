//! Configuration for ThermalBridge
//!
//! Loaded from a TOML file. Every section and field has a default matching
//! the stock Raspberry Pi wiring (AMG8833 at 0x68 on `/dev/i2c-1`) and the
//! legacy broadcast target, so the daemon also runs without any file.

use crate::acquisition::LoopOptions;
use crate::error::{Error, Result};
use crate::sensor::{FrameRate, SensorOptions, SensorTiming};
use crate::streaming::NetworkTarget;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

/// Default I²C address of the AMG8833 (AD_SELECT pulled low)
pub const DEFAULT_SENSOR_ADDRESS: u16 = 0x68;

/// Default broadcast address
pub const DEFAULT_BROADCAST_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 255);

/// Default destination port
pub const DEFAULT_PORT: u16 = 6501;

/// Lowest destination port accepted (unprivileged range)
pub const MIN_PORT: u16 = 1024;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorConfig,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

/// Sensor bus and timing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    /// I²C character device (e.g., "/dev/i2c-1")
    pub bus_path: String,
    /// 7-bit I²C slave address (0x68 or 0x69)
    pub address: u16,
    /// Sensor internal frame rate
    pub frame_rate: FrameRate,
    /// Enable the sensor's twice-moving-average filter
    pub moving_average: bool,
    /// Wait after switching to normal power mode
    pub power_up_delay_ms: u64,
    /// Wait after the initial reset (two frames at 10 fps)
    pub reset_settle_ms: u64,
    /// Sleep between status polls that find no new frame
    pub poll_interval_ms: u64,
    /// Retries after a steady-state bus error before the daemon gives up
    pub max_bus_retries: u32,
}

/// Broadcast destination
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// IPv4 destination, normally the subnet broadcast address
    pub address: Ipv4Addr,
    /// UDP destination port
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log a throughput summary every N frames (0 disables)
    pub stats_interval: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bus_path: "/dev/i2c-1".to_string(),
            address: DEFAULT_SENSOR_ADDRESS,
            frame_rate: FrameRate::default(),
            moving_average: true,
            power_up_delay_ms: 50,
            reset_settle_ms: 200,
            poll_interval_ms: 10,
            max_bus_retries: 3,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_BROADCAST_ADDRESS,
            port: DEFAULT_PORT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stats_interval: 100,
        }
    }
}

impl SensorConfig {
    /// Delays used by the bring-up sequence
    pub fn timing(&self) -> SensorTiming {
        SensorTiming {
            power_up: Duration::from_millis(self.power_up_delay_ms),
            reset_settle: Duration::from_millis(self.reset_settle_ms),
        }
    }

    /// Options for [`crate::sensor::SensorSession::initialize`]
    pub fn options(&self) -> SensorOptions {
        SensorOptions {
            frame_rate: self.frame_rate,
            moving_average: self.moving_average,
            timing: self.timing(),
        }
    }
}

impl NetworkConfig {
    /// Validated broadcast target
    pub fn target(&self) -> Result<NetworkTarget> {
        NetworkTarget::new(self.address, self.port)
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use thermal_bridge::config::Config;
    ///
    /// let config = Config::from_file("thermal-bridge.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Pacing and fault tolerance for the acquisition loop
    pub fn loop_options(&self) -> LoopOptions {
        LoopOptions {
            poll_interval: Duration::from_millis(self.sensor.poll_interval_ms),
            max_bus_retries: self.sensor.max_bus_retries,
            stats_interval: self.logging.stats_interval,
        }
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.sensor.bus_path.is_empty() {
            return Err(Error::Config("sensor.bus_path must not be empty".to_string()));
        }
        if self.sensor.address > 0x7F {
            return Err(Error::Config(format!(
                "sensor.address {:#x} is not a 7-bit I2C address",
                self.sensor.address
            )));
        }
        self.network
            .target()
            .map_err(|e| Error::Config(format!("network: {}", e)))?;
        Ok(())
    }
}

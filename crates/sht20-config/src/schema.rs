// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for the SHT20 poller.
//!
//! # Schema Structure
//!
//! ```text
//! Sht20Config
//! ├── device: DeviceConfig
//! │   └── connection: ConnectionConfig (tcp | rtu)
//! ├── polling: PollingConfig
//! ├── display: DisplayConfig
//! └── logging: LoggingConfig
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sht20_modbus::ConnectionConfig;
use sht20_modbus::device::registers;

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default device name.
pub const DEFAULT_DEVICE_NAME: &str = "SHT20 Sensor";

/// Default interval between realtime reads.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Default pause between the first realtime read and the settings read.
pub const DEFAULT_SETTINGS_DELAY: Duration = Duration::from_secs(1);

/// Default number of decimals shown for readings.
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest accepted display precision.
pub const MAX_PRECISION: u32 = 6;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration of the poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sht20Config {
    /// The sensor and how to reach it.
    pub device: DeviceConfig,

    /// Polling schedule.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Host-side presentation of readings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Sht20Config {
    /// Creates a configuration with defaults around the given connection.
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            device: DeviceConfig::new(connection),
            polling: PollingConfig::default(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.device.validate()?;
        self.polling.validate()?;
        self.display.validate()?;
        Ok(())
    }
}

// =============================================================================
// Device Configuration
// =============================================================================

/// The SHT20 sensor being polled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Human-readable device name.
    #[serde(default = "default_device_name")]
    pub name: String,

    /// Raw-to-engineering multiplier of the realtime registers.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Modbus link and unit id.
    pub connection: ConnectionConfig,
}

fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

fn default_multiplier() -> f64 {
    registers::DEFAULT_MULTIPLIER
}

impl DeviceConfig {
    /// Creates a device entry with the default name and multiplier.
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            name: default_device_name(),
            multiplier: default_multiplier(),
            connection,
        }
    }

    /// Validates the device configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation("device.name", "cannot be empty"));
        }

        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(ConfigError::validation(
                "device.multiplier",
                format!("must be a positive number, got {}", self.multiplier),
            ));
        }

        self.connection.validate()?;

        // The sensor itself only speaks a subset of the serial rates.
        if let Some(rtu) = self.connection.as_rtu() {
            if !registers::is_supported_baud_rate(rtu.baud_rate) {
                return Err(ConfigError::validation(
                    "device.connection.baud_rate",
                    format!(
                        "{} is not supported by the SHT20 (expected one of {:?})",
                        rtu.baud_rate,
                        registers::SUPPORTED_BAUD_RATES
                    ),
                ));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Polling Configuration
// =============================================================================

/// When the poller reads the sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    /// Interval between realtime reads.
    #[serde(default = "default_scan_interval", with = "humantime_serde")]
    pub scan_interval: Duration,

    /// Pause between the first realtime read and the settings read.
    #[serde(default = "default_settings_delay", with = "humantime_serde")]
    pub settings_delay: Duration,
}

fn default_scan_interval() -> Duration {
    DEFAULT_SCAN_INTERVAL
}

fn default_settings_delay() -> Duration {
    DEFAULT_SETTINGS_DELAY
}

impl PollingConfig {
    /// Validates the polling configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scan_interval.is_zero() {
            return Err(ConfigError::validation(
                "polling.scan_interval",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            scan_interval: DEFAULT_SCAN_INTERVAL,
            settings_delay: DEFAULT_SETTINGS_DELAY,
        }
    }
}

// =============================================================================
// Display Configuration
// =============================================================================

/// Offsets and rounding applied to readings before they are shown.
///
/// These never touch the correction registers on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Added to every temperature reading.
    #[serde(default)]
    pub temp_offset: f64,

    /// Added to every humidity reading.
    #[serde(default)]
    pub hum_offset: f64,

    /// Decimal places of displayed values.
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl DisplayConfig {
    /// Validates the display configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.temp_offset.is_finite() {
            return Err(ConfigError::validation("display.temp_offset", "must be finite"));
        }
        if !self.hum_offset.is_finite() {
            return Err(ConfigError::validation("display.hum_offset", "must be finite"));
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::validation(
                "display.precision",
                format!("cannot exceed {}", MAX_PRECISION),
            ));
        }
        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            temp_offset: 0.0,
            hum_offset: 0.0,
            precision: DEFAULT_PRECISION,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
    /// Abbreviated single-line format.
    Compact,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        })
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

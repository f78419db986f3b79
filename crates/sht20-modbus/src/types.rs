// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Connection configuration types.
//!
//! - **RegisterType**: the two 16-bit register tables the SHT20 exposes
//! - **ModbusTcpConfig**: TCP connection configuration
//! - **ModbusRtuConfig**: RTU serial configuration
//! - **ConnectionConfig**: either of the above, tagged by `type`
//!
//! # Examples
//!
//! ```
//! use sht20_modbus::types::{ConnectionConfig, ModbusTcpConfig};
//!
//! let connection = ConnectionConfig::from(ModbusTcpConfig::new("192.168.1.50").with_unit_id(3));
//! assert_eq!(connection.unit_id(), 3);
//! assert!(connection.validate().is_ok());
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ModbusError};

/// Lowest valid Modbus unit id.
pub const MIN_UNIT_ID: u8 = 1;

/// Highest valid Modbus unit id.
pub const MAX_UNIT_ID: u8 = 247;

// =============================================================================
// RegisterType
// =============================================================================

/// 16-bit register table addressed by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterType {
    /// Input Register (read-only, function code 4).
    InputRegister,
    /// Holding Register (read/write, function codes 3, 6, 16).
    HoldingRegister,
}

impl RegisterType {
    /// Returns the function code for reading this register type.
    #[inline]
    pub const fn read_function_code(&self) -> u8 {
        match self {
            Self::HoldingRegister => 0x03,
            Self::InputRegister => 0x04,
        }
    }

    /// Returns the maximum number of registers in a single read.
    #[inline]
    pub const fn max_read_count(&self) -> u16 {
        125
    }

    /// Returns the maximum number of registers in a single write.
    #[inline]
    pub const fn max_write_count() -> u16 {
        123
    }
}

impl fmt::Display for RegisterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputRegister => write!(f, "input register"),
            Self::HoldingRegister => write!(f, "holding register"),
        }
    }
}

// =============================================================================
// Defaults
// =============================================================================

fn default_port() -> u16 {
    502
}

fn default_unit_id() -> u8 {
    1
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_baud_rate() -> u32 {
    9600
}

fn validate_unit_id(unit_id: u8) -> Result<(), ModbusError> {
    if !(MIN_UNIT_ID..=MAX_UNIT_ID).contains(&unit_id) {
        return Err(ModbusError::configuration(
            ConfigurationError::invalid_unit_id(unit_id),
        ));
    }
    Ok(())
}

fn validate_timeout(name: &str, duration: Duration) -> Result<(), ModbusError> {
    if duration.is_zero() {
        return Err(ModbusError::configuration(ConfigurationError::InvalidTimeout {
            duration,
            reason: format!("{} must be greater than 0", name),
        }));
    }
    Ok(())
}

// =============================================================================
// ModbusTcpConfig
// =============================================================================

/// Configuration for Modbus TCP connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModbusTcpConfig {
    /// Target host (IP address or hostname).
    pub host: String,

    /// Target port (default: 502).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Unit ID / Slave address (default: 1).
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Connection timeout.
    #[serde(default = "default_connect_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Read/write operation timeout.
    #[serde(default = "default_operation_timeout")]
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,
}

impl ModbusTcpConfig {
    /// Creates a configuration for `host` with default port, unit and timeouts.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the unit id.
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Returns the socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        if self.host.trim().is_empty() {
            return Err(ModbusError::configuration(ConfigurationError::missing_field(
                "host",
            )));
        }

        if self.host.chars().any(char::is_whitespace) {
            return Err(ModbusError::configuration(ConfigurationError::invalid_host(
                &self.host,
                "host must not contain whitespace",
            )));
        }

        if self.port == 0 {
            return Err(ModbusError::configuration(ConfigurationError::invalid_host(
                self.socket_addr(),
                "port must be greater than 0",
            )));
        }

        validate_unit_id(self.unit_id)?;
        validate_timeout("connect_timeout", self.connect_timeout)?;
        validate_timeout("operation_timeout", self.operation_timeout)?;

        Ok(())
    }
}

impl Default for ModbusTcpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            unit_id: default_unit_id(),
            connect_timeout: default_connect_timeout(),
            operation_timeout: default_operation_timeout(),
        }
    }
}

// =============================================================================
// ModbusRtuConfig
// =============================================================================

/// Configuration for Modbus RTU connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModbusRtuConfig {
    /// Serial device path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,

    /// Baud rate.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Data bits.
    #[serde(default)]
    pub data_bits: DataBits,

    /// Parity.
    #[serde(default)]
    pub parity: Parity,

    /// Stop bits.
    #[serde(default)]
    pub stop_bits: StopBits,

    /// Unit ID / Slave address.
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Read/write operation timeout.
    #[serde(default = "default_operation_timeout")]
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,
}

impl ModbusRtuConfig {
    /// Baud rates a serial line can be opened at.
    pub const VALID_BAUD_RATES: &'static [u32] = &[
        1200, 2400, 4800, 9600, 14400, 19200, 38400, 57600, 115200,
    ];

    /// Creates a configuration for `port` at the SHT20 factory line
    /// settings, 9600 8N1.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    /// Sets the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Sets the unit id.
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    /// Returns the line settings in `9600 8N1` notation.
    pub fn line_settings(&self) -> String {
        format!(
            "{} {}{}{}",
            self.baud_rate, self.data_bits, self.parity, self.stop_bits
        )
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        if self.port.trim().is_empty() {
            return Err(ModbusError::configuration(ConfigurationError::missing_field(
                "port",
            )));
        }

        if !Self::VALID_BAUD_RATES.contains(&self.baud_rate) {
            return Err(ModbusError::configuration(
                ConfigurationError::InvalidBaudRate {
                    baud_rate: self.baud_rate,
                },
            ));
        }

        validate_unit_id(self.unit_id)?;
        validate_timeout("operation_timeout", self.operation_timeout)?;

        Ok(())
    }
}

impl Default for ModbusRtuConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud_rate(),
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            unit_id: default_unit_id(),
            operation_timeout: default_operation_timeout(),
        }
    }
}

// =============================================================================
// Serial Line Settings
// =============================================================================

/// Data bits configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataBits {
    /// 7 data bits.
    Seven,
    /// 8 data bits (default).
    #[default]
    Eight,
}

impl DataBits {
    /// Returns the number of bits.
    pub const fn bits(&self) -> u8 {
        match self {
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl fmt::Display for DataBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Parity configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// No parity (default).
    #[default]
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

impl Parity {
    /// Returns the short character representation.
    pub const fn char(&self) -> char {
        match self {
            Self::None => 'N',
            Self::Odd => 'O',
            Self::Even => 'E',
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// Stop bits configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    /// 1 stop bit (default).
    #[default]
    One,
    /// 2 stop bits.
    Two,
}

impl StopBits {
    /// Returns the number of stop bits.
    pub const fn bits(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

// =============================================================================
// ConnectionConfig
// =============================================================================

/// Link mode of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// Modbus TCP.
    Tcp,
    /// Modbus RTU over a serial line.
    Rtu,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Rtu => write!(f, "rtu"),
        }
    }
}

/// Connection configuration for one device, TCP or RTU.
///
/// Fixed for the lifetime of a session; a mode change requires a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionConfig {
    /// Modbus TCP configuration.
    Tcp(ModbusTcpConfig),

    /// Modbus RTU configuration.
    Rtu(ModbusRtuConfig),
}

impl ConnectionConfig {
    /// Returns the link mode.
    pub const fn mode(&self) -> ConnectionMode {
        match self {
            Self::Tcp(_) => ConnectionMode::Tcp,
            Self::Rtu(_) => ConnectionMode::Rtu,
        }
    }

    /// Returns the unit ID.
    pub fn unit_id(&self) -> u8 {
        match self {
            Self::Tcp(c) => c.unit_id,
            Self::Rtu(c) => c.unit_id,
        }
    }

    /// Replaces the unit ID.
    pub fn set_unit_id(&mut self, unit_id: u8) {
        match self {
            Self::Tcp(c) => c.unit_id = unit_id,
            Self::Rtu(c) => c.unit_id = unit_id,
        }
    }

    /// Returns the operation timeout.
    pub fn operation_timeout(&self) -> Duration {
        match self {
            Self::Tcp(c) => c.operation_timeout,
            Self::Rtu(c) => c.operation_timeout,
        }
    }

    /// Returns a short description of the link target.
    pub fn target(&self) -> String {
        match self {
            Self::Tcp(c) => c.socket_addr(),
            Self::Rtu(c) => format!("{} @{}bps", c.port, c.baud_rate),
        }
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        match self {
            Self::Tcp(c) => c.validate(),
            Self::Rtu(c) => c.validate(),
        }
    }

    /// Attempts to get the TCP configuration.
    pub fn as_tcp(&self) -> Option<&ModbusTcpConfig> {
        match self {
            Self::Tcp(c) => Some(c),
            _ => None,
        }
    }

    /// Attempts to get the RTU configuration.
    pub fn as_rtu(&self) -> Option<&ModbusRtuConfig> {
        match self {
            Self::Rtu(c) => Some(c),
            _ => None,
        }
    }
}

impl From<ModbusTcpConfig> for ConnectionConfig {
    fn from(config: ModbusTcpConfig) -> Self {
        Self::Tcp(config)
    }
}

impl From<ModbusRtuConfig> for ConnectionConfig {
    fn from(config: ModbusRtuConfig) -> Self {
        Self::Rtu(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_config_defaults() {
        let config = ModbusTcpConfig::new("192.168.1.50");
        assert_eq!(config.port, 502);
        assert_eq!(config.unit_id, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.operation_timeout, Duration::from_secs(3));
        assert_eq!(config.socket_addr(), "192.168.1.50:502");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tcp_host_validation() {
        assert!(ModbusTcpConfig::new("").validate().is_err());
        assert!(ModbusTcpConfig::new("bad host").validate().is_err());
        assert!(ModbusTcpConfig::new("sensor.local").with_port(0).validate().is_err());
        assert!(ModbusTcpConfig::new("sensor.local").with_port(5020).validate().is_ok());
    }

    #[test]
    fn test_unit_id_range() {
        for unit_id in [1, 100, 247] {
            let config = ModbusTcpConfig::new("sensor.local").with_unit_id(unit_id);
            assert!(config.validate().is_ok(), "unit id {} should be valid", unit_id);
        }
        for unit_id in [0, 248, 255] {
            let config = ModbusTcpConfig::new("sensor.local").with_unit_id(unit_id);
            assert!(config.validate().is_err(), "unit id {} should be rejected", unit_id);
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ModbusTcpConfig::new("10.0.0.5").with_operation_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rtu_factory_line_settings() {
        let config = ModbusRtuConfig::new("/dev/ttyUSB0").with_unit_id(5);

        assert!(config.validate().is_ok());
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.unit_id, 5);
        assert_eq!(config.line_settings(), "9600 8N1");
    }

    #[test]
    fn test_rtu_rejects_odd_baud_and_empty_port() {
        assert!(ModbusRtuConfig::new("/dev/ttyUSB0").with_baud_rate(9601).validate().is_err());
        assert!(ModbusRtuConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_connection_config_accessors() {
        let tcp = ConnectionConfig::from(ModbusTcpConfig::new("10.0.0.5"));
        assert_eq!(tcp.mode(), ConnectionMode::Tcp);
        assert_eq!(tcp.target(), "10.0.0.5:502");
        assert!(tcp.as_tcp().is_some());
        assert!(tcp.as_rtu().is_none());

        let rtu = ConnectionConfig::from(ModbusRtuConfig::new("/dev/ttyUSB0"));
        assert_eq!(rtu.mode(), ConnectionMode::Rtu);
        assert_eq!(rtu.target(), "/dev/ttyUSB0 @9600bps");
        assert_eq!(rtu.unit_id(), 1);
    }

    #[test]
    fn test_connection_config_serde_tagged() {
        let json = r#"{"type":"tcp","host":"10.0.0.5","connect_timeout":"500ms"}"#;
        let config: ConnectionConfig = serde_json::from_str(json).unwrap();
        let tcp = config.as_tcp().unwrap();
        assert_eq!(tcp.port, 502);
        assert_eq!(tcp.connect_timeout, Duration::from_millis(500));

        let json = r#"{"type":"rtu","port":"/dev/ttyUSB0","baud_rate":19200,"parity":"even"}"#;
        let config: ConnectionConfig = serde_json::from_str(json).unwrap();
        let rtu = config.as_rtu().unwrap();
        assert_eq!(rtu.baud_rate, 19200);
        assert_eq!(rtu.parity, Parity::Even);
    }

    #[test]
    fn test_register_type_display() {
        assert_eq!(RegisterType::InputRegister.to_string(), "input register");
        assert_eq!(RegisterType::HoldingRegister.read_function_code(), 0x03);
        assert_eq!(RegisterType::InputRegister.read_function_code(), 0x04);
    }
}

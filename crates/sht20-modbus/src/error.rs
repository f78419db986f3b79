// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the SHT20 Modbus core.
//!
//! Errors are layered the same way the code is:
//!
//! ```text
//! SensorReadError / SensorWriteError   - device adapter (operation context)
//! └── ModbusError
//!     ├── Transport     - link establishment and link loss
//!     ├── Read          - failed register reads (exception, timeout, drop)
//!     ├── Write         - failed register writes (exception, timeout, drop)
//!     └── Configuration - invalid settings or out-of-range values
//! ```
//!
//! # Examples
//!
//! ```
//! use sht20_modbus::error::{ModbusError, TransportError};
//!
//! let error = ModbusError::transport(TransportError::refused("192.168.1.50", 502));
//! assert!(error.is_retryable());
//! assert_eq!(error.category(), "transport");
//! ```

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

use crate::types::RegisterType;

// =============================================================================
// ModbusError - Main Error Type
// =============================================================================

/// The main error type for Transport Session operations.
#[derive(Debug, Error)]
pub enum ModbusError {
    /// Link establishment or link loss outside a request.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// A register read failed.
    #[error("{0}")]
    Read(#[from] ModbusReadError),

    /// A register write failed.
    #[error("{0}")]
    Write(#[from] ModbusWriteError),

    /// Invalid configuration or value.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl ModbusError {
    /// Creates a transport error.
    #[inline]
    pub fn transport(error: TransportError) -> Self {
        Self::Transport(error)
    }

    /// Creates a read error.
    #[inline]
    pub fn read(error: ModbusReadError) -> Self {
        Self::Read(error)
    }

    /// Creates a write error.
    #[inline]
    pub fn write(error: ModbusWriteError) -> Self {
        Self::Write(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a not connected error.
    pub fn not_connected() -> Self {
        Self::Transport(TransportError::NotConnected)
    }

    /// Returns `true` if a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::Read(e) => e.is_retryable(),
            Self::Write(e) => e.is_retryable(),
            Self::Configuration(_) => false,
        }
    }

    /// Returns the device exception code, if the device answered with one.
    pub fn exception_code(&self) -> Option<u8> {
        match self {
            Self::Read(ModbusReadError::Exception { exception_code, .. })
            | Self::Write(ModbusWriteError::Exception { exception_code, .. }) => {
                Some(*exception_code)
            }
            _ => None,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Transport(e) => e.severity(),
            Self::Read(_) | Self::Write(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Read(_) => "read",
            Self::Write(_) => "write",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Transport(e) => e.error_code(),
            Self::Read(e) => e.error_code(),
            Self::Write(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// TransportError
// =============================================================================

/// Link-level errors for TCP and RTU.
#[derive(Debug, Error)]
pub enum TransportError {
    /// TCP connection refused.
    #[error("Connection refused to {host}:{port}")]
    Refused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// Underlying error.
        #[source]
        source: Option<io::Error>,
    },

    /// Link setup did not complete in time.
    #[error("Connection to {target} timed out after {duration:?}")]
    TimedOut {
        /// Target description (`host:port` or serial device).
        target: String,
        /// Timeout duration.
        duration: Duration,
    },

    /// DNS resolution failed.
    #[error("Failed to resolve hostname '{hostname}'")]
    DnsResolutionFailed {
        /// The hostname that failed to resolve.
        hostname: String,
        /// Underlying error.
        #[source]
        source: Option<io::Error>,
    },

    /// Serial device not found (RTU).
    #[error("Serial device not found: {device}")]
    SerialDeviceNotFound {
        /// Device path.
        device: String,
    },

    /// Serial device access denied (RTU).
    #[error("Serial device access denied: {device}")]
    SerialAccessDenied {
        /// Device path.
        device: String,
    },

    /// Serial device could not be configured (RTU).
    #[error("Serial device configuration failed for '{device}': {message}")]
    SerialConfigurationFailed {
        /// Device path.
        device: String,
        /// Error message.
        message: String,
    },

    /// Not connected.
    #[error("Not connected to Modbus device")]
    NotConnected,

    /// Other I/O failure while establishing the link.
    #[error("I/O error connecting to {target}: {source}")]
    Io {
        /// Target description.
        target: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Creates a connection refused error.
    pub fn refused(host: impl Into<String>, port: u16) -> Self {
        Self::Refused {
            host: host.into(),
            port,
            source: None,
        }
    }

    /// Creates a connection refused error with source.
    pub fn refused_with(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        Self::Refused {
            host: host.into(),
            port,
            source: Some(source),
        }
    }

    /// Creates a link setup timeout error.
    pub fn timed_out(target: impl Into<String>, duration: Duration) -> Self {
        Self::TimedOut {
            target: target.into(),
            duration,
        }
    }

    /// Creates a DNS resolution failed error.
    pub fn dns_failed(hostname: impl Into<String>) -> Self {
        Self::DnsResolutionFailed {
            hostname: hostname.into(),
            source: None,
        }
    }

    /// Creates a serial device not found error.
    pub fn serial_not_found(device: impl Into<String>) -> Self {
        Self::SerialDeviceNotFound {
            device: device.into(),
        }
    }

    /// Creates a serial device access denied error.
    pub fn serial_access_denied(device: impl Into<String>) -> Self {
        Self::SerialAccessDenied {
            device: device.into(),
        }
    }

    /// Creates an I/O error for the given link target.
    pub fn io(target: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            target: target.into(),
            source,
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Refused { .. }
            | Self::TimedOut { .. }
            | Self::DnsResolutionFailed { .. }
            | Self::NotConnected
            | Self::Io { .. } => true,
            Self::SerialDeviceNotFound { .. }
            | Self::SerialAccessDenied { .. }
            | Self::SerialConfigurationFailed { .. } => false,
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotConnected | Self::TimedOut { .. } => ErrorSeverity::Warning,
            Self::SerialAccessDenied { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Refused { .. } => ErrorCode::new(1, 1),
            Self::TimedOut { .. } => ErrorCode::new(1, 2),
            Self::DnsResolutionFailed { .. } => ErrorCode::new(1, 3),
            Self::SerialDeviceNotFound { .. } => ErrorCode::new(1, 4),
            Self::SerialAccessDenied { .. } => ErrorCode::new(1, 5),
            Self::SerialConfigurationFailed { .. } => ErrorCode::new(1, 6),
            Self::NotConnected => ErrorCode::new(1, 7),
            Self::Io { .. } => ErrorCode::new(1, 8),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Refused { .. } => vec![
                "Check if the Modbus gateway is powered on",
                "Verify the IP address and port are correct",
            ],
            Self::TimedOut { .. } => vec![
                "Check network or RS-485 wiring to the sensor",
                "Increase the connection timeout setting",
            ],
            Self::DnsResolutionFailed { .. } => vec![
                "Verify the hostname is correct",
                "Try using an IP address instead",
            ],
            Self::SerialDeviceNotFound { .. } => vec![
                "Verify the serial device path is correct",
                "Check if the USB-to-RS485 adapter is connected",
            ],
            Self::SerialAccessDenied { .. } => vec![
                "Add user to the 'dialout' group on Linux",
                "Check device permissions",
            ],
            Self::SerialConfigurationFailed { .. } => vec![
                "Verify the baud rate matches the sensor setting",
            ],
            Self::NotConnected => vec!["Call connect() before performing operations"],
            Self::Io { .. } => vec!["Check network connectivity to the gateway"],
        }
    }
}

// =============================================================================
// ModbusReadError
// =============================================================================

/// Errors raised by register reads.
///
/// A read that fails never yields partial data.
#[derive(Debug, Error)]
pub enum ModbusReadError {
    /// The device answered with an exception response.
    #[error(
        "Device rejected read of {count} {register_type}(s) at {address}: exception {exception_code:#04x} ({exception_name})"
    )]
    Exception {
        /// Register type read.
        register_type: RegisterType,
        /// Start address.
        address: u16,
        /// Register count.
        count: u16,
        /// The exception code.
        exception_code: u8,
        /// Human-readable exception name.
        exception_name: &'static str,
    },

    /// No response within the operation timeout.
    #[error("Read of {count} {register_type}(s) at {address} timed out after {duration:?}")]
    Timeout {
        /// Register type read.
        register_type: RegisterType,
        /// Start address.
        address: u16,
        /// Register count.
        count: u16,
        /// Timeout duration.
        duration: Duration,
    },

    /// The transport failed while the request was in flight.
    #[error("Link lost while reading {count} {register_type}(s) at {address}: {source}")]
    LinkDropped {
        /// Register type read.
        register_type: RegisterType,
        /// Start address.
        address: u16,
        /// Register count.
        count: u16,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The response was malformed.
    #[error("Invalid response reading {register_type}(s) at {address}: {message}")]
    InvalidResponse {
        /// Register type read.
        register_type: RegisterType,
        /// Start address.
        address: u16,
        /// Description.
        message: String,
    },

    /// The device returned a different number of registers than requested.
    #[error("Short response reading {register_type}(s) at {address}: expected {expected}, got {actual}")]
    ShortResponse {
        /// Register type read.
        register_type: RegisterType,
        /// Start address.
        address: u16,
        /// Requested count.
        expected: u16,
        /// Received count.
        actual: usize,
    },

    /// The requested count is outside what one request can carry.
    #[error("Invalid read count {count} for {register_type} (allowed: 1-{max})")]
    InvalidCount {
        /// Register type read.
        register_type: RegisterType,
        /// Requested count.
        count: u16,
        /// Maximum allowed.
        max: u16,
    },
}

impl ModbusReadError {
    /// Creates an exception response error.
    pub fn exception(register_type: RegisterType, address: u16, count: u16, exception_code: u8) -> Self {
        Self::Exception {
            register_type,
            address,
            count,
            exception_code,
            exception_name: exception_name(exception_code),
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Exception { exception_code, .. } => exception_is_transient(*exception_code),
            Self::Timeout { .. } | Self::LinkDropped { .. } | Self::InvalidResponse { .. } => true,
            Self::ShortResponse { .. } => true,
            Self::InvalidCount { .. } => false,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Exception { exception_code, .. } => ErrorCode::new(2, *exception_code),
            Self::Timeout { .. } => ErrorCode::new(3, 1),
            Self::LinkDropped { .. } => ErrorCode::new(3, 2),
            Self::InvalidResponse { .. } => ErrorCode::new(3, 3),
            Self::ShortResponse { .. } => ErrorCode::new(3, 4),
            Self::InvalidCount { .. } => ErrorCode::new(3, 5),
        }
    }
}

// =============================================================================
// ModbusWriteError
// =============================================================================

/// Errors raised by register writes.
#[derive(Debug, Error)]
pub enum ModbusWriteError {
    /// The device answered with an exception response.
    #[error(
        "Device rejected write of {count} register(s) at {address}: exception {exception_code:#04x} ({exception_name})"
    )]
    Exception {
        /// Start address.
        address: u16,
        /// Register count.
        count: u16,
        /// The exception code.
        exception_code: u8,
        /// Human-readable exception name.
        exception_name: &'static str,
    },

    /// No response within the operation timeout.
    #[error("Write of {count} register(s) at {address} timed out after {duration:?}")]
    Timeout {
        /// Start address.
        address: u16,
        /// Register count.
        count: u16,
        /// Timeout duration.
        duration: Duration,
    },

    /// The transport failed while the request was in flight.
    #[error("Link lost while writing {count} register(s) at {address}: {source}")]
    LinkDropped {
        /// Start address.
        address: u16,
        /// Register count.
        count: u16,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The response was malformed.
    #[error("Invalid response writing register(s) at {address}: {message}")]
    InvalidResponse {
        /// Start address.
        address: u16,
        /// Description.
        message: String,
    },

    /// The value list is empty or longer than one request can carry.
    #[error("Invalid write count {count} (allowed: 1-{max})")]
    InvalidCount {
        /// Requested count.
        count: usize,
        /// Maximum allowed.
        max: u16,
    },
}

impl ModbusWriteError {
    /// Creates an exception response error.
    pub fn exception(address: u16, count: u16, exception_code: u8) -> Self {
        Self::Exception {
            address,
            count,
            exception_code,
            exception_name: exception_name(exception_code),
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Exception { exception_code, .. } => exception_is_transient(*exception_code),
            Self::Timeout { .. } | Self::LinkDropped { .. } | Self::InvalidResponse { .. } => true,
            Self::InvalidCount { .. } => false,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Exception { exception_code, .. } => ErrorCode::new(2, *exception_code),
            Self::Timeout { .. } => ErrorCode::new(4, 1),
            Self::LinkDropped { .. } => ErrorCode::new(4, 2),
            Self::InvalidResponse { .. } => ErrorCode::new(4, 3),
            Self::InvalidCount { .. } => ErrorCode::new(4, 4),
        }
    }
}

/// Returns the standard name of a Modbus exception code.
pub fn exception_name(code: u8) -> &'static str {
    match code {
        0x01 => "Illegal Function",
        0x02 => "Illegal Data Address",
        0x03 => "Illegal Data Value",
        0x04 => "Slave Device Failure",
        0x05 => "Acknowledge",
        0x06 => "Slave Device Busy",
        0x08 => "Memory Parity Error",
        0x0A => "Gateway Path Unavailable",
        0x0B => "Gateway Target Device Failed to Respond",
        _ => "Unknown Exception",
    }
}

fn exception_is_transient(code: u8) -> bool {
    matches!(code, 0x05 | 0x06 | 0x0A | 0x0B)
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration and value-range errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid host address.
    #[error("Invalid host address: {address} ({reason})")]
    InvalidHost {
        /// The invalid address.
        address: String,
        /// Reason.
        reason: String,
    },

    /// Invalid unit ID.
    #[error("Invalid unit ID: {unit_id} (valid range: 1-247)")]
    InvalidUnitId {
        /// The invalid unit ID.
        unit_id: u8,
    },

    /// Invalid baud rate.
    #[error("Invalid baud rate: {baud_rate}")]
    InvalidBaudRate {
        /// The invalid baud rate.
        baud_rate: u32,
    },

    /// Invalid timeout.
    #[error("Invalid timeout: {duration:?} ({reason})")]
    InvalidTimeout {
        /// The invalid duration.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// Missing required field.
    #[error("Missing required configuration: {field}")]
    MissingField {
        /// The missing field.
        field: String,
    },

    /// A value cannot be represented in its register.
    #[error("Value {value} for '{field}' is out of range ({reason})")]
    ValueOutOfRange {
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
        /// Reason.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid host error.
    pub fn invalid_host(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHost {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid unit ID error.
    pub fn invalid_unit_id(unit_id: u8) -> Self {
        Self::InvalidUnitId { unit_id }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Creates a value out of range error.
    pub fn out_of_range(
        field: impl Into<String>,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueOutOfRange {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidHost { .. } => ErrorCode::new(5, 1),
            Self::InvalidUnitId { .. } => ErrorCode::new(5, 2),
            Self::InvalidBaudRate { .. } => ErrorCode::new(5, 3),
            Self::InvalidTimeout { .. } => ErrorCode::new(5, 4),
            Self::MissingField { .. } => ErrorCode::new(5, 5),
            Self::ValueOutOfRange { .. } => ErrorCode::new(5, 6),
        }
    }
}

// =============================================================================
// Sensor errors (Device Adapter)
// =============================================================================

/// A Device Adapter read failed.
#[derive(Debug, Error)]
#[error("Failed to read SHT20 {operation}: {source}")]
pub struct SensorReadError {
    /// Adapter operation (`realtime` or `settings`).
    pub operation: &'static str,
    /// Underlying session error.
    #[source]
    pub source: ModbusError,
}

impl SensorReadError {
    /// Wraps a session error with the adapter operation name.
    pub fn new(operation: &'static str, source: impl Into<ModbusError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    /// Returns the underlying session error.
    pub fn modbus_error(&self) -> &ModbusError {
        &self.source
    }
}

/// A Device Adapter write failed.
///
/// Writes already acknowledged by the device before the failure are not
/// rolled back; `address` names the first register that was not written.
#[derive(Debug, Error)]
#[error("Failed to write SHT20 {operation} at register {address}: {source}")]
pub struct SensorWriteError {
    /// Adapter operation (`device settings` or `correction settings`).
    pub operation: &'static str,
    /// First register of the failed write.
    pub address: u16,
    /// Underlying session error.
    #[source]
    pub source: ModbusError,
}

impl SensorWriteError {
    /// Wraps a session error with the adapter operation name and register.
    pub fn new(operation: &'static str, address: u16, source: impl Into<ModbusError>) -> Self {
        Self {
            operation,
            address,
            source: source.into(),
        }
    }

    /// Returns the underlying session error.
    pub fn modbus_error(&self) -> &ModbusError {
        &self.source
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1=transport, 2=exception, 3=read, 4=write, 5=config).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHT-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// A Result type with ModbusError.
pub type ModbusResult<T> = Result<T, ModbusError>;

/// A Result type for adapter reads.
pub type SensorReadResult<T> = Result<T, SensorReadError>;

/// A Result type for adapter writes.
pub type SensorWriteResult<T> = Result<T, SensorWriteError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_retryable() {
        assert!(TransportError::refused("localhost", 502).is_retryable());
        assert!(TransportError::timed_out("localhost:502", Duration::from_secs(3)).is_retryable());
        assert!(TransportError::NotConnected.is_retryable());
        assert!(!TransportError::serial_access_denied("/dev/ttyUSB0").is_retryable());
        assert!(!TransportError::serial_not_found("/dev/ttyUSB9").is_retryable());
    }

    #[test]
    fn test_exception_names() {
        assert_eq!(exception_name(0x01), "Illegal Function");
        assert_eq!(exception_name(0x02), "Illegal Data Address");
        assert_eq!(exception_name(0x06), "Slave Device Busy");
        assert_eq!(exception_name(0x42), "Unknown Exception");
    }

    #[test]
    fn test_exception_retryable() {
        let busy = ModbusReadError::exception(RegisterType::HoldingRegister, 257, 4, 0x06);
        assert!(busy.is_retryable());

        let illegal = ModbusReadError::exception(RegisterType::HoldingRegister, 257, 4, 0x02);
        assert!(!illegal.is_retryable());

        let rejected = ModbusWriteError::exception(259, 2, 0x03);
        assert!(!rejected.is_retryable());
    }

    #[test]
    fn test_exception_code_accessor() {
        let error = ModbusError::read(ModbusReadError::exception(
            RegisterType::InputRegister,
            1,
            2,
            0x02,
        ));
        assert_eq!(error.exception_code(), Some(0x02));
        assert_eq!(ModbusError::not_connected().exception_code(), None);
    }

    #[test]
    fn test_error_code_display() {
        let code = ErrorCode::new(1, 5);
        assert_eq!(code.to_string(), "SHT-0105");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(ModbusError::not_connected().category(), "transport");
        assert_eq!(
            ModbusError::write(ModbusWriteError::exception(257, 1, 0x02)).category(),
            "write"
        );
        assert_eq!(
            ModbusError::configuration(ConfigurationError::invalid_unit_id(0)).category(),
            "configuration"
        );
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(TransportError::NotConnected.severity(), ErrorSeverity::Warning);
        assert_eq!(
            TransportError::serial_access_denied("/dev/ttyUSB0").severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_sensor_errors_keep_source() {
        let error = SensorReadError::new("realtime", TransportError::refused("10.0.0.5", 502));
        assert!(error.to_string().contains("realtime"));
        assert!(error.to_string().contains("10.0.0.5:502"));
        assert!(std::error::Error::source(&error).is_some());

        let error = SensorWriteError::new(
            "device settings",
            258,
            ModbusWriteError::exception(258, 1, 0x03),
        );
        assert_eq!(error.address, 258);
        assert_eq!(error.modbus_error().exception_code(), Some(0x03));
    }

    #[test]
    fn test_configuration_error_messages() {
        let error = ConfigurationError::invalid_unit_id(0);
        assert!(error.to_string().contains("1-247"));

        let error = ConfigurationError::out_of_range("temp_offset", 4000.0, "exceeds int16");
        assert!(error.to_string().contains("temp_offset"));
        assert!(error.to_string().contains("4000"));
    }
}

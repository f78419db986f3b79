// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types and exit codes for the sht20 binary.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 1    | Configuration invalid or missing                   |
//! | 2    | Startup failed (logging, signal handlers)          |
//! | 3    | Internal failure (output, unexpected errors)       |
//! | 4    | Local I/O failure                                  |
//! | 5    | Sensor unreachable (link could not be established) |
//! | 6    | Sensor read failed                                 |
//! | 7    | Sensor write failed                                |

use sht20_modbus::{ModbusError, SensorReadError, SensorWriteError};
use thiserror::Error;

/// Result type alias for sht20-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that end an sht20 command.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration rejected by the binary itself.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration file could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] sht20_config::ConfigError),

    /// Startup failure.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Internal failure.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading the sensor failed.
    #[error(transparent)]
    Read(#[from] SensorReadError),

    /// Writing the sensor failed.
    #[error(transparent)]
    Write(#[from] SensorWriteError),

    /// Another error with a description of what was being done.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being done.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Wraps this error with context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the Modbus error behind a sensor failure.
    pub fn modbus_error(&self) -> Option<&ModbusError> {
        match self {
            Self::Read(e) => Some(e.modbus_error()),
            Self::Write(e) => Some(e.modbus_error()),
            Self::WithContext { source, .. } => source.modbus_error(),
            _ => None,
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if let Some(ModbusError::Transport(_)) = self.modbus_error() {
            return 5;
        }
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Initialization(_) => 2,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Read(_) => 6,
            Self::Write(_) => 7,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }

    /// Returns operator hints for link failures.
    pub fn hints(&self) -> Vec<&'static str> {
        match self.modbus_error() {
            Some(ModbusError::Transport(e)) => e.recovery_hints(),
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error, its cause chain and any hints on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }

    for hint in error.hints() {
        eprintln!("  Hint: {}", hint);
    }
}

/// Reports an error and exits with its exit code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sht20_modbus::{ModbusReadError, RegisterType, TransportError};

    #[test]
    fn test_error_with_context() {
        let err = BinError::config("scan interval is zero").with_context("Loading sht20.yaml");
        assert_eq!(
            err.to_string(),
            "Loading sht20.yaml: Configuration error: scan interval is zero"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::init("test").exit_code(), 2);
        assert_eq!(BinError::runtime("test").exit_code(), 3);
        assert_eq!(BinError::from(std::io::Error::other("disk")).exit_code(), 4);

        let exception = ModbusReadError::exception(RegisterType::HoldingRegister, 257, 4, 0x02);
        assert_eq!(BinError::from(SensorReadError::new("settings", exception)).exit_code(), 6);

        let write = SensorWriteError::new("device settings", 258, ModbusError::not_connected());
        assert_eq!(BinError::from(write).exit_code(), 5);
    }

    #[test]
    fn test_unreachable_sensor_has_hints() {
        let read = SensorReadError::new("realtime", TransportError::refused("10.0.0.5", 502));
        let err = BinError::from(read).with_context("Polling greenhouse");

        assert_eq!(err.exit_code(), 5);
        assert!(err.hints().iter().any(|h| h.contains("IP address")));
        assert!(BinError::runtime("x").hints().is_empty());
    }

    #[test]
    fn test_sensor_error_keeps_cause_chain() {
        let read = SensorReadError::new("settings", TransportError::refused("10.0.0.5", 502));
        let err = BinError::from(read);

        let mut depth = 0;
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            depth += 1;
            source = cause.source();
        }
        assert!(depth >= 1);
    }
}

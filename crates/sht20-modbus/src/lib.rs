// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sht20-modbus
//!
//! Modbus TCP/RTU access to the SHT20 temperature and humidity sensor.
//!
//! The crate is two layers:
//!
//! - **Transport Session** ([`client`]): connection lifecycle plus register
//!   read/write primitives over TCP or a serial line
//! - **Device Adapter** ([`device`]): the fixed SHT20 register map,
//!   translated into realtime readings, device settings and calibration
//!   offsets
//!
//! A host (the `sht20` binary, or any other scheduler) owns the polling
//! interval and calls the adapter; the adapter calls the session.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sht20_modbus::{ConnectionConfig, ModbusRtuConfig, Sht20Device};
//!
//! let config = ModbusRtuConfig::new("/dev/ttyUSB0").with_unit_id(1);
//! config.validate()?;
//!
//! let mut device = Sht20Device::new(ConnectionConfig::from(config));
//!
//! let reading = device.read_realtime().await?;
//! let settings = device.read_settings().await?;
//! println!("{reading} ({settings})");
//! ```
//!
//! ### Error Handling
//!
//! ```rust,ignore
//! use sht20_modbus::SensorReadError;
//!
//! fn report(error: &SensorReadError) {
//!     let cause = error.modbus_error();
//!     cause.log(error.operation);
//!     if cause.is_retryable() {
//!         println!("will try again on the next poll");
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `testing`: exposes [`testing::MockTransport`], an in-memory SHT20

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod client;
pub mod device;
pub mod error;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// =============================================================================
// Re-exports - Error Module
// =============================================================================

pub use error::{
    // Main error type
    ModbusError,
    ModbusResult,
    // Error categories
    ConfigurationError,
    ModbusReadError,
    ModbusWriteError,
    TransportError,
    // Adapter errors
    SensorReadError,
    SensorReadResult,
    SensorWriteError,
    SensorWriteResult,
    // Error metadata
    ErrorCode,
    ErrorSeverity,
};

// =============================================================================
// Re-exports - Types Module
// =============================================================================

pub use types::{
    ConnectionConfig, ConnectionMode, DataBits, ModbusRtuConfig, ModbusTcpConfig, Parity,
    RegisterType, StopBits,
};

// =============================================================================
// Re-exports - Client and Device Modules
// =============================================================================

pub use client::{
    ModbusRtuTransport, ModbusSession, ModbusTcpTransport, ModbusTransport, SerialPortEntry,
    SessionStats, TransportState, available_serial_ports,
};

pub use device::{CorrectionSettings, DeviceSettings, RealtimeReading, Sht20Device};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus RTU transport implementation.
//!
//! This module provides the RTU (serial) transport for Modbus communication
//! using the `tokio-modbus` and `tokio-serial` crates.
//!
//! # Example
//!
//! ```rust,ignore
//! use sht20_modbus::client::{ModbusRtuTransport, ModbusTransport};
//! use sht20_modbus::types::ModbusRtuConfig;
//!
//! let mut transport = ModbusRtuTransport::new(ModbusRtuConfig::new("/dev/ttyUSB0"));
//! transport.connect().await?;
//!
//! let values = transport.read_holding_registers(257, 4, 1).await?;
//! ```

use async_trait::async_trait;
use serde::Serialize;
use tokio_modbus::prelude::*;
use tokio_serial::{
    DataBits as SerialDataBits, Parity as SerialParity, SerialPortBuilderExt, SerialPortInfo,
    SerialPortType, SerialStream, StopBits as SerialStopBits,
};

use crate::error::{ModbusError, ModbusResult, TransportError};
use crate::types::{DataBits, ModbusRtuConfig, Parity, RegisterType, StopBits};

use super::link::ContextLink;
use super::transport::{ModbusTransport, TransportState};

// =============================================================================
// Serial port discovery
// =============================================================================

/// A serial device present on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialPortEntry {
    /// Device path, usable as [`ModbusRtuConfig::port`].
    pub path: String,
    /// How the port is attached: `usb`, `pci`, `bluetooth` or `unknown`.
    pub kind: &'static str,
    /// USB product or manufacturer string, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<SerialPortInfo> for SerialPortEntry {
    fn from(info: SerialPortInfo) -> Self {
        let (kind, description) = match info.port_type {
            SerialPortType::UsbPort(usb) => ("usb", usb.product.or(usb.manufacturer)),
            SerialPortType::PciPort => ("pci", None),
            SerialPortType::BluetoothPort => ("bluetooth", None),
            SerialPortType::Unknown => ("unknown", None),
        };
        Self {
            path: info.port_name,
            kind,
            description,
        }
    }
}

/// Lists the serial ports present on the host, sorted by path.
///
/// A listed port is not guaranteed to open; an empty list is not an error.
pub fn available_serial_ports() -> ModbusResult<Vec<SerialPortEntry>> {
    let ports = tokio_serial::available_ports().map_err(|e| {
        ModbusError::transport(TransportError::io("serial port enumeration", e.into()))
    })?;

    let mut entries: Vec<SerialPortEntry> = ports.into_iter().map(SerialPortEntry::from).collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

// =============================================================================
// ModbusRtuTransport
// =============================================================================

/// Modbus RTU transport using tokio-modbus over a serial line.
///
/// Opening the serial device is the whole of link setup; there is no
/// handshake, so a wrong baud rate or unit id only shows up as request
/// timeouts.
pub struct ModbusRtuTransport {
    config: ModbusRtuConfig,
    link: ContextLink,
    state: TransportState,
}

impl ModbusRtuTransport {
    /// Creates a new RTU transport with the given configuration.
    pub fn new(config: ModbusRtuConfig) -> Self {
        let link = ContextLink::new(config.operation_timeout);
        Self {
            config,
            link,
            state: TransportState::Disconnected,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ModbusRtuConfig {
        &self.config
    }

    /// Returns the serial device path.
    pub fn port(&self) -> &str {
        &self.config.port
    }

    /// Converts DataBits to tokio-serial DataBits.
    fn convert_data_bits(bits: DataBits) -> SerialDataBits {
        match bits {
            DataBits::Seven => SerialDataBits::Seven,
            DataBits::Eight => SerialDataBits::Eight,
        }
    }

    /// Converts Parity to tokio-serial Parity.
    fn convert_parity(parity: Parity) -> SerialParity {
        match parity {
            Parity::None => SerialParity::None,
            Parity::Odd => SerialParity::Odd,
            Parity::Even => SerialParity::Even,
        }
    }

    /// Converts StopBits to tokio-serial StopBits.
    fn convert_stop_bits(bits: StopBits) -> SerialStopBits {
        match bits {
            StopBits::One => SerialStopBits::One,
            StopBits::Two => SerialStopBits::Two,
        }
    }

    fn open_serial(&self) -> ModbusResult<SerialStream> {
        tokio_serial::new(&self.config.port, self.config.baud_rate)
            .data_bits(Self::convert_data_bits(self.config.data_bits))
            .parity(Self::convert_parity(self.config.parity))
            .stop_bits(Self::convert_stop_bits(self.config.stop_bits))
            .open_native_async()
            .map_err(|e| ModbusError::transport(self.map_serial_error(e)))
    }

    fn map_serial_error(&self, error: tokio_serial::Error) -> TransportError {
        let device = &self.config.port;
        match error.kind {
            tokio_serial::ErrorKind::NoDevice => TransportError::serial_not_found(device),
            tokio_serial::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
                TransportError::serial_not_found(device)
            }
            tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                TransportError::serial_access_denied(device)
            }
            _ => TransportError::SerialConfigurationFailed {
                device: device.clone(),
                message: error.to_string(),
            },
        }
    }
}

#[async_trait]
impl ModbusTransport for ModbusRtuTransport {
    async fn connect(&mut self) -> ModbusResult<()> {
        if self.state == TransportState::Connected && self.link.is_attached() {
            return Ok(());
        }

        self.state = TransportState::Connecting;

        let serial = match self.open_serial() {
            Ok(serial) => serial,
            Err(e) => {
                self.state = TransportState::Disconnected;
                return Err(e);
            }
        };

        self.link
            .attach(rtu::attach_slave(serial, Slave(self.config.unit_id)));
        self.state = TransportState::Connected;

        tracing::info!(
            port = %self.config.port,
            baud_rate = self.config.baud_rate,
            line = %self.config.line_settings(),
            unit_id = self.config.unit_id,
            "Connected to Modbus RTU device"
        );

        Ok(())
    }

    async fn disconnect(&mut self) -> ModbusResult<()> {
        if !self.link.is_attached() && self.state == TransportState::Disconnected {
            return Ok(());
        }

        self.link.detach().await;
        self.state = TransportState::Disconnected;

        tracing::debug!(port = %self.config.port, "Disconnected from Modbus RTU device");

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state == TransportState::Connected
    }

    fn state(&self) -> TransportState {
        self.state
    }

    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.link
            .read(RegisterType::InputRegister, address, count, unit)
            .await
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.link
            .read(RegisterType::HoldingRegister, address, count, unit)
            .await
    }

    async fn write_single_register(
        &mut self,
        address: u16,
        value: u16,
        unit: u8,
    ) -> ModbusResult<()> {
        self.link.write_single(address, value, unit).await
    }

    async fn write_multiple_registers(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> ModbusResult<()> {
        self.link.write_multiple(address, values, unit).await
    }

    fn display_name(&self) -> String {
        format!(
            "Modbus RTU {} @{}bps (unit {})",
            self.config.port, self.config.baud_rate, self.config.unit_id
        )
    }
}

impl std::fmt::Debug for ModbusRtuTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusRtuTransport")
            .field("port", &self.config.port)
            .field("baud_rate", &self.config.baud_rate)
            .field("unit_id", &self.config.unit_id)
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract link layer for Modbus communication.
//!
//! This module defines the [`ModbusTransport`] trait that provides a
//! unified interface for the TCP and RTU links. Register addressing, byte
//! order and unit-id framing are identical on both; only link
//! establishment differs.

use async_trait::async_trait;
use std::fmt;

use crate::error::ModbusResult;

// =============================================================================
// TransportState
// =============================================================================

/// Connection state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportState {
    /// No link; the next operation connects on demand.
    #[default]
    Disconnected,
    /// Link setup in progress.
    Connecting,
    /// Link established and ready.
    Connected,
}

impl TransportState {
    /// Returns `true` if the transport is connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the transport is in a transitional state.
    pub fn is_transitional(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// ModbusTransport Trait
// =============================================================================

/// Abstract link layer for Modbus communication.
///
/// # Implementors
///
/// - [`ModbusTcpTransport`](super::tcp::ModbusTcpTransport): Modbus TCP
/// - [`ModbusRtuTransport`](super::rtu::ModbusRtuTransport): Modbus RTU
/// - `MockTransport` (feature `testing`): in-memory SHT20
///
/// Every operation takes `&mut self`; a transport carries at most one
/// request at a time, so implementations need only be `Send`. Read and
/// write operations apply the configured operation timeout and report
/// failures as
/// [`ModbusReadError`](crate::error::ModbusReadError) /
/// [`ModbusWriteError`](crate::error::ModbusWriteError).
#[async_trait]
pub trait ModbusTransport: Send {
    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Establishes the link to the device.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the link cannot be established within
    /// the connect timeout.
    async fn connect(&mut self) -> ModbusResult<()>;

    /// Releases the link. A no-op when already disconnected.
    async fn disconnect(&mut self) -> ModbusResult<()>;

    /// Returns `true` if the link is established.
    fn is_connected(&self) -> bool;

    /// Returns the current transport state.
    fn state(&self) -> TransportState;

    // =========================================================================
    // Register Operations (Function Codes 3, 4, 6, 16)
    // =========================================================================

    /// Reads input registers (FC 04).
    ///
    /// # Arguments
    ///
    /// * `address` - Starting register address (0-based PDU address)
    /// * `count` - Number of registers to read
    /// * `unit` - Unit id addressed by this request
    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>>;

    /// Reads holding registers (FC 03).
    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>>;

    /// Writes a single holding register (FC 06).
    async fn write_single_register(&mut self, address: u16, value: u16, unit: u8)
    -> ModbusResult<()>;

    /// Writes multiple holding registers (FC 16).
    async fn write_multiple_registers(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> ModbusResult<()>;

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Returns a display name for this transport.
    fn display_name(&self) -> String;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Connected.is_connected());
        assert!(!TransportState::Disconnected.is_connected());
        assert!(TransportState::Connecting.is_transitional());
        assert!(!TransportState::Connected.is_transitional());
        assert_eq!(TransportState::default(), TransportState::Disconnected);
    }

    #[test]
    fn test_transport_state_display() {
        assert_eq!(TransportState::Connected.to_string(), "connected");
        assert_eq!(TransportState::Connecting.to_string(), "connecting");
        assert_eq!(TransportState::Disconnected.to_string(), "disconnected");
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus TCP transport implementation.
//!
//! This module provides the TCP transport for Modbus communication using
//! the `tokio-modbus` crate as the underlying implementation.

use std::io;
use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_modbus::client::Context as ModbusContext;
use tokio_modbus::prelude::*;

use crate::error::{ModbusError, ModbusResult, TransportError};
use crate::types::{ModbusTcpConfig, RegisterType};

use super::link::ContextLink;
use super::transport::{ModbusTransport, TransportState};

// =============================================================================
// ModbusTcpTransport
// =============================================================================

/// Modbus TCP transport using tokio-modbus.
///
/// Accepts an IP address or a hostname; hostnames are resolved on every
/// connect attempt.
///
/// # Example
///
/// ```rust,ignore
/// use sht20_modbus::client::{ModbusTcpTransport, ModbusTransport};
/// use sht20_modbus::types::ModbusTcpConfig;
///
/// let mut transport = ModbusTcpTransport::new(ModbusTcpConfig::new("192.168.1.50"));
/// transport.connect().await?;
///
/// let values = transport.read_input_registers(1, 2, 1).await?;
/// ```
pub struct ModbusTcpTransport {
    config: ModbusTcpConfig,
    link: ContextLink,
    state: TransportState,
}

impl ModbusTcpTransport {
    /// Creates a new TCP transport with the given configuration.
    pub fn new(config: ModbusTcpConfig) -> Self {
        let link = ContextLink::new(config.operation_timeout);
        Self {
            config,
            link,
            state: TransportState::Disconnected,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ModbusTcpConfig {
        &self.config
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }
}

/// Resolves the socket address.
async fn resolve_address(config: &ModbusTcpConfig) -> ModbusResult<SocketAddr> {
    let addr_str = config.socket_addr();

    if let Ok(addr) = addr_str.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // IPv6 literals need brackets in `host:port` form
    if let Ok(ip) = config.host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, config.port));
    }

    let mut addrs = tokio::net::lookup_host(&addr_str).await.map_err(|e| {
        ModbusError::transport(TransportError::DnsResolutionFailed {
            hostname: config.host.clone(),
            source: Some(e),
        })
    })?;

    addrs
        .next()
        .ok_or_else(|| ModbusError::transport(TransportError::dns_failed(&config.host)))
}

fn map_connect_error(config: &ModbusTcpConfig, error: io::Error) -> ModbusError {
    let error = match error.kind() {
        io::ErrorKind::ConnectionRefused => {
            TransportError::refused_with(&config.host, config.port, error)
        }
        io::ErrorKind::TimedOut => {
            TransportError::timed_out(config.socket_addr(), config.connect_timeout)
        }
        _ => TransportError::io(config.socket_addr(), error),
    };
    ModbusError::transport(error)
}

/// Resolves, connects and attaches a Modbus TCP context within the connect timeout.
async fn open_context(config: &ModbusTcpConfig) -> ModbusResult<ModbusContext> {
    let open = async {
        let socket_addr = resolve_address(config).await?;
        let stream = TcpStream::connect(socket_addr)
            .await
            .map_err(|e| map_connect_error(config, e))?;
        stream.set_nodelay(true).ok();
        Ok::<_, ModbusError>(tcp::attach_slave(stream, Slave(config.unit_id)))
    };

    timeout(config.connect_timeout, open).await.map_err(|_| {
        ModbusError::transport(TransportError::timed_out(
            config.socket_addr(),
            config.connect_timeout,
        ))
    })?
}

#[async_trait]
impl ModbusTransport for ModbusTcpTransport {
    async fn connect(&mut self) -> ModbusResult<()> {
        if self.state == TransportState::Connected && self.link.is_attached() {
            return Ok(());
        }

        self.state = TransportState::Connecting;

        let result = open_context(&self.config).await;

        match result {
            Ok(ctx) => {
                self.link.attach(ctx);
                self.state = TransportState::Connected;

                tracing::info!(
                    host = %self.config.host,
                    port = self.config.port,
                    unit_id = self.config.unit_id,
                    "Connected to Modbus TCP device"
                );
                Ok(())
            }
            Err(e) => {
                self.state = TransportState::Disconnected;
                Err(e)
            }
        }
    }

    async fn disconnect(&mut self) -> ModbusResult<()> {
        if !self.link.is_attached() && self.state == TransportState::Disconnected {
            return Ok(());
        }

        self.link.detach().await;
        self.state = TransportState::Disconnected;

        tracing::debug!(
            host = %self.config.host,
            port = self.config.port,
            "Disconnected from Modbus TCP device"
        );

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
            "Modbus TCP {}:{} (unit {})",
            self.config.host, self.config.port, self.config.unit_id
        )
    }
}

impl std::fmt::Debug for ModbusTcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusTcpTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("unit_id", &self.config.unit_id)
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

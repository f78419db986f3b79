// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transport Session: connection lifecycle plus register primitives.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Sht20Device                              │
//! │                (register map <-> domain values)                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       ModbusSession                             │
//! │     (connect/close, count + length checks, reset on failure)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     ModbusTransport                             │
//! │                 (abstract link layer)                           │
//! └─────────────────────────────────────────────────────────────────┘
//!            │                                     │
//!            ▼                                     ▼
//! ┌─────────────────────┐             ┌─────────────────────┐
//! │  ModbusTcpTransport │             │  ModbusRtuTransport │
//! │   (tokio-modbus)    │             │   (tokio-serial)    │
//! └─────────────────────┘             └─────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use sht20_modbus::client::ModbusSession;
//! use sht20_modbus::types::{ConnectionConfig, ModbusTcpConfig};
//!
//! let config = ConnectionConfig::from(ModbusTcpConfig::new("192.168.1.50"));
//! let mut session = ModbusSession::from_config(&config);
//!
//! session.connect().await?;
//! let raw = session.read_input_registers(1, 2, 1).await?;
//! session.close().await?;
//! ```

mod link;
mod rtu;
mod tcp;
mod transport;

pub use rtu::{ModbusRtuTransport, SerialPortEntry, available_serial_ports};
pub use tcp::ModbusTcpTransport;
pub use transport::{ModbusTransport, TransportState};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{
    ConfigurationError, ModbusError, ModbusReadError, ModbusResult, ModbusWriteError,
};
use crate::types::{ConnectionConfig, MAX_UNIT_ID, MIN_UNIT_ID, RegisterType};

// =============================================================================
// ModbusSession
// =============================================================================

/// One logical Modbus connection to one device.
///
/// The link is chosen at construction time and never changes. Register
/// operations require a connected session; any failed register operation
/// drops the link so the next `connect()` starts from a clean state.
pub struct ModbusSession {
    transport: Box<dyn ModbusTransport>,
    stats: SessionStats,
}

impl ModbusSession {
    /// Creates a session over the given transport.
    pub fn new<T>(transport: T) -> Self
    where
        T: ModbusTransport + 'static,
    {
        Self {
            transport: Box::new(transport),
            stats: SessionStats::new(),
        }
    }

    /// Creates a session for the configured link (TCP or RTU).
    pub fn from_config(config: &ConnectionConfig) -> Self {
        match config {
            ConnectionConfig::Tcp(c) => Self::new(ModbusTcpTransport::new(c.clone())),
            ConnectionConfig::Rtu(c) => Self::new(ModbusRtuTransport::new(c.clone())),
        }
    }

    /// Returns the session statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Returns the current link state.
    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// Returns `true` if the link is established.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Returns a display name for the underlying link.
    pub fn display_name(&self) -> String {
        self.transport.display_name()
    }

    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Establishes the link if not already connected.
    ///
    /// Connecting an already-connected session performs no link setup.
    pub async fn connect(&mut self) -> ModbusResult<()> {
        if self.transport.is_connected() {
            return Ok(());
        }

        match self.transport.connect().await {
            Ok(()) => {
                self.stats.record_connection();
                Ok(())
            }
            Err(error) => {
                error.log("connect");
                Err(error)
            }
        }
    }

    /// Releases the link. A no-op when not connected.
    pub async fn close(&mut self) -> ModbusResult<()> {
        if self.transport.state() == TransportState::Disconnected {
            return Ok(());
        }
        self.transport.disconnect().await
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Reads exactly `count` input registers starting at `address`.
    pub async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.read(RegisterType::InputRegister, address, count, unit)
            .await
    }

    /// Reads exactly `count` holding registers starting at `address`.
    pub async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.read(RegisterType::HoldingRegister, address, count, unit)
            .await
    }

    async fn read(
        &mut self,
        register_type: RegisterType,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        validate_unit(unit)?;
        validate_read_count(register_type, count)?;
        self.ensure_connected()?;

        let started = Instant::now();
        let result = match register_type {
            RegisterType::InputRegister => {
                self.transport
                    .read_input_registers(address, count, unit)
                    .await
            }
            RegisterType::HoldingRegister => {
                self.transport
                    .read_holding_registers(address, count, unit)
                    .await
            }
        };

        // No partial data: a short or long response is a failed read.
        let result = result.and_then(|values| {
            if values.len() == usize::from(count) {
                Ok(values)
            } else {
                Err(ModbusReadError::ShortResponse {
                    register_type,
                    address,
                    expected: count,
                    actual: values.len(),
                }
                .into())
            }
        });

        tracing::trace!(
            register_type = %register_type,
            address,
            count,
            unit,
            ok = result.is_ok(),
            "Modbus read"
        );

        self.complete(started, result).await
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Writes one holding register (FC 06).
    pub async fn write_register(&mut self, address: u16, value: u16, unit: u8) -> ModbusResult<()> {
        validate_unit(unit)?;
        self.ensure_connected()?;

        let started = Instant::now();
        let result = self
            .transport
            .write_single_register(address, value, unit)
            .await;

        tracing::trace!(address, value, unit, ok = result.is_ok(), "Modbus write");

        self.complete(started, result).await
    }

    /// Writes consecutive holding registers starting at `address` (FC 16).
    pub async fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> ModbusResult<()> {
        validate_unit(unit)?;

        let max = RegisterType::max_write_count();
        if values.is_empty() || values.len() > usize::from(max) {
            return Err(ModbusWriteError::InvalidCount {
                count: values.len(),
                max,
            }
            .into());
        }

        self.ensure_connected()?;

        let started = Instant::now();
        let result = self
            .transport
            .write_multiple_registers(address, values, unit)
            .await;

        tracing::trace!(
            address,
            count = values.len(),
            unit,
            ok = result.is_ok(),
            "Modbus write"
        );

        self.complete(started, result).await
    }

    // =========================================================================
    // Private Methods
    // =========================================================================

    fn ensure_connected(&self) -> ModbusResult<()> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            Err(ModbusError::not_connected())
        }
    }

    /// Records the outcome and drops the link after a failure.
    async fn complete<T>(&mut self, started: Instant, result: ModbusResult<T>) -> ModbusResult<T> {
        match result {
            Ok(value) => {
                self.stats.record_success(started.elapsed());
                Ok(value)
            }
            Err(error) => {
                self.stats.record_error();
                self.reset_link(&error).await;
                Err(error)
            }
        }
    }

    async fn reset_link(&mut self, cause: &ModbusError) {
        tracing::debug!(
            link = %self.transport.display_name(),
            error = %cause,
            "Resetting Modbus link after failed operation"
        );

        if let Err(e) = self.transport.disconnect().await {
            tracing::warn!(error = %e, "Error while resetting Modbus link");
        }
        self.stats.record_reset();
    }
}

impl fmt::Debug for ModbusSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModbusSession")
            .field("link", &self.transport.display_name())
            .field("state", &self.transport.state())
            .field("stats", &self.stats)
            .finish()
    }
}

fn validate_unit(unit: u8) -> ModbusResult<()> {
    if !(MIN_UNIT_ID..=MAX_UNIT_ID).contains(&unit) {
        return Err(ModbusError::configuration(
            ConfigurationError::invalid_unit_id(unit),
        ));
    }
    Ok(())
}

fn validate_read_count(register_type: RegisterType, count: u16) -> ModbusResult<()> {
    let max = register_type.max_read_count();
    if count == 0 || count > max {
        return Err(ModbusReadError::InvalidCount {
            register_type,
            count,
            max,
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// SessionStats
// =============================================================================

/// Statistics for session operations.
#[derive(Debug)]
pub struct SessionStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time_us: AtomicU64,
    connections: AtomicU64,
    link_resets: AtomicU64,
}

impl SessionStats {
    /// Creates new statistics.
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            connections: AtomicU64::new(0),
            link_resets: AtomicU64::new(0),
        }
    }

    /// Records a successful operation.
    pub fn record_success(&self, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Records a failed operation.
    pub fn record_error(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an established link.
    pub fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a link reset after a failure.
    pub fn record_reset(&self) {
        self.link_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of requests.
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Returns the number of successful requests.
    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
    }

    /// Returns the number of failed requests.
    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    /// Returns the success rate (0.0 - 1.0).
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 1.0;
        }
        self.successful_requests() as f64 / total as f64
    }

    /// Returns the average response time.
    pub fn average_response_time(&self) -> Duration {
        let success = self.successful_requests();
        if success == 0 {
            return Duration::ZERO;
        }
        let total_us = self.total_response_time_us.load(Ordering::Relaxed);
        Duration::from_micros(total_us / success)
    }

    /// Returns the number of links established.
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Returns the number of link resets.
    pub fn link_resets(&self) -> u64 {
        self.link_resets.load(Ordering::Relaxed)
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::MockTransport;

    fn session() -> (ModbusSession, MockTransport) {
        let mock = MockTransport::new();
        (ModbusSession::new(mock.clone()), mock)
    }

    #[test]
    fn test_session_stats() {
        let stats = SessionStats::new();

        stats.record_success(Duration::from_millis(10));
        stats.record_success(Duration::from_millis(20));
        stats.record_error();

        assert_eq!(stats.total_requests(), 3);
        assert_eq!(stats.successful_requests(), 2);
        assert_eq!(stats.failed_requests(), 1);
        assert!((stats.success_rate() - 0.666).abs() < 0.01);
        assert_eq!(stats.average_response_time(), Duration::from_millis(15));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let (mut session, mock) = session();

        session.connect().await.unwrap();
        session.connect().await.unwrap();

        assert_eq!(mock.connect_count(), 1);
        assert_eq!(session.stats().connections(), 1);
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_close_when_disconnected_is_noop() {
        let (mut session, mock) = session();
        session.close().await.unwrap();
        assert_eq!(mock.disconnect_count(), 0);

        session.connect().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(mock.disconnect_count(), 1);
        assert_eq!(session.state(), TransportState::Disconnected);
    }

    #[tokio::test]
    async fn test_read_requires_connection() {
        let (mut session, mock) = session();
        let error = session.read_input_registers(1, 2, 1).await.unwrap_err();

        assert!(matches!(error, ModbusError::Transport(TransportError::NotConnected)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_read_returns_exact_count() {
        let (mut session, mock) = session();
        mock.set_input_registers(1, &[212, 503]);

        session.connect().await.unwrap();
        let values = session.read_input_registers(1, 2, 1).await.unwrap();

        assert_eq!(values, vec![212, 503]);
    }

    #[tokio::test]
    async fn test_short_response_is_rejected_and_resets_link() {
        let (mut session, mock) = session();
        mock.set_holding_registers(257, &[5, 9600, 0, 0]);
        mock.truncate_responses_to(2);

        session.connect().await.unwrap();
        let error = session.read_holding_registers(257, 4, 1).await.unwrap_err();

        assert!(matches!(
            error,
            ModbusError::Read(ModbusReadError::ShortResponse {
                expected: 4,
                actual: 2,
                ..
            })
        ));
        assert_eq!(session.state(), TransportState::Disconnected);
        assert_eq!(session.stats().link_resets(), 1);
    }

    #[tokio::test]
    async fn test_exception_resets_link_and_reconnects() {
        let (mut session, mock) = session();
        mock.set_input_registers(1, &[212, 503]);
        mock.fail_next_with_exception(0x02);

        session.connect().await.unwrap();
        let error = session.read_input_registers(1, 2, 1).await.unwrap_err();
        assert_eq!(error.exception_code(), Some(0x02));
        assert!(!session.is_connected());

        session.connect().await.unwrap();
        assert_eq!(session.read_input_registers(1, 2, 1).await.unwrap(), vec![212, 503]);
        assert_eq!(mock.connect_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_counts_fail_before_io() {
        let (mut session, mock) = session();
        session.connect().await.unwrap();

        let error = session.read_input_registers(1, 0, 1).await.unwrap_err();
        assert!(matches!(error, ModbusError::Read(ModbusReadError::InvalidCount { .. })));

        let error = session.read_holding_registers(0, 126, 1).await.unwrap_err();
        assert!(matches!(error, ModbusError::Read(ModbusReadError::InvalidCount { .. })));

        let error = session.write_registers(259, &[], 1).await.unwrap_err();
        assert!(matches!(error, ModbusError::Write(ModbusWriteError::InvalidCount { .. })));

        let error = session.write_register(257, 1, 0).await.unwrap_err();
        assert_eq!(error.category(), "configuration");

        assert_eq!(mock.request_count(), 0);
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_writes_reach_device() {
        let (mut session, mock) = session();
        session.connect().await.unwrap();

        session.write_register(257, 5, 1).await.unwrap();
        session.write_registers(259, &[25, 0xFFF3], 1).await.unwrap();

        assert_eq!(mock.holding_register(257), Some(5));
        assert_eq!(mock.holding_register(259), Some(25));
        assert_eq!(mock.holding_register(260), Some(0xFFF3));
        assert_eq!(mock.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_link_drop_during_write() {
        let (mut session, mock) = session();
        session.connect().await.unwrap();
        mock.drop_link_on_next_request();

        let error = session.write_register(258, 9600, 1).await.unwrap_err();
        assert!(matches!(
            error,
            ModbusError::Write(ModbusWriteError::LinkDropped { address: 258, .. })
        ));
        assert!(!session.is_connected());
    }

    #[test]
    fn test_debug_impl() {
        let (session, _mock) = session();
        let debug_str = format!("{:?}", session);
        assert!(debug_str.contains("ModbusSession"));
        assert!(debug_str.contains("disconnected") || debug_str.contains("Disconnected"));
    }
}

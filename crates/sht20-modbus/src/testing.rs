// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Transport
//!
//! An in-memory SHT20 behind the [`ModbusTransport`] trait, for exercising
//! sessions and the device adapter without hardware.
//!
//! - Input and holding register maps, pre-loaded with factory values
//! - Counters for connects, disconnects and requests
//! - A log of every write that reached the device
//! - Error injection: exception responses, timeouts, link drops,
//!   truncated responses and connect failures
//!
//! Clones share state, so a test keeps one handle for inspection while the
//! session owns another.
//!
//! ```rust,ignore
//! use sht20_modbus::testing::MockTransport;
//! use sht20_modbus::{ModbusSession, Sht20Device};
//!
//! let mock = MockTransport::new();
//! mock.set_input_registers(1, &[212, 503]);
//!
//! let mut device = Sht20Device::with_session(ModbusSession::new(mock.clone()), 1);
//! let reading = device.read_realtime().await?;
//! assert_eq!(mock.connect_count(), 1);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::client::{ModbusTransport, TransportState};
use crate::device::registers;
use crate::error::{
    ModbusError, ModbusReadError, ModbusResult, ModbusWriteError, TransportError,
};
use crate::types::RegisterType;

// =============================================================================
// Records and faults
// =============================================================================

/// A write that reached the mock device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// First register written.
    pub address: u16,
    /// Values written, in order.
    pub values: Vec<u16>,
    /// Unit id of the request.
    pub unit: u8,
    /// `true` for FC 16, `false` for FC 06.
    pub multiple: bool,
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Exception(u8),
    Timeout,
    LinkDrop,
}

#[derive(Debug, Default)]
struct Registers {
    input: BTreeMap<u16, u16>,
    holding: BTreeMap<u16, u16>,
    writes: Vec<WriteRecord>,
    faults: VecDeque<Fault>,
    write_faults: BTreeMap<u16, u8>,
    truncate_to: Option<usize>,
}

#[derive(Debug)]
struct Shared {
    registers: Mutex<Registers>,
    unit_id: u8,
    connected: AtomicBool,
    fail_connect: AtomicBool,
    connect_count: AtomicU64,
    disconnect_count: AtomicU64,
    request_count: AtomicU64,
}

// =============================================================================
// MockTransport
// =============================================================================

/// In-memory SHT20 implementing [`ModbusTransport`].
#[derive(Debug, Clone)]
pub struct MockTransport {
    shared: Arc<Shared>,
}

impl MockTransport {
    /// Creates a mock answering unit id 1 with factory register values.
    pub fn new() -> Self {
        Self::with_unit_id(1)
    }

    /// Creates a mock answering the given unit id.
    ///
    /// Requests addressed to any other unit are left unanswered and time out.
    pub fn with_unit_id(unit_id: u8) -> Self {
        let mut regs = Registers::default();
        regs.input.insert(registers::REALTIME_ADDRESS, 0);
        regs.input.insert(registers::REALTIME_ADDRESS + 1, 0);
        regs.holding.insert(registers::DEVICE_ID_ADDRESS, u16::from(unit_id));
        regs.holding.insert(registers::BAUDRATE_ADDRESS, 9600);
        regs.holding.insert(registers::TEMP_OFFSET_ADDRESS, 0);
        regs.holding.insert(registers::HUM_OFFSET_ADDRESS, 0);

        Self {
            shared: Arc::new(Shared {
                registers: Mutex::new(regs),
                unit_id,
                connected: AtomicBool::new(false),
                fail_connect: AtomicBool::new(false),
                connect_count: AtomicU64::new(0),
                disconnect_count: AtomicU64::new(0),
                request_count: AtomicU64::new(0),
            }),
        }
    }

    fn registers(&self) -> MutexGuard<'_, Registers> {
        self.shared
            .registers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Register setup and inspection
    // =========================================================================

    /// Sets consecutive input registers starting at `address`.
    pub fn set_input_registers(&self, address: u16, values: &[u16]) {
        let mut regs = self.registers();
        for (offset, value) in values.iter().enumerate() {
            regs.input.insert(address.wrapping_add(offset as u16), *value);
        }
    }

    /// Sets consecutive holding registers starting at `address`.
    pub fn set_holding_registers(&self, address: u16, values: &[u16]) {
        let mut regs = self.registers();
        for (offset, value) in values.iter().enumerate() {
            regs.holding.insert(address.wrapping_add(offset as u16), *value);
        }
    }

    /// Removes a holding register, so reads covering it are rejected.
    pub fn remove_holding_register(&self, address: u16) {
        self.registers().holding.remove(&address);
    }

    /// Returns the current value of a holding register.
    pub fn holding_register(&self, address: u16) -> Option<u16> {
        self.registers().holding.get(&address).copied()
    }

    /// Returns every write that reached the device, oldest first.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.registers().writes.clone()
    }

    // =========================================================================
    // Error injection
    // =========================================================================

    /// Answers the next request with the given exception code.
    pub fn fail_next_with_exception(&self, code: u8) {
        self.registers().faults.push_back(Fault::Exception(code));
    }

    /// Leaves the next request unanswered.
    pub fn fail_next_with_timeout(&self) {
        self.registers().faults.push_back(Fault::Timeout);
    }

    /// Drops the link while the next request is in flight.
    pub fn drop_link_on_next_request(&self) {
        self.registers().faults.push_back(Fault::LinkDrop);
    }

    /// Rejects every write touching `address` with the given exception code.
    pub fn reject_writes_to(&self, address: u16, code: u8) {
        self.registers().write_faults.insert(address, code);
    }

    /// Returns at most `count` registers per read.
    pub fn truncate_responses_to(&self, count: usize) {
        self.registers().truncate_to = Some(count);
    }

    /// Makes connect attempts fail (or succeed again).
    pub fn set_fail_connect(&self, fail: bool) {
        self.shared.fail_connect.store(fail, Ordering::SeqCst);
    }

    // =========================================================================
    // Counters
    // =========================================================================

    /// Number of successful link setups.
    pub fn connect_count(&self) -> u64 {
        self.shared.connect_count.load(Ordering::SeqCst)
    }

    /// Number of link releases.
    pub fn disconnect_count(&self) -> u64 {
        self.shared.disconnect_count.load(Ordering::SeqCst)
    }

    /// Number of register requests that reached the device.
    pub fn request_count(&self) -> u64 {
        self.shared.request_count.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Request handling
    // =========================================================================

    fn begin_request(&self) -> ModbusResult<()> {
        if !self.shared.connected.load(Ordering::SeqCst) {
            return Err(ModbusError::not_connected());
        }
        self.shared.request_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn drop_link(&self) -> io::Error {
        self.shared.connected.store(false, Ordering::SeqCst);
        io::Error::new(io::ErrorKind::ConnectionReset, "mock link dropped")
    }

    fn read(
        &self,
        register_type: RegisterType,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.begin_request()?;

        let timeout = ModbusReadError::Timeout {
            register_type,
            address,
            count,
            duration: Duration::from_secs(3),
        };

        let mut regs = self.registers();
        match regs.faults.pop_front() {
            Some(Fault::Exception(code)) => {
                return Err(ModbusReadError::exception(register_type, address, count, code).into());
            }
            Some(Fault::Timeout) => return Err(timeout.into()),
            Some(Fault::LinkDrop) => {
                return Err(ModbusReadError::LinkDropped {
                    register_type,
                    address,
                    count,
                    source: self.drop_link(),
                }
                .into());
            }
            None => {}
        }

        if unit != self.shared.unit_id {
            return Err(timeout.into());
        }

        let table = match register_type {
            RegisterType::InputRegister => &regs.input,
            RegisterType::HoldingRegister => &regs.holding,
        };

        let mut values = Vec::with_capacity(usize::from(count));
        for offset in 0..count {
            match table.get(&address.wrapping_add(offset)) {
                Some(value) => values.push(*value),
                None => {
                    return Err(ModbusReadError::exception(register_type, address, count, 0x02).into());
                }
            }
        }

        if let Some(limit) = regs.truncate_to {
            values.truncate(limit);
        }

        Ok(values)
    }

    fn write(&self, address: u16, values: &[u16], unit: u8, multiple: bool) -> ModbusResult<()> {
        self.begin_request()?;

        let count = values.len() as u16;
        let mut regs = self.registers();
        match regs.faults.pop_front() {
            Some(Fault::Exception(code)) => {
                return Err(ModbusWriteError::exception(address, count, code).into());
            }
            Some(Fault::Timeout) => {
                return Err(ModbusWriteError::Timeout {
                    address,
                    count,
                    duration: Duration::from_secs(3),
                }
                .into());
            }
            Some(Fault::LinkDrop) => {
                return Err(ModbusWriteError::LinkDropped {
                    address,
                    count,
                    source: self.drop_link(),
                }
                .into());
            }
            None => {}
        }

        if unit != self.shared.unit_id {
            return Err(ModbusWriteError::Timeout {
                address,
                count,
                duration: Duration::from_secs(3),
            }
            .into());
        }

        let touched = address..address.saturating_add(count);
        if let Some((_, code)) = regs.write_faults.iter().find(|(a, _)| touched.contains(a)) {
            return Err(ModbusWriteError::exception(address, count, *code).into());
        }

        for (offset, value) in values.iter().enumerate() {
            regs.holding.insert(address.wrapping_add(offset as u16), *value);
        }
        regs.writes.push(WriteRecord {
            address,
            values: values.to_vec(),
            unit,
            multiple,
        });

        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModbusTransport for MockTransport {
    async fn connect(&mut self) -> ModbusResult<()> {
        if self.shared.fail_connect.load(Ordering::SeqCst) {
            return Err(ModbusError::transport(TransportError::refused("mock", 502)));
        }
        if !self.shared.connected.swap(true, Ordering::SeqCst) {
            self.shared.connect_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> ModbusResult<()> {
        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.disconnect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn state(&self) -> TransportState {
        if self.is_connected() {
            TransportState::Connected
        } else {
            TransportState::Disconnected
        }
    }

    async fn read_input_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.read(RegisterType::InputRegister, address, count, unit)
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ModbusResult<Vec<u16>> {
        self.read(RegisterType::HoldingRegister, address, count, unit)
    }

    async fn write_single_register(
        &mut self,
        address: u16,
        value: u16,
        unit: u8,
    ) -> ModbusResult<()> {
        self.write(address, &[value], unit, false)
    }

    async fn write_multiple_registers(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> ModbusResult<()> {
        self.write(address, values, unit, true)
    }

    fn display_name(&self) -> String {
        format!("Mock SHT20 (unit {})", self.shared.unit_id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_factory_registers() {
        let mut mock = MockTransport::new();
        mock.connect().await.unwrap();

        let values = mock.read_holding_registers(257, 4, 1).await.unwrap();
        assert_eq!(values, vec![1, 9600, 0, 0]);
    }

    #[tokio::test]
    async fn test_unmapped_read_is_illegal_address() {
        let mut mock = MockTransport::new();
        mock.connect().await.unwrap();

        let error = mock.read_input_registers(100, 1, 1).await.unwrap_err();
        assert_eq!(error.exception_code(), Some(0x02));
    }

    #[tokio::test]
    async fn test_wrong_unit_times_out() {
        let mut mock = MockTransport::with_unit_id(7);
        mock.connect().await.unwrap();

        let error = mock.read_input_registers(1, 2, 1).await.unwrap_err();
        assert!(matches!(error, ModbusError::Read(ModbusReadError::Timeout { .. })));
        assert!(mock.read_input_registers(1, 2, 7).await.is_ok());
    }

    #[tokio::test]
    async fn test_faults_are_consumed_in_order() {
        let mut mock = MockTransport::new();
        mock.connect().await.unwrap();
        mock.fail_next_with_exception(0x06);
        mock.fail_next_with_timeout();

        assert_eq!(
            mock.read_input_registers(1, 2, 1).await.unwrap_err().exception_code(),
            Some(0x06)
        );
        assert!(mock.read_input_registers(1, 2, 1).await.is_err());
        assert!(mock.read_input_registers(1, 2, 1).await.is_ok());
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_link_drop_disconnects() {
        let mut mock = MockTransport::new();
        mock.connect().await.unwrap();
        mock.drop_link_on_next_request();

        assert!(mock.write_single_register(257, 3, 1).await.is_err());
        assert!(!mock.is_connected());
        assert!(mock.writes().is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let mut mock = MockTransport::new();
        mock.set_fail_connect(true);
        assert!(mock.connect().await.is_err());
        assert_eq!(mock.connect_count(), 0);

        mock.set_fail_connect(false);
        assert!(mock.connect().await.is_ok());
        assert_eq!(mock.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_write_leaves_registers_untouched() {
        let mut mock = MockTransport::new();
        mock.connect().await.unwrap();
        mock.reject_writes_to(260, 0x03);

        let error = mock.write_multiple_registers(259, &[25, 13], 1).await.unwrap_err();
        assert_eq!(error.exception_code(), Some(0x03));
        assert_eq!(mock.holding_register(259), Some(0));
        assert_eq!(mock.holding_register(260), Some(0));
    }
}

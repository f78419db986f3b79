// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Device Adapter: the SHT20 register map on top of a [`ModbusSession`].
//!
//! Every operation connects on demand, so a link dropped by a previous
//! failure is re-established by the next call. The adapter never retries;
//! retry policy belongs to the caller.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sht20_modbus::device::Sht20Device;
//! use sht20_modbus::types::{ConnectionConfig, ModbusTcpConfig};
//!
//! let config = ConnectionConfig::from(ModbusTcpConfig::new("192.168.1.50"));
//! let mut device = Sht20Device::new(config).with_multiplier(0.1);
//!
//! let reading = device.read_realtime().await?;
//! println!("{:.1} °C / {:.1} %RH", reading.temperature, reading.humidity);
//!
//! device.write_correction_settings(0.5, -2.0).await?;
//! ```

pub mod registers;
mod types;

pub use types::{CorrectionSettings, DeviceSettings, RealtimeReading, round_to};

use std::time::Duration;

use crate::client::{ModbusSession, TransportState};
use crate::error::{
    ModbusError, ModbusResult, SensorReadError, SensorReadResult, SensorWriteError,
    SensorWriteResult,
};
use crate::types::ConnectionConfig;

/// Pause after a realtime read before the bus is used again.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

// =============================================================================
// Sht20Device
// =============================================================================

/// An SHT20 sensor reachable through one Modbus session.
#[derive(Debug)]
pub struct Sht20Device {
    session: ModbusSession,
    unit_id: u8,
    multiplier: f64,
    settle_delay: Duration,
}

impl Sht20Device {
    /// Creates an adapter for the configured link and unit id.
    pub fn new(config: ConnectionConfig) -> Self {
        let unit_id = config.unit_id();
        Self::with_session(ModbusSession::from_config(&config), unit_id)
    }

    /// Creates an adapter over an existing session.
    pub fn with_session(session: ModbusSession, unit_id: u8) -> Self {
        Self {
            session,
            unit_id,
            multiplier: registers::DEFAULT_MULTIPLIER,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Sets the raw-to-engineering multiplier of the realtime registers.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the pause after each realtime read.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Returns the unit id requests are addressed to.
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Returns the realtime multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &ModbusSession {
        &self.session
    }

    /// Returns the link state.
    pub fn state(&self) -> TransportState {
        self.session.state()
    }

    /// Establishes the link if not already connected.
    pub async fn connect(&mut self) -> ModbusResult<()> {
        self.session.connect().await
    }

    /// Releases the link.
    pub async fn close(&mut self) -> ModbusResult<()> {
        self.session.close().await
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Reads temperature and humidity from input registers 1-2.
    pub async fn read_realtime(&mut self) -> SensorReadResult<RealtimeReading> {
        const OPERATION: &str = "realtime";

        let raw = self
            .read_block(OPERATION, registers::REALTIME_ADDRESS, registers::REALTIME_COUNT, true)
            .await?;
        let reading = RealtimeReading::from_registers([raw[0], raw[1]], self.multiplier);

        tracing::debug!(
            unit_id = self.unit_id,
            raw_temperature = raw[0],
            raw_humidity = raw[1],
            temperature = reading.temperature,
            humidity = reading.humidity,
            "Read SHT20 realtime values"
        );

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(reading)
    }

    /// Reads the settings block from holding registers 257-260.
    pub async fn read_settings(&mut self) -> SensorReadResult<DeviceSettings> {
        const OPERATION: &str = "settings";

        let raw = self
            .read_block(OPERATION, registers::SETTINGS_ADDRESS, registers::SETTINGS_COUNT, false)
            .await?;
        let settings = DeviceSettings::from_registers([raw[0], raw[1], raw[2], raw[3]]);

        tracing::debug!(
            unit_id = self.unit_id,
            device_id = settings.device_id,
            baudrate = settings.baudrate,
            temp_offset = settings.temp_offset,
            hum_offset = settings.hum_offset,
            "Read SHT20 settings"
        );

        if !settings.has_supported_baudrate() {
            tracing::warn!(
                baudrate = settings.baudrate,
                "SHT20 reports a baud rate outside 9600/14400/19200"
            );
        }

        Ok(settings)
    }

    async fn read_block(
        &mut self,
        operation: &'static str,
        address: u16,
        count: u16,
        input: bool,
    ) -> SensorReadResult<Vec<u16>> {
        self.session
            .connect()
            .await
            .map_err(|e| SensorReadError::new(operation, e))?;

        let result = if input {
            self.session
                .read_input_registers(address, count, self.unit_id)
                .await
        } else {
            self.session
                .read_holding_registers(address, count, self.unit_id)
                .await
        };

        // The session guarantees `count` values on success.
        result.map_err(|e| SensorReadError::new(operation, e))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Writes the device id to 257 and the baud rate to 258.
    ///
    /// Each value is truncated to 16 bits. The two registers are written
    /// with separate single-register requests, device id first; if the
    /// second write fails the first is not rolled back.
    pub async fn write_device_settings(
        &mut self,
        device_id: u32,
        baudrate: u32,
    ) -> SensorWriteResult<()> {
        const OPERATION: &str = "device settings";

        self.session
            .connect()
            .await
            .map_err(|e| SensorWriteError::new(OPERATION, registers::DEVICE_ID_ADDRESS, e))?;

        let writes = [
            (registers::DEVICE_ID_ADDRESS, registers::mask_u16(device_id)),
            (registers::BAUDRATE_ADDRESS, registers::mask_u16(baudrate)),
        ];

        for (address, value) in writes {
            if let Err(e) = self.session.write_register(address, value, self.unit_id).await {
                if address != registers::DEVICE_ID_ADDRESS {
                    tracing::warn!(
                        unit_id = self.unit_id,
                        address,
                        "SHT20 device settings partially written"
                    );
                }
                return Err(SensorWriteError::new(OPERATION, address, e));
            }
        }

        tracing::info!(
            unit_id = self.unit_id,
            device_id = registers::mask_u16(device_id),
            baudrate = registers::mask_u16(baudrate),
            "Wrote SHT20 device settings"
        );

        Ok(())
    }

    /// Writes calibration offsets to 259-260 in one multi-register request.
    ///
    /// Offsets are encoded as `round(offset * 10)`; an offset that is not
    /// finite or does not fit a signed 16-bit register fails before any I/O.
    pub async fn write_correction_settings(
        &mut self,
        temp_offset: f64,
        hum_offset: f64,
    ) -> SensorWriteResult<()> {
        const OPERATION: &str = "correction settings";

        let correction = CorrectionSettings::new(temp_offset, hum_offset);
        let encoded = correction.encode().map_err(|(address, e)| {
            SensorWriteError::new(OPERATION, address, ModbusError::configuration(e))
        })?;

        self.session
            .connect()
            .await
            .map_err(|e| SensorWriteError::new(OPERATION, registers::TEMP_OFFSET_ADDRESS, e))?;

        self.session
            .write_registers(registers::TEMP_OFFSET_ADDRESS, &encoded, self.unit_id)
            .await
            .map_err(|e| SensorWriteError::new(OPERATION, registers::TEMP_OFFSET_ADDRESS, e))?;

        tracing::info!(
            unit_id = self.unit_id,
            temp_offset,
            hum_offset,
            "Wrote SHT20 correction settings"
        );

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    fn device() -> (Sht20Device, MockTransport) {
        let mock = MockTransport::new();
        let device = Sht20Device::with_session(ModbusSession::new(mock.clone()), 1)
            .with_settle_delay(Duration::ZERO);
        (device, mock)
    }

    #[tokio::test]
    async fn test_read_realtime_scales() {
        let (mut device, mock) = device();
        mock.set_input_registers(1, &[212, 503]);

        let reading = device.read_realtime().await.unwrap();
        assert!((reading.temperature - 21.2).abs() < 1e-9);
        assert!((reading.humidity - 50.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_read_realtime_custom_multiplier() {
        let (device, mock) = device();
        let mut device = device.with_multiplier(0.01);
        mock.set_input_registers(1, &[2123, 4567]);

        let reading = device.read_realtime().await.unwrap();
        assert!((reading.temperature - 21.23).abs() < 1e-9);
        assert!((reading.humidity - 45.67).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_read_settings_signed_offsets() {
        let (mut device, mock) = device();
        mock.set_holding_registers(257, &[5, 9600, 65535, 10]);

        let settings = device.read_settings().await.unwrap();
        assert_eq!(
            settings,
            DeviceSettings {
                device_id: 5,
                baudrate: 9600,
                temp_offset: -0.1,
                hum_offset: 1.0,
            }
        );
    }

    #[tokio::test]
    async fn test_read_connects_on_demand() {
        let (mut device, mock) = device();
        assert_eq!(device.state(), TransportState::Disconnected);

        device.read_realtime().await.unwrap();
        device.read_settings().await.unwrap();

        assert_eq!(mock.connect_count(), 1);
        assert_eq!(device.state(), TransportState::Connected);
    }

    #[tokio::test]
    async fn test_read_error_carries_operation() {
        let (mut device, mock) = device();
        mock.fail_next_with_exception(0x02);

        let error = device.read_settings().await.unwrap_err();
        assert_eq!(error.operation, "settings");
        assert_eq!(error.modbus_error().exception_code(), Some(0x02));
    }

    #[tokio::test]
    async fn test_write_correction_settings() {
        let (mut device, mock) = device();

        device.write_correction_settings(2.5, -1.3).await.unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].address, 259);
        assert!(writes[0].multiple);
        assert_eq!(writes[0].values, vec![25, (-13i16) as u16]);
    }

    #[tokio::test]
    async fn test_write_correction_out_of_range_does_no_io() {
        let (mut device, mock) = device();

        let error = device.write_correction_settings(0.0, 4000.0).await.unwrap_err();
        assert_eq!(error.address, registers::HUM_OFFSET_ADDRESS);
        assert_eq!(error.modbus_error().category(), "configuration");
        assert_eq!(mock.connect_count(), 0);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_write_device_settings_order_and_mask() {
        let (mut device, mock) = device();

        device.write_device_settings(0x1_0005, 19200).await.unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!((writes[0].address, writes[0].values[0]), (257, 5));
        assert_eq!((writes[1].address, writes[1].values[0]), (258, 19200));
        assert!(!writes[0].multiple && !writes[1].multiple);
    }

    #[tokio::test]
    async fn test_write_device_settings_partial_failure() {
        let (mut device, mock) = device();
        mock.reject_writes_to(258, 0x03);

        let error = device.write_device_settings(7, 12345).await.unwrap_err();

        assert_eq!(error.address, 258);
        assert_eq!(mock.holding_register(257), Some(7));
        assert_eq!(mock.holding_register(258), Some(9600));
    }
}

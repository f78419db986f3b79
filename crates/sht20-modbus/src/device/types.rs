// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Domain values produced and consumed by the device adapter.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::registers;
use crate::error::ConfigurationError;

// =============================================================================
// RealtimeReading
// =============================================================================

/// Temperature and humidity from the input registers, already scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealtimeReading {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl RealtimeReading {
    /// Decodes the two realtime registers with the given multiplier.
    pub fn from_registers(raw: [u16; 2], multiplier: f64) -> Self {
        Self {
            temperature: registers::scale(raw[0], multiplier),
            humidity: registers::scale(raw[1], multiplier),
        }
    }

    /// Applies host-side display offsets and rounds to `precision` decimals.
    ///
    /// The offsets are independent of the correction registers on the
    /// device; they only shift the presented value.
    pub fn adjusted(&self, temp_offset: f64, hum_offset: f64, precision: u32) -> Self {
        Self {
            temperature: round_to(self.temperature + temp_offset, precision),
            humidity: round_to(self.humidity + hum_offset, precision),
        }
    }
}

impl fmt::Display for RealtimeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} °C, {:.1} %RH", self.temperature, self.humidity)
    }
}

/// Rounds half away from zero to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(15) as i32);
    (value * factor).round() / factor
}

// =============================================================================
// DeviceSettings
// =============================================================================

/// The four-register settings block at holding 257.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Modbus device id.
    pub device_id: u16,
    /// Serial baud rate.
    pub baudrate: u16,
    /// Temperature correction applied by the sensor.
    pub temp_offset: f64,
    /// Humidity correction applied by the sensor.
    pub hum_offset: f64,
}

impl DeviceSettings {
    /// Decodes the settings block; the offsets are signed tenths.
    pub fn from_registers(raw: [u16; 4]) -> Self {
        Self {
            device_id: raw[0],
            baudrate: raw[1],
            temp_offset: registers::decode_offset(raw[2]),
            hum_offset: registers::decode_offset(raw[3]),
        }
    }

    /// Returns the correction part of the settings.
    pub fn correction(&self) -> CorrectionSettings {
        CorrectionSettings {
            temp_offset: self.temp_offset,
            hum_offset: self.hum_offset,
        }
    }

    /// Returns `true` if the reported baud rate is one the sensor supports.
    pub fn has_supported_baudrate(&self) -> bool {
        registers::is_supported_baud_rate(u32::from(self.baudrate))
    }
}

impl fmt::Display for DeviceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "device_id={} baudrate={} temp_offset={:+.1} hum_offset={:+.1}",
            self.device_id, self.baudrate, self.temp_offset, self.hum_offset
        )
    }
}

// =============================================================================
// CorrectionSettings
// =============================================================================

/// Calibration offsets written to holding 259-260.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrectionSettings {
    /// Temperature correction in degrees Celsius.
    pub temp_offset: f64,
    /// Humidity correction in percent.
    pub hum_offset: f64,
}

impl CorrectionSettings {
    /// Creates correction settings.
    pub fn new(temp_offset: f64, hum_offset: f64) -> Self {
        Self {
            temp_offset,
            hum_offset,
        }
    }

    /// Encodes both offsets for a single multi-register write.
    ///
    /// # Errors
    ///
    /// Returns the register address and cause of the first offset that
    /// cannot be encoded.
    pub fn encode(&self) -> Result<[u16; 2], (u16, ConfigurationError)> {
        let temp = registers::encode_offset("temp_offset", self.temp_offset)
            .map_err(|e| (registers::TEMP_OFFSET_ADDRESS, e))?;
        let hum = registers::encode_offset("hum_offset", self.hum_offset)
            .map_err(|e| (registers::HUM_OFFSET_ADDRESS, e))?;
        Ok([temp, hum])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_from_registers() {
        let reading = RealtimeReading::from_registers([212, 503], 0.1);
        assert!((reading.temperature - 21.2).abs() < 1e-9);
        assert!((reading.humidity - 50.3).abs() < 1e-9);
    }

    #[test]
    fn test_realtime_adjusted() {
        let reading = RealtimeReading::from_registers([212, 503], 0.1);
        let shown = reading.adjusted(0.5, -1.25, 2);
        assert_eq!(shown.temperature, 21.7);
        assert_eq!(shown.humidity, 49.05);

        let shown = reading.adjusted(0.0, 0.0, 0);
        assert_eq!(shown.temperature, 21.0);
        assert_eq!(shown.humidity, 50.0);
    }

    #[test]
    fn test_settings_from_registers() {
        let settings = DeviceSettings::from_registers([5, 9600, 65535, 10]);
        assert_eq!(settings.device_id, 5);
        assert_eq!(settings.baudrate, 9600);
        assert_eq!(settings.temp_offset, -0.1);
        assert_eq!(settings.hum_offset, 1.0);
        assert!(settings.has_supported_baudrate());
        assert_eq!(settings.correction(), CorrectionSettings::new(-0.1, 1.0));
    }

    #[test]
    fn test_correction_encode() {
        let encoded = CorrectionSettings::new(2.5, -1.3).encode().unwrap();
        assert_eq!(encoded, [25, (-13i16) as u16]);

        let (address, _) = CorrectionSettings::new(0.0, 5000.0).encode().unwrap_err();
        assert_eq!(address, registers::HUM_OFFSET_ADDRESS);

        let (address, _) = CorrectionSettings::new(f64::NAN, 0.0).encode().unwrap_err();
        assert_eq!(address, registers::TEMP_OFFSET_ADDRESS);
    }

    #[test]
    fn test_settings_serialize() {
        let settings = DeviceSettings::from_registers([1, 9600, 0, 0]);
        let json = serde_json::to_value(settings).unwrap();
        assert_eq!(json["device_id"], 1);
        assert_eq!(json["baudrate"], 9600);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(21.234, 2), 21.23);
        assert_eq!(round_to(21.235_1, 2), 21.24);
        assert_eq!(round_to(-0.05, 1), -0.1);
    }
}

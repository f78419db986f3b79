// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! SHT20 register map and fixed-point codecs.
//!
//! | Registers   | Type     | Meaning                                   |
//! |-------------|----------|-------------------------------------------|
//! | Input 1-2   | uint16x2 | temperature, humidity (raw x multiplier)  |
//! | Holding 257 | uint16   | device_id                                 |
//! | Holding 258 | uint16   | baudrate                                  |
//! | Holding 259 | int16    | temp_offset x 10                          |
//! | Holding 260 | int16    | hum_offset x 10                           |
//!
//! Addresses are 0-based PDU addresses and go on the wire unchanged.

use crate::error::ConfigurationError;

/// First input register of the realtime reading.
pub const REALTIME_ADDRESS: u16 = 1;

/// Number of input registers in a realtime reading.
pub const REALTIME_COUNT: u16 = 2;

/// First holding register of the settings block.
pub const SETTINGS_ADDRESS: u16 = 257;

/// Number of holding registers in the settings block.
pub const SETTINGS_COUNT: u16 = 4;

/// Holding register carrying the Modbus device id.
pub const DEVICE_ID_ADDRESS: u16 = 257;

/// Holding register carrying the serial baud rate.
pub const BAUDRATE_ADDRESS: u16 = 258;

/// Holding register carrying the temperature correction (tenths, signed).
pub const TEMP_OFFSET_ADDRESS: u16 = 259;

/// Holding register carrying the humidity correction (tenths, signed).
pub const HUM_OFFSET_ADDRESS: u16 = 260;

/// Fixed-point scale of the correction registers.
pub const OFFSET_SCALE: f64 = 10.0;

/// Default raw-to-engineering multiplier of the realtime registers.
pub const DEFAULT_MULTIPLIER: f64 = 0.1;

/// Baud rates the SHT20 serial interface accepts.
pub const SUPPORTED_BAUD_RATES: [u32; 3] = [9600, 14400, 19200];

/// Returns `true` if the SHT20 accepts this baud rate.
pub fn is_supported_baud_rate(baud_rate: u32) -> bool {
    SUPPORTED_BAUD_RATES.contains(&baud_rate)
}

/// Reinterprets a register as signed 16-bit two's complement.
///
/// Values `>= 0x8000` map to `value - 0x10000`.
#[inline]
pub const fn to_signed(raw: u16) -> i16 {
    raw as i16
}

/// Decodes a correction register into engineering units.
#[inline]
pub fn decode_offset(raw: u16) -> f64 {
    f64::from(to_signed(raw)) / OFFSET_SCALE
}

/// Encodes a correction offset as `round(offset * 10)` in a signed register.
///
/// Ties round away from zero, so `0.25` encodes as `3` and `-0.25` as `-3`.
///
/// # Errors
///
/// Fails if the offset is not finite or the encoded value does not fit in
/// an `i16`.
pub fn encode_offset(field: &str, offset: f64) -> Result<u16, ConfigurationError> {
    if !offset.is_finite() {
        return Err(ConfigurationError::out_of_range(
            field,
            offset,
            "offset must be a finite number",
        ));
    }

    let scaled = (offset * OFFSET_SCALE).round();
    if scaled < f64::from(i16::MIN) || scaled > f64::from(i16::MAX) {
        return Err(ConfigurationError::out_of_range(
            field,
            offset,
            format!(
                "encoded value {} does not fit in a signed 16-bit register",
                scaled
            ),
        ));
    }

    Ok((scaled as i16) as u16)
}

/// Truncates a value to the low 16 bits of a register.
#[inline]
pub const fn mask_u16(value: u32) -> u16 {
    (value & 0xFFFF) as u16
}

/// Scales a raw realtime register by the multiplier.
#[inline]
pub fn scale(raw: u16, multiplier: f64) -> f64 {
    f64::from(raw) * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_signed_boundaries() {
        for raw in [0u16, 1, 100, 0x7FFF] {
            assert_eq!(i32::from(to_signed(raw)), i32::from(raw));
        }
        for raw in [0x8000u16, 0x8001, 0xFFF3, 0xFFFF] {
            assert_eq!(i32::from(to_signed(raw)), i32::from(raw) - 0x10000);
        }
        assert_eq!(to_signed(0xFFFF), -1);
        assert_eq!(to_signed(0x8000), i16::MIN);
    }

    #[test]
    fn test_offset_round_trip() {
        for tenths in -1000..=1000 {
            let offset = f64::from(tenths) / 10.0;
            let raw = encode_offset("temp_offset", offset).unwrap();
            let decoded = decode_offset(raw);
            assert!(
                (decoded - offset).abs() < 0.1,
                "{} decoded as {}",
                offset,
                decoded
            );
        }
    }

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode_offset("t", 2.5).unwrap(), 25);
        assert_eq!(to_signed(encode_offset("h", -1.3).unwrap()), -13);
        assert_eq!(encode_offset("t", 0.0).unwrap(), 0);
        assert_eq!(to_signed(encode_offset("t", -3276.8).unwrap()), i16::MIN);
        assert_eq!(to_signed(encode_offset("t", 3276.7).unwrap()), i16::MAX);

        // Ties round away from zero.
        assert_eq!(encode_offset("t", 0.25).unwrap(), 3);
        assert_eq!(to_signed(encode_offset("h", -0.25).unwrap()), -3);
    }

    #[test]
    fn test_encode_rejects_unrepresentable() {
        assert!(encode_offset("t", 3276.8).is_err());
        assert!(encode_offset("t", -3276.9).is_err());
        assert!(encode_offset("t", f64::NAN).is_err());
        assert!(encode_offset("t", f64::INFINITY).is_err());
    }

    #[test]
    fn test_mask_u16() {
        assert_eq!(mask_u16(5), 5);
        assert_eq!(mask_u16(0x1_2580), 0x2580);
        assert_eq!(mask_u16(u32::MAX), 0xFFFF);
    }

    #[test]
    fn test_supported_baud_rates() {
        assert!(is_supported_baud_rate(9600));
        assert!(is_supported_baud_rate(14400));
        assert!(is_supported_baud_rate(19200));
        assert!(!is_supported_baud_rate(115200));
    }
}

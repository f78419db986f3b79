// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `calibrate` and `configure` commands.

use sht20_config::Sht20Config;
use sht20_modbus::Sht20Device;

use super::{close_device, sensor_context};
use crate::cli::{CalibrateArgs, ConfigureArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::build_device;

/// Executes the `calibrate` command: writes the correction offsets.
pub async fn calibrate(config: &Sht20Config, args: CalibrateArgs) -> BinResult<()> {
    let mut device = build_device(config);
    let result = write_correction(&mut device, config, &args).await;
    close_device(&mut device).await;
    result?;

    println!(
        "✓ Correction written to {}: temperature {:+.1} °C, humidity {:+.1} %RH",
        config.device.name, args.temp_offset, args.hum_offset
    );
    Ok(())
}

/// Executes the `configure` command: writes device id and baud rate.
pub async fn configure(config: &Sht20Config, args: ConfigureArgs) -> BinResult<()> {
    let mut device = build_device(config);
    let result = write_device(&mut device, config, &args).await;
    close_device(&mut device).await;
    result?;

    println!(
        "✓ Device settings written to {}: device id {}, baud rate {}",
        config.device.name, args.device_id, args.baudrate
    );
    println!("  The sensor may only answer at the new id and rate after a restart;");
    println!("  Update device.connection in the configuration file to match.");
    Ok(())
}

async fn write_correction(
    device: &mut Sht20Device,
    config: &Sht20Config,
    args: &CalibrateArgs,
) -> BinResult<()> {
    device
        .write_correction_settings(args.temp_offset, args.hum_offset)
        .await
        .map_err(|e| {
            BinError::from(e).with_context(sensor_context(config, "Writing correction to"))
        })
}

async fn write_device(
    device: &mut Sht20Device,
    config: &Sht20Config,
    args: &ConfigureArgs,
) -> BinResult<()> {
    device
        .write_device_settings(args.device_id, args.baudrate)
        .await
        .map_err(|e| {
            BinError::from(e).with_context(sensor_context(config, "Writing device settings to"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sht20_modbus::testing::MockTransport;
    use sht20_modbus::{ModbusSession, ModbusTcpConfig};

    fn device(mock: &MockTransport) -> Sht20Device {
        Sht20Device::with_session(ModbusSession::new(mock.clone()), 1)
    }

    fn config() -> Sht20Config {
        let mut config = Sht20Config::new(ModbusTcpConfig::new("10.0.0.7").into());
        config.device.name = "Greenhouse".to_string();
        config
    }

    #[tokio::test]
    async fn test_write_correction() {
        let mock = MockTransport::new();
        let args = CalibrateArgs {
            temp_offset: -1.5,
            hum_offset: 2.0,
        };

        write_correction(&mut device(&mock), &config(), &args)
            .await
            .unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].address, 259);
        assert_eq!(writes[0].values, vec![(-15i16) as u16, 20]);
    }

    #[tokio::test]
    async fn test_rejected_write_names_the_sensor() {
        let mock = MockTransport::new();
        mock.reject_writes_to(258, 0x03);
        let args = ConfigureArgs {
            device_id: 12,
            baudrate: 19200,
        };

        let err = write_device(&mut device(&mock), &config(), &args)
            .await
            .unwrap_err();

        assert!(
            err.to_string()
                .starts_with("Writing device settings to 'Greenhouse' (10.0.0.7:502): ")
        );
        assert_eq!(err.exit_code(), 7);
        assert_eq!(mock.holding_register(257), Some(12));
    }
}

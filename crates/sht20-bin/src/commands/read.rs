// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `read` and `settings` commands.

use sht20_config::Sht20Config;
use sht20_modbus::{DeviceSettings, Sht20Device};

use super::{close_device, sensor_context, to_json};
use crate::cli::{OutputArgs, OutputFormat};
use crate::error::{BinError, BinResult};
use crate::runtime::{Observation, build_device};

/// Executes the `read` command: one realtime reading.
pub async fn read(config: &Sht20Config, args: OutputArgs) -> BinResult<()> {
    let mut device = build_device(config);
    let result = read_observation(&mut device, config).await;
    close_device(&mut device).await;

    println!("{}", render_observation(&result?, args.format)?);
    Ok(())
}

/// Executes the `settings` command: one read of the settings block.
pub async fn settings(config: &Sht20Config, args: OutputArgs) -> BinResult<()> {
    let mut device = build_device(config);
    let result = read_device_settings(&mut device, config).await;
    close_device(&mut device).await;

    println!("{}", render_settings(&result?, args.format)?);
    Ok(())
}

async fn read_observation(device: &mut Sht20Device, config: &Sht20Config) -> BinResult<Observation> {
    let reading = device
        .read_realtime()
        .await
        .map_err(|e| BinError::from(e).with_context(sensor_context(config, "Reading")))?;
    Ok(Observation::new(config, &reading))
}

async fn read_device_settings(
    device: &mut Sht20Device,
    config: &Sht20Config,
) -> BinResult<DeviceSettings> {
    device.read_settings().await.map_err(|e| {
        BinError::from(e).with_context(sensor_context(config, "Reading settings from"))
    })
}

fn render_observation(observation: &Observation, format: OutputFormat) -> BinResult<String> {
    match format {
        OutputFormat::Text => Ok(observation.to_string()),
        OutputFormat::Json => to_json(observation),
    }
}

fn render_settings(settings: &DeviceSettings, format: OutputFormat) -> BinResult<String> {
    match format {
        OutputFormat::Text => {
            let mut lines = vec![
                format!("Device ID:          {}", settings.device_id),
                format!("Baud rate:          {}", settings.baudrate),
                format!("Temperature offset: {:+.1} °C", settings.temp_offset),
                format!("Humidity offset:    {:+.1} %RH", settings.hum_offset),
            ];
            if !settings.has_supported_baudrate() {
                lines.push("⚠ Baud rate is not one of 9600/14400/19200".to_string());
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => to_json(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sht20_modbus::testing::MockTransport;
    use sht20_modbus::{ModbusSession, ModbusTcpConfig};
    use std::time::Duration;

    fn device(mock: &MockTransport) -> Sht20Device {
        Sht20Device::with_session(ModbusSession::new(mock.clone()), 1)
            .with_settle_delay(Duration::ZERO)
    }

    fn config() -> Sht20Config {
        let mut config = Sht20Config::new(ModbusTcpConfig::new("127.0.0.1").into());
        config.display.precision = 1;
        config
    }

    #[tokio::test]
    async fn test_read_observation() {
        let mock = MockTransport::new();
        mock.set_input_registers(1, &[212, 503]);
        let mut device = device(&mock);

        let observation = read_observation(&mut device, &config()).await.unwrap();
        assert_eq!(observation.temperature, 21.2);
        assert_eq!(observation.humidity, 50.3);

        let text = render_observation(&observation, OutputFormat::Text).unwrap();
        assert_eq!(text, "SHT20 Sensor: 21.2 °C, 50.3 %RH");

        let json: serde_json::Value =
            serde_json::from_str(&render_observation(&observation, OutputFormat::Json).unwrap())
                .unwrap();
        assert_eq!(json["temperature"], 21.2);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_read_failure_maps_to_read_error() {
        let mock = MockTransport::new();
        mock.fail_next_with_exception(0x02);
        let mut device = device(&mock);

        let err = read_observation(&mut device, &config()).await.unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Reading 'SHT20 Sensor' (127.0.0.1:502): ")
        );
        assert!(err.modbus_error().is_some());
        assert_eq!(err.exit_code(), 6);
    }

    #[tokio::test]
    async fn test_settings_failure_names_the_sensor() {
        let mock = MockTransport::new();
        mock.set_fail_connect(true);
        let mut device = device(&mock);

        let err = read_device_settings(&mut device, &config()).await.unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Reading settings from 'SHT20 Sensor' (127.0.0.1:502): ")
        );
        assert_eq!(err.exit_code(), 5);
        assert!(!err.hints().is_empty());
    }

    #[test]
    fn test_render_settings() {
        let settings = DeviceSettings::from_registers([5, 9600, 65535, 10]);

        let text = render_settings(&settings, OutputFormat::Text).unwrap();
        assert!(text.contains("Device ID:          5"));
        assert!(text.contains("Temperature offset: -0.1 °C"));
        assert!(text.contains("Humidity offset:    +1.0 %RH"));
        assert!(!text.contains('⚠'));

        let json: serde_json::Value =
            serde_json::from_str(&render_settings(&settings, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["baudrate"], 9600);
        assert_eq!(json["hum_offset"], 1.0);
    }

    #[test]
    fn test_render_settings_flags_unknown_baudrate() {
        let settings = DeviceSettings::from_registers([1, 4800, 0, 0]);
        let text = render_settings(&settings, OutputFormat::Text).unwrap();
        assert!(text.contains("⚠ Baud rate"));
    }
}

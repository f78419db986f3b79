// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use sht20_config::Sht20Config;
use sht20_modbus::device::registers;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = sht20_config::load_config(config_path).map_err(|e| {
        BinError::Configuration(format!("Configuration validation failed: {}", e.user_message()))
    })?;

    let warnings = collect_warnings(&config);
    let connection = &config.device.connection;

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Device:        {}", config.device.name);
            println!("  Connection:    {} {}", connection.mode(), connection.target());
            println!("  Unit ID:       {}", connection.unit_id());
            println!("  Multiplier:    {}", config.device.multiplier);
            println!(
                "  Scan interval: {}",
                humantime::format_duration(config.polling.scan_interval)
            );
            println!(
                "  Display:       {:+} °C, {:+} %RH, {} decimals",
                config.display.temp_offset, config.display.hum_offset, config.display.precision
            );
            println!(
                "  Logging:       {} ({})",
                config.logging.level, config.logging.format
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "device_name": config.device.name,
                    "mode": connection.mode(),
                    "target": connection.target(),
                    "unit_id": connection.unit_id(),
                    "scan_interval": humantime::format_duration(config.polling.scan_interval).to_string(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("Failed to serialize output: {}", e)))?;
            println!("{}", rendered);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Flags settings that are valid but probably not intended.
fn collect_warnings(config: &Sht20Config) -> Vec<String> {
    let mut warnings = Vec::new();
    let timeout = config.device.connection.operation_timeout();
    let polling = &config.polling;

    if timeout >= polling.scan_interval {
        warnings.push(format!(
            "Operation timeout ({}) is not shorter than the scan interval ({}); a hung sensor delays every poll",
            humantime::format_duration(timeout),
            humantime::format_duration(polling.scan_interval)
        ));
    }

    if polling.settings_delay >= polling.scan_interval {
        warnings.push(format!(
            "Settings read is delayed ({}) past the first scheduled poll ({})",
            humantime::format_duration(polling.settings_delay),
            humantime::format_duration(polling.scan_interval)
        ));
    }

    if (config.device.multiplier - registers::DEFAULT_MULTIPLIER).abs() > f64::EPSILON {
        warnings.push(format!(
            "Multiplier {} differs from the SHT20 resolution of {}",
            config.device.multiplier,
            registers::DEFAULT_MULTIPLIER
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use sht20_modbus::ModbusTcpConfig;
    use std::time::Duration;

    fn config() -> Sht20Config {
        Sht20Config::new(ModbusTcpConfig::new("192.168.1.50").into())
    }

    #[test]
    fn test_defaults_have_no_warnings() {
        assert!(collect_warnings(&config()).is_empty());
    }

    #[test]
    fn test_slow_timeout_warns() {
        let mut config = config();
        config.polling.scan_interval = Duration::from_secs(2);

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Operation timeout (3s)"));
    }

    #[test]
    fn test_late_settings_read_and_multiplier_warn() {
        let mut config = config();
        config.polling.settings_delay = Duration::from_secs(30);
        config.device.multiplier = 0.01;

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Settings read"));
        assert!(warnings[1].contains("Multiplier 0.01"));
    }
}

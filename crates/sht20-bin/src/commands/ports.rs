// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `ports` command.

use sht20_modbus::{SerialPortEntry, available_serial_ports};

use super::to_json;
use crate::cli::{OutputArgs, OutputFormat};
use crate::error::{BinError, BinResult};

/// Executes the `ports` command: lists serial devices for RTU connections.
pub fn ports(args: OutputArgs) -> BinResult<()> {
    let ports = available_serial_ports()
        .map_err(|e| BinError::runtime(format!("Could not list serial ports: {}", e)))?;

    println!("{}", render_ports(&ports, args.format)?);
    Ok(())
}

fn render_ports(ports: &[SerialPortEntry], format: OutputFormat) -> BinResult<String> {
    match format {
        OutputFormat::Text if ports.is_empty() => Ok("No serial ports found".to_string()),
        OutputFormat::Text => {
            let width = ports.iter().map(|p| p.path.len()).max().unwrap_or(0);
            let lines: Vec<String> = ports
                .iter()
                .map(|port| {
                    let line = format!("{:<width$}  {}", port.path, port.kind);
                    match &port.description {
                        Some(description) => format!("{line} ({description})"),
                        None => line,
                    }
                })
                .collect();
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => to_json(&ports),
    }
}

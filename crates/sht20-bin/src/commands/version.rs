// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("sht20 - SHT20 Modbus temperature/humidity poller");
    println!();
    println!("Version Information:");
    println!("  sht20-bin:    {}", crate::VERSION);
    println!("  sht20-modbus: {}", sht20_modbus::VERSION);
    println!("  sht20-config: {}", sht20_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Links:");
    println!("  Modbus TCP:   yes");
    println!("  Modbus RTU:   yes");
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}

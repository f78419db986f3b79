// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! sht20 - SHT20 Modbus temperature/humidity poller
//!
//! Main binary entry point.

use sht20_bin::Cli;
use sht20_bin::error::report_error_and_exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(error) = sht20_bin::commands::execute(cli).await {
        report_error_and_exit(error);
    }
}

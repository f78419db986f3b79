// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use sht20_config::Sht20Config;
use tracing::{error, info};

use crate::error::BinResult;
use crate::runtime::Poller;
use crate::shutdown::ShutdownCoordinator;

/// Executes the `run` command: polls the sensor until SIGINT/SIGTERM.
pub async fn run(config: Sht20Config) -> BinResult<()> {
    info!("Starting sht20 v{}", crate::VERSION);

    let shutdown = ShutdownCoordinator::new();
    let signals = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = shutdown.listen_for_signals().await {
                error!(error = %e, "Signal handling unavailable, stopping");
                shutdown.initiate_shutdown();
            }
        }
    });

    let result = Poller::new(config).with_shutdown(shutdown).run().await;
    signals.abort();

    info!("sht20 shutdown complete");
    result
}

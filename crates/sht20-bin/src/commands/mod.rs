// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Poll the sensor until interrupted
//! - `read` / `settings`: One-shot reads
//! - `calibrate` / `configure`: Register writes
//! - `ports`: List serial ports for RTU connections
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod ports;
mod read;
mod run;
mod validate;
mod version;
mod write;

pub use ports::ports;
pub use read::{read, settings};
pub use run::run;
pub use validate::validate;
pub use version::version;
pub use write::{calibrate, configure};

use serde::Serialize;
use sht20_config::Sht20Config;
use sht20_modbus::Sht20Device;
use tracing::warn;

use crate::cli::{Cli, Commands};
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
///
/// Logging is initialized first. Commands that talk to the sensor take the
/// log level and format from the configuration file unless overridden on
/// the command line.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();

    match &command {
        Commands::Version => {
            init_logging(cli.effective_log_level(None), cli.effective_log_format(None))?;
            return version::version(&cli);
        }
        Commands::Validate(args) => {
            init_logging(cli.effective_log_level(None), cli.effective_log_format(None))?;
            return validate::validate(&cli, args.clone());
        }
        Commands::Ports(args) => {
            init_logging(cli.effective_log_level(None), cli.effective_log_format(None))?;
            return ports::ports(args);
        }
        _ => {}
    }

    let loaded = sht20_config::load_config(&cli.config);
    let configured = loaded.as_ref().ok().map(|c| &c.logging);
    init_logging(
        cli.effective_log_level(configured.map(|l| l.level.as_str())),
        cli.effective_log_format(configured.map(|l| l.format.into())),
    )?;
    let config = loaded?;

    match command {
        Commands::Run => run::run(config).await,
        Commands::Read(args) => read::read(&config, args).await,
        Commands::Settings(args) => read::settings(&config, args).await,
        Commands::Calibrate(args) => write::calibrate(&config, args).await,
        Commands::Configure(args) => write::configure(&config, args).await,
        Commands::Validate(_) | Commands::Ports(_) | Commands::Version => Ok(()),
    }
}

/// Names the configured sensor and its link, e.g.
/// `Reading settings from 'Greenhouse' (192.168.1.50:502)`.
fn sensor_context(config: &Sht20Config, action: &str) -> String {
    format!(
        "{} '{}' ({})",
        action,
        config.device.name,
        config.device.connection.target()
    )
}

fn to_json<T: Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to serialize output: {}", e)))
}

/// Releases the link after a one-shot command.
async fn close_device(device: &mut Sht20Device) {
    if let Err(error) = device.close().await {
        warn!(error = %error, "Error while closing the Modbus session");
    }
}

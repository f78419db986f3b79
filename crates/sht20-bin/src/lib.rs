// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sht20-bin
//!
//! Command-line poller for the SHT20 temperature/humidity sensor.
//!
//! - CLI argument parsing with clap
//! - The polling runtime
//! - Graceful shutdown handling
//! - Logging initialization
//! - One-shot read and write commands
//!
//! ## Architecture
//!
//! ```text
//!                       main.rs
//!                          │
//!                    ┌─────▼─────┐
//!                    │  cli.rs   │
//!                    └─────┬─────┘
//!                          │
//!               ┌──────────┼──────────┐
//!               ▼          ▼          ▼
//!         ┌──────────┐ ┌─────────┐ ┌─────────┐
//!         │ commands │ │ runtime │ │ logging │
//!         └────┬─────┘ └────┬────┘ └─────────┘
//!              │       ┌────▼─────┐
//!              │       │ shutdown │
//!              │       └──────────┘
//!         ┌────▼─────────────────────┐
//!         │ sht20-config sht20-modbus│
//!         └──────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Poll with ./sht20.yaml (default command)
//! sht20
//!
//! # Poll with a custom config
//! sht20 -c /etc/sht20/greenhouse.toml
//!
//! # One reading as JSON
//! sht20 read -f json
//!
//! # Write calibration offsets
//! sht20 calibrate --temp-offset -0.5 --hum-offset 2
//!
//! # Find the serial device for an RTU connection
//! sht20 ports
//!
//! # Validate configuration
//! sht20 validate --strict
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{Observation, Poller};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

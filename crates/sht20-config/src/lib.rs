// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sht20-config
//!
//! Configuration for the SHT20 poller: one sensor, its Modbus link, the
//! polling schedule, host-side display offsets and logging.
//!
//! ## Features
//!
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `SHT20_*` variables override file values
//! - **Placeholders**: `${VAR}` and `${VAR:default}` in file content
//! - **Validation**: unit id, SHT20 baud rates, scan interval and more
//!
//! ## Quick Start
//!
//! ```no_run
//! use sht20_config::loader::load_config;
//!
//! let config = load_config("sht20.yaml").unwrap();
//!
//! println!("Device: {}", config.device.name);
//! println!("Every: {:?}", config.polling.scan_interval);
//! ```
//!
//! ## Example
//!
//! ```yaml
//! device:
//!   name: Greenhouse
//!   connection:
//!     type: rtu
//!     port: "${SHT20_PORT:/dev/ttyUSB0}"
//!     baud_rate: 9600
//!     unit_id: 1
//! polling:
//!   scan_interval: 10s
//! display:
//!   temp_offset: -0.3
//!   precision: 1
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigFormat, ConfigLoader, ConfigLoaderBuilder, DEFAULT_ENV_PREFIX, load_config,
    load_config_str,
};
pub use schema::{
    DeviceConfig, DisplayConfig, LogFormat, LogLevel, LoggingConfig, PollingConfig, Sht20Config,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

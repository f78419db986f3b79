// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Poll the sensor until interrupted (default)
//! - `read`: One realtime reading
//! - `settings`: One settings read
//! - `calibrate`: Write correction offsets
//! - `configure`: Write device id and baud rate
//! - `ports`: List serial ports for RTU connections
//! - `validate`: Validate configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sht20_modbus::device::registers;
use sht20_modbus::types::{MAX_UNIT_ID, MIN_UNIT_ID};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// SHT20 Modbus temperature/humidity poller
///
/// Reads an SHT20 sensor over Modbus TCP or RTU on a fixed interval and
/// writes its device and calibration settings.
#[derive(Parser, Debug)]
#[command(
    name = "sht20",
    author = "Sylvex <contact@sylvex.io>",
    version = crate::VERSION,
    about = "SHT20 Modbus temperature/humidity poller",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "sht20.yaml",
        env = "SHT20_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the sht20 CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Poll the sensor until interrupted
    ///
    /// This is the default command when no subcommand is specified.
    Run,

    /// Read temperature and humidity once
    Read(OutputArgs),

    /// Read device id, baud rate and correction offsets once
    Settings(OutputArgs),

    /// Write temperature and humidity correction offsets
    Calibrate(CalibrateArgs),

    /// Write the device id and baud rate
    ///
    /// The sensor may only answer at the new id and rate after a restart.
    Configure(ConfigureArgs),

    /// List serial ports available for RTU connections
    Ports(OutputArgs),

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Output selection for one-shot reads.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `calibrate` command.
#[derive(Args, Debug, Clone)]
pub struct CalibrateArgs {
    /// Temperature correction in °C (one decimal is stored)
    #[arg(long, allow_negative_numbers = true)]
    pub temp_offset: f64,

    /// Humidity correction in %RH (one decimal is stored)
    #[arg(long, allow_negative_numbers = true)]
    pub hum_offset: f64,
}

/// Arguments for the `configure` command.
#[derive(Args, Debug, Clone)]
pub struct ConfigureArgs {
    /// New Modbus device id (1-247)
    #[arg(long, value_parser = parse_device_id)]
    pub device_id: u32,

    /// New baud rate (9600, 14400 or 19200)
    #[arg(long, value_parser = parse_baudrate)]
    pub baudrate: u32,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<sht20_config::LogFormat> for LogFormat {
    fn from(format: sht20_config::LogFormat) -> Self {
        match format {
            sht20_config::LogFormat::Text => LogFormat::Text,
            sht20_config::LogFormat::Json => LogFormat::Json,
            sht20_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Value Parsers
// =============================================================================

fn parse_device_id(value: &str) -> Result<u32, String> {
    let id: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (u32::from(MIN_UNIT_ID)..=u32::from(MAX_UNIT_ID)).contains(&id) {
        Ok(id)
    } else {
        Err(format!(
            "device id must be between {} and {}",
            MIN_UNIT_ID, MAX_UNIT_ID
        ))
    }
}

fn parse_baudrate(value: &str) -> Result<u32, String> {
    let baudrate: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if registers::is_supported_baud_rate(baudrate) {
        Ok(baudrate)
    } else {
        Err(format!(
            "baud rate must be one of {:?}",
            registers::SUPPORTED_BAUD_RATES
        ))
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level: flags, then `--log-level`, then the
    /// configured level.
    pub fn effective_log_level<'a>(&'a self, configured: Option<&'a str>) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            self.log_level.as_deref().or(configured).unwrap_or("info")
        }
    }

    /// Get the effective log format: `--log-format`, then the configured one.
    pub fn effective_log_format(&self, configured: Option<LogFormat>) -> LogFormat {
        self.log_format.or(configured).unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["sht20"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run));
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["sht20", "-c", "/etc/sht20/greenhouse.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/sht20/greenhouse.toml"));
    }

    #[test]
    fn test_read_json() {
        let cli = Cli::parse_from(["sht20", "read", "-f", "json"]);
        match cli.command {
            Some(Commands::Read(args)) => assert_eq!(args.format, OutputFormat::Json),
            other => panic!("Expected Read command, got {other:?}"),
        }
    }

    #[test]
    fn test_ports_command() {
        let cli = Cli::parse_from(["sht20", "ports"]);
        match cli.command {
            Some(Commands::Ports(args)) => assert_eq!(args.format, OutputFormat::Text),
            other => panic!("Expected Ports command, got {other:?}"),
        }
    }

    #[test]
    fn test_calibrate_accepts_negative_offsets() {
        let cli = Cli::parse_from([
            "sht20",
            "calibrate",
            "--temp-offset",
            "-1.5",
            "--hum-offset",
            "2",
        ]);
        match cli.command {
            Some(Commands::Calibrate(args)) => {
                assert_eq!(args.temp_offset, -1.5);
                assert_eq!(args.hum_offset, 2.0);
            }
            other => panic!("Expected Calibrate command, got {other:?}"),
        }
    }

    #[test]
    fn test_configure_validates_before_io() {
        let cli = Cli::parse_from(["sht20", "configure", "--device-id", "12", "--baudrate", "19200"]);
        match cli.command {
            Some(Commands::Configure(args)) => {
                assert_eq!(args.device_id, 12);
                assert_eq!(args.baudrate, 19200);
            }
            other => panic!("Expected Configure command, got {other:?}"),
        }

        for args in [
            ["sht20", "configure", "--device-id", "0", "--baudrate", "9600"],
            ["sht20", "configure", "--device-id", "248", "--baudrate", "9600"],
            ["sht20", "configure", "--device-id", "1", "--baudrate", "115200"],
            ["sht20", "configure", "--device-id", "x", "--baudrate", "9600"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?} should be rejected");
        }
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::parse_from(["sht20"]);
        assert_eq!(cli.effective_log_level(None), "info");
        assert_eq!(cli.effective_log_level(Some("debug")), "debug");

        let cli = Cli::parse_from(["sht20", "-l", "trace"]);
        assert_eq!(cli.effective_log_level(Some("debug")), "trace");

        let cli = Cli::parse_from(["sht20", "-q", "-l", "trace"]);
        assert_eq!(cli.effective_log_level(None), "warn");

        let cli = Cli::parse_from(["sht20", "-v"]);
        assert!(cli.is_verbose());
        assert_eq!(cli.effective_log_level(Some("error")), "debug");
    }

    #[test]
    fn test_log_format_precedence() {
        let cli = Cli::parse_from(["sht20"]);
        assert_eq!(cli.effective_log_format(None), LogFormat::Text);
        assert_eq!(
            cli.effective_log_format(Some(sht20_config::LogFormat::Json.into())),
            LogFormat::Json
        );

        let cli = Cli::parse_from(["sht20", "--log-format", "compact"]);
        assert_eq!(
            cli.effective_log_format(Some(LogFormat::Json)),
            LogFormat::Compact
        );
    }
}

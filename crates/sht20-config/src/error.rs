// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for sht20-config.

use std::path::PathBuf;

use sht20_modbus::ModbusError;
use thiserror::Error;

/// Configuration-related errors.
///
/// Covers every failure between reading the file and handing a validated
/// [`Sht20Config`](crate::Sht20Config) to the caller.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse config file '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// The device connection settings are invalid.
    #[error("Invalid device connection: {source}")]
    Connection {
        /// Validation error reported by the Modbus layer.
        #[from]
        source: ModbusError,
    },

    /// File I/O error.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Invalid environment variable value.
    #[error("Invalid environment variable value for '{name}': {message}")]
    InvalidEnvVar {
        /// The environment variable name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Unsupported configuration format.
    #[error("Unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The unsupported format.
        format: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns a short message suitable for the operator.
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Parse { path, message } => {
                format!("Cannot parse {}: {}", path.display(), message)
            }
            ConfigError::Validation { field, message } => {
                format!("Invalid setting '{}': {}", field, message)
            }
            ConfigError::Connection { source } => {
                format!("Invalid device connection: {}", source)
            }
            ConfigError::Io { path, .. } => {
                format!("Cannot read {}", path.display())
            }
            ConfigError::FileNotFound { path } => {
                format!("Configuration file not found: {}", path.display())
            }
            ConfigError::InvalidEnvVar { name, message } => {
                format!("Invalid value in {}: {}", name, message)
            }
            ConfigError::UnsupportedFormat { format } => {
                format!("Unsupported configuration format '{}' (use yaml, toml or json)", format)
            }
            ConfigError::Serialization { message } => message.clone(),
        }
    }

    /// Returns `true` if this error is related to file I/O.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ConfigError::Io { .. } | ConfigError::FileNotFound { .. })
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            ConfigError::Parse { .. } => "parse",
            ConfigError::Validation { .. } => "validation",
            ConfigError::Connection { .. } => "connection",
            ConfigError::Io { .. } => "io",
            ConfigError::FileNotFound { .. } => "file_not_found",
            ConfigError::InvalidEnvVar { .. } => "invalid_env_var",
            ConfigError::UnsupportedFormat { .. } => "unsupported_format",
            ConfigError::Serialization { .. } => "serialization",
        }
    }
}

/// A Result type with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sht20_modbus::ConfigurationError;

    #[test]
    fn test_config_error_creation() {
        let error = ConfigError::validation("polling.scan_interval", "must be greater than 0");
        assert_eq!(error.error_type(), "validation");
        assert!(error.to_string().contains("polling.scan_interval"));

        let error = ConfigError::unsupported_format("ini");
        assert_eq!(error.error_type(), "unsupported_format");
        assert!(error.user_message().contains("ini"));
    }

    #[test]
    fn test_connection_error_from_modbus() {
        let error: ConfigError =
            ModbusError::configuration(ConfigurationError::invalid_unit_id(0)).into();
        assert_eq!(error.error_type(), "connection");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_config_error_is_io_error() {
        let error = ConfigError::io(
            "sht20.yaml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(error.is_io_error());
        assert!(ConfigError::file_not_found("sht20.yaml").is_io_error());
        assert!(!ConfigError::serialization("bad").is_io_error());
    }
}

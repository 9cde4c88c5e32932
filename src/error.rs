//! Error types

use std::path::PathBuf;

/// Failures that stop the daemon
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keyer handshake failed: {0}")]
    Handshake(String),

    #[error("Unsupported WinKeyer firmware version {0}")]
    UnsupportedFirmware(u8),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Problems with the config file or command line
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No serial device given (use --device or set `device` in the config file)")]
    MissingDevice,

    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;

//! Error types for the Linux backend

use thiserror::Error;

/// Errors raised while opening or configuring the Linux backend
#[derive(Debug, Error)]
pub enum LinuxError {
    /// Failed to open the spidev device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to {mode}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("Failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set clock speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// Failed to request the control lines
    #[error("Failed to request GPIO lines on {chip}: {source}")]
    LineRequestFailed {
        chip: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid option value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Required option missing
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The driver rejected the configuration
    #[error("Driver error: {0}")]
    Driver(#[from] ad5932_core::Error),
}

/// Result type for Linux backend operations
pub type Result<T> = std::result::Result<T, LinuxError>;

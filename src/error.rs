//! Error types for the monitor tester.
//!
//! The sampling pipeline itself is total; these errors only cover the
//! collaborators around it (configuration, persisted settings, export and
//! the chart canvas).

use thiserror::Error;

/// Errors related to configuration management.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Errors related to the persisted settings blob.
///
/// These never reach the user: the settings store logs them and falls
/// back to defaults.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings blob is not valid JSON: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("Failed to write settings: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors related to serializing a session snapshot.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to format session timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Errors related to the chart canvas.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Top-level tester errors.
#[derive(Error, Debug)]
pub enum TesterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
}

//! CLI error types

use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file/env loading error
    #[error("configuration error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Node client error
    #[error(transparent)]
    Client(#[from] moorline_client::ClientError),

    /// Lifecycle error
    #[error(transparent)]
    Flow(#[from] moorline_flow::FlowError),

    /// Invoice row mapping error
    #[error(transparent)]
    Record(#[from] moorline_types::RecordError),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Some documents failed their lifecycle
    #[error("{failed} of {total} documents failed")]
    Lifecycle {
        /// Documents that did not reach the minted state
        failed: usize,
        /// Documents attempted
        total: usize,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

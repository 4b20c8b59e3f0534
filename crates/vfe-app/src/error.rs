//! Error types for the vfe-app service layer.

use std::path::PathBuf;

use vfe_core::VfeError;
use vfe_pmu::{QueryError, TransportError};

pub type AppResult<T> = Result<T, AppError>;

/// Application error wrapping the construction, transport and
/// configuration failures the driver init sequence can see.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("VFE construction failed: {0}")]
    Construct(#[from] VfeError),

    #[error("Coprocessor construct failed: {0}")]
    Transport(#[from] TransportError),

    #[error("VFE query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read table image: {path}")]
    TableRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

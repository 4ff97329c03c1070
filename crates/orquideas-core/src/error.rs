//! Error types for Orquideas

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrquideaError {
    // Load errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported format '.{extension}'. Supported: {}", .supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed record {record} in {dataset}: {reason}")]
    MalformedRecord {
        dataset: String,
        record: String,
        reason: String,
    },

    // CRS errors
    #[error("CRS mismatch: dataset has {dataset_crs}, cannot resolve to {target_crs}: {reason}")]
    CrsMismatch {
        dataset_crs: String,
        target_crs: String,
        reason: String,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OrquideaError {
    /// Whether this error stems from reading or parsing an input dataset
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            OrquideaError::FileNotFound { .. }
                | OrquideaError::UnsupportedFormat { .. }
                | OrquideaError::Load { .. }
                | OrquideaError::MissingColumn { .. }
                | OrquideaError::MalformedRecord { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, OrquideaError>;

//! Unified application error types
//!
//! Aggregates the per-module errors into one type suitable for the
//! application root and the command-line surface.

use thiserror::Error;

use crate::config::ConfigError;
use crate::license::LicenseError;
use crate::storage::StorageError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Storage backend error
    #[error("erreur de stockage: {0}")]
    Storage(#[from] StorageError),

    /// License persistence error
    #[error("erreur de licence: {0}")]
    License(#[from] LicenseError),

    /// Configuration persistence error
    #[error("erreur de configuration: {0}")]
    Config(#[from] ConfigError),

    /// File operation error
    #[error("erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("erreur interne: {0}")]
    Internal(String),
}

impl AppError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

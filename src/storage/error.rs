//! Storage module error types
//!
//! Shared by the three backends behind the `MailStore` trait.

use thiserror::Error;

/// Storage operation error type
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error
    #[error("erreur base de données: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data serialization error
    #[error("erreur de sérialisation des données: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File read or write error
    #[error("erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),

    /// Backend needs a location that was never configured
    #[error("stockage non configuré: {0}")]
    NotConfigured(String),

    /// Invalid input parameters
    #[error("entrée invalide: {0}")]
    InvalidInput(String),

    /// Lock error when accessing the in-memory store
    #[error("erreur de verrouillage du stockage")]
    Lock,
}

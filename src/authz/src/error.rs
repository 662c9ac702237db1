//! Error types for the scope authorization engine

use thiserror::Error;

use crate::scope::CatalogError;

/// Authorization engine errors
///
/// Authorization queries never produce these: a missing or malformed input
/// resolves to a denial instead. Errors are reserved for catalog
/// construction, configuration, and the access-write hand-off.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Malformed scope catalog input
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An operation needed the scope catalog but none was loaded
    #[error("Scope catalog is not loaded")]
    CatalogUnavailable,

    /// The external access writer rejected or failed the update
    #[error("Access update failed: {0}")]
    AccessWrite(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;

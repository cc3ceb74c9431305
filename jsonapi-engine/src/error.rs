//! Crate-level error type
//!
//! [`Error`] covers the surfaces around the engine: loading configuration,
//! installing the tracing subscriber and constructing documents. Errors that
//! are rendered to clients live in [`crate::handlers::JsonApiError`].

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration values that parse but violate an invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document was built with both or neither of `data` and `errors`
    #[error("Invalid document: {0}")]
    Document(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

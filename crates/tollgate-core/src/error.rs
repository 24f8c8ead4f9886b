//! Error types for tollgate-core

use crate::StatusCode;
use thiserror::Error;

pub use tollgate_router::RouteNotFound;

/// Result type alias for tollgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the tollgate dispatch pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// No handler identifier matched the request path
    #[error(transparent)]
    RouteNotFound(#[from] RouteNotFound),

    /// An identifier was enqueued that the registry cannot instantiate
    #[error("Handler not registered: {0}")]
    HandlerMissing(String),

    /// Configuration could not be read or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// IO error (native only)
    #[cfg(feature = "native")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hyper error (native only)
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Hyper(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Status code a client should see for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

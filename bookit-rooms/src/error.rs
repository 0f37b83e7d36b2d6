//! Service-level error types
//!
//! [`Error`] covers failures outside of request handling: loading configuration,
//! binding the listener, seeding or connecting the room store. Request-scoped
//! failures use [`ApiError`](crate::handlers::ApiError) instead.

use thiserror::Error;

/// Main error type for the service
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document store could not be reached or initialised
    #[error("Store error: {0}")]
    Store(String),
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

/// Result type alias using the service [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

//! Common error types for the well-being dashboard

use thiserror::Error;

use crate::provider::FetchError;

/// Common result type for dashboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the scoring core and the dashboard service
#[derive(Error, Debug)]
pub enum Error {
    /// Aggregation requested over an empty result set
    ///
    /// Callers treat this as "no data to display", not as a fault.
    #[error("No statistics to aggregate")]
    EmptyInput,

    /// Section name missing from the scale table while unknown sections are rejected
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// Upstream statistics API failure
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

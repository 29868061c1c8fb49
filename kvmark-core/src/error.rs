use std::fmt;

use crate::store::StoreError;

/// Result type alias for kvmark core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kvmark core operations
#[derive(Debug)]
pub enum Error {
    /// Invalid or unknown benchmark configuration
    Config(String),

    /// A store adapter rejected an operation that cannot be absorbed into stats
    Adapter(StoreError),

    /// Statistics calculation errors
    Stats(String),

    /// Other errors
    Other(String),
}

impl Error {
    /// True for errors raised while validating configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Adapter(err) => write!(f, "Adapter error: {err}"),
            Error::Stats(msg) => write!(f, "Statistics error: {msg}"),
            Error::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Adapter(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Adapter(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

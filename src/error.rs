//! Error types for the dataset utilities.

use thiserror::Error;

/// Every failure surfaced by this crate.
///
/// Precondition checks (bad column or table names, non-array arguments to
/// array encoding) all map onto [`DatasetError::InvalidValue`].
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{0}")]
    InvalidValue(String),

    /// A payload carried the NPY magic but could not be decoded.
    #[error("invalid array payload: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl DatasetError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;

//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error (unreadable input, unwritable output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed container or label file.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Required container field absent.
    #[error("invalid file format: missing field '{0}'")]
    MissingField(String),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid path configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] civis_core::Error),
}

impl Error {
    /// Returns true for malformed-input errors (as opposed to I/O or
    /// configuration failures).
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::InvalidFormat(_) | Error::MissingField(_))
    }
}

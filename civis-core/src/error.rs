//! Error types for civis-core.

use thiserror::Error;

/// Result type alias for civis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for session, label and selection operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Neuron array index outside `[0, len)`.
    #[error("neuron index {index} out of range for {len} neurons")]
    IndexOutOfRange { index: usize, len: usize },

    /// Neuron id outside the `[min, max]` id range of the loaded session.
    #[error("neuron id {id} out of range [{min}, {max}]")]
    IdOutOfRange { id: i64, min: i64, max: i64 },

    /// Neuron id inside the id range but absent from a non-contiguous id set.
    #[error("no neuron with id {0} in this session")]
    UnknownId(i64),

    /// A session with zero neurons cannot be activated.
    #[error("configuration error: cannot activate a session with zero neurons")]
    EmptySession,

    /// Session data with mismatched dimensions or invalid values.
    #[error("inconsistent session data: {0}")]
    Inconsistent(String),

    /// Operation requires a loaded session.
    #[error("no session loaded")]
    NotLoaded,
}

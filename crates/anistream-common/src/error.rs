//! Common error types used throughout anistream.
//!
//! Only primary-source failures, unsupported operations, unknown identifiers
//! and bad input ever surface as errors. Metadata-provider failures never reach this type; they
//! are collapsed into absent fields at the provider boundary.

/// Common error type for anistream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The primary catalog source failed or returned something unusable.
    #[error("Upstream '{source_name}' failed: {message}")]
    Upstream {
        /// Name of the failing catalog source.
        source_name: String,
        /// Rendered error chain from the source.
        message: String,
    },

    /// The primary catalog source does not support the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No entry exists for the requested identifier.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a new Upstream error for the named source.
    pub fn upstream<N: Into<String>, M: Into<String>>(source_name: N, message: M) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a new Unsupported error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error as ThisError;

/// Unified error type for the index engine.
///
/// Index operations themselves are total: inserts, deletes and lookups never
/// fail. Errors only surface at the edges, when a caller asks the codec to
/// validate a key or hands the LSM index a nonsensical configuration.
#[derive(Debug, ThisError, Clone, PartialEq)]
pub enum Error {
    /// A key slice did not have the width its encoding requires.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Rejected index configuration.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

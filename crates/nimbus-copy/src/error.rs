//! Error types for the nimbus-copy crate

use thiserror::Error;

/// Result type alias using `CopyError`
pub type Result<T> = std::result::Result<T, CopyError>;

/// Errors that can occur while orchestrating a copy
#[derive(Error, Debug)]
pub enum CopyError {
    /// Chunk size outside the supported range
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// The caller's cancel flag was observed set
    #[error("operation cancelled")]
    Cancelled,

    /// The source reported EOF before the announced file size was reached
    #[error("short read: expected {expected} bytes, source ended at {got}")]
    ShortRead { expected: u64, got: u64 },

    /// Path does not exist or is not usable for the operation
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// IO error from a callback or the filesystem
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

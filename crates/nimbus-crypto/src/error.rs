//! Error types for the nimbus-crypto crate

use thiserror::Error;

/// Result type alias using `CryptoError`
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Invalid key format or length
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid nonce
    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    /// Invalid container or chunk framing
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Data too large for operation
    #[error("data too large: {size} bytes exceeds maximum {max} bytes")]
    DataTooLarge { size: u64, max: u64 },

    /// Invalid chunk size
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// Encryption failed
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key, tampered ciphertext, or corrupt wrapper)
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Chunk submitted out of order to a streaming context
    #[error("chunk out of order: expected index {expected}, got {got}")]
    ChunkOutOfOrder { expected: u32, got: u32 },

    /// Operation on a context that was already finalized
    #[error("context is finalized")]
    ContextFinalized,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

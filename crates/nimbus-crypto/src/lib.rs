//! # Nimbus Crypto
//!
//! Authenticated encryption of arbitrary-size byte streams, designed for
//! files headed to cloud storage.
//!
//! ## Key hierarchy
//!
//! A long-lived **Master Key** (MK, 32 bytes, caller-supplied) wraps a fresh
//! per-file **File Encryption Key** (FEK). The FEK encrypts the file content
//! in independent, self-authenticating chunks, so a file can be produced and
//! consumed with O(chunk) memory.
//!
//! ## Container format
//!
//! ```text
//! MainHeader(12) ‖ WrappedFEK(60) ‖ Chunk₀ ‖ Chunk₁ ‖ … ‖ Chunkₙ₋₁
//! ```
//!
//! Each chunk record carries its index, plaintext length, and nonce, and its
//! AES-256-GCM tag binds index and length as associated data. Reordering,
//! resizing, or splicing chunks between files fails authentication.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nimbus_crypto::{MasterKey, StreamEncryptor, StreamDecryptor};
//!
//! let master = MasterKey::from_bytes(&key_bytes)?;
//!
//! let (mut encryptor, prefix) = StreamEncryptor::new(&master)?;
//! let record = encryptor.encrypt_chunk(b"chunk data", 0)?;
//! // persist prefix, then record, then further records...
//!
//! let mut decryptor = StreamDecryptor::new(&prefix, &master)?;
//! let plaintext = decryptor.decrypt_chunk(&record)?;
//! ```
//!
//! ## Security model
//!
//! - The MK is never persisted by this crate; the FEK is never serialized in
//!   the clear and never reused across files.
//! - Key material is zeroed on drop and on any failure that poisons a
//!   context.
//! - Decryption failures do not reveal whether the master key was wrong or
//!   the ciphertext was tampered with.

pub mod aead;
pub mod error;
pub mod file;
pub mod format;
pub mod kdf;
pub mod keys;
pub mod stream;
pub mod wrap;

pub use aead::{Nonce, open, seal};
pub use error::{CryptoError, Result};
pub use file::{
    DEFAULT_CHUNK_SIZE, ProgressFn, decrypt_bytes, decrypt_with_file_key, encrypt_bytes,
    encrypt_with_file_key, open_blob, seal_blob,
};
pub use format::{
    CHUNK_HEADER_LEN, CHUNK_OVERHEAD, ChunkHeader, FORMAT_VERSION, HEADER_LEN, MAGIC,
    MAX_CHUNK_PLAINTEXT_LEN, MAX_WRAPPED_KEY_LEN, MainHeader, chunk_aad, split_chunk,
    split_prefix,
};
pub use kdf::{MIN_RECOMMENDED_ITERATIONS, derive_key};
pub use keys::{FileKey, KEY_SIZE, MasterKey, NONCE_SIZE, TAG_SIZE};
pub use stream::{StreamDecryptor, StreamEncryptor};
pub use wrap::{WRAPPED_KEY_LEN, unwrap_file_key, wrap_file_key};

//! File key wrapping under the master key
//!
//! A FEK is sealed under the MK with a fresh nonce and a fixed AAD label.
//! Wire form: `nonce(12) ‖ ciphertext(32) ‖ tag(16)` = 60 bytes. The main
//! header records the wrapped length so the container tolerates longer
//! wrappers in a future format revision.

use crate::{
    CryptoError, Result, aead,
    aead::Nonce,
    keys::{FileKey, MasterKey, NONCE_SIZE, TAG_SIZE},
};

/// Domain-separation label bound into the wrap tag
const WRAP_AAD: &[u8] = b"fek-wrap-v1";

/// Length of a wrapped file key: nonce + 32-byte ciphertext + tag
pub const WRAPPED_KEY_LEN: usize = NONCE_SIZE + 32 + TAG_SIZE;

/// Wrap a file key under the master key
///
/// Returns `nonce ‖ ciphertext ‖ tag`.
pub fn wrap_file_key(master: &MasterKey, file_key: &FileKey) -> Result<Vec<u8>> {
    let nonce = Nonce::generate();
    let sealed = aead::seal(master.as_bytes(), &nonce, file_key.as_bytes(), WRAP_AAD)?;

    let mut wrapped = Vec::with_capacity(NONCE_SIZE + sealed.len());
    wrapped.extend_from_slice(nonce.as_bytes());
    wrapped.extend_from_slice(&sealed);
    Ok(wrapped)
}

/// Unwrap a file key previously wrapped under the master key
///
/// A wrong master key and a corrupted wrapper are indistinguishable: both
/// surface as [`CryptoError::Decryption`].
pub fn unwrap_file_key(master: &MasterKey, wrapped: &[u8]) -> Result<FileKey> {
    if wrapped.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidFormat(format!(
            "wrapped key too short: {} bytes",
            wrapped.len()
        )));
    }

    let nonce = Nonce::from_bytes(&wrapped[..NONCE_SIZE])?;
    let key_bytes = aead::open(master.as_bytes(), &nonce, &wrapped[NONCE_SIZE..], WRAP_AAD)?;
    FileKey::from_bytes(&key_bytes)
}

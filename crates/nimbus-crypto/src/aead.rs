//! AEAD primitive binding over AES-256-GCM
//!
//! Single-shot seal/open with optional associated data. Tag verification is
//! constant-time inside the `aes-gcm` crate; any mismatch fails without
//! releasing plaintext.

use crate::{
    CryptoError, Result,
    keys::{KEY_SIZE, NONCE_SIZE},
};
use aes_gcm::{
    Aes256Gcm, KeyInit,
    aead::{Aead as AeadTrait, Payload},
};
use rand::rngs::OsRng;

/// A nonce for AEAD encryption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce {
    bytes: [u8; NONCE_SIZE],
}

impl Nonce {
    /// Generate a random nonce
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::RngCore::fill_bytes(&mut OsRng, &mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonce(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; NONCE_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the nonce bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.bytes
    }
}

/// Encrypt `plaintext` under `key` and `nonce`, binding `aad` into the tag
///
/// Returns `ciphertext ‖ tag`. An empty `aad` is allowed.
pub fn seal(key: &[u8; KEY_SIZE], nonce: &Nonce, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::Encryption(e.to_string()))?;
    let nonce_arr = aes_gcm::Nonce::from_slice(nonce.as_bytes());
    cipher
        .encrypt(nonce_arr, Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Decrypt `ciphertext ‖ tag` under `key` and `nonce`, verifying `aad`
pub fn open(
    key: &[u8; KEY_SIZE],
    nonce: &Nonce,
    ciphertext_with_tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::Decryption(e.to_string()))?;
    let nonce_arr = aes_gcm::Nonce::from_slice(nonce.as_bytes());
    cipher
        .decrypt(
            nonce_arr,
            Payload {
                msg: ciphertext_with_tag,
                aad,
            },
        )
        .map_err(|e| CryptoError::Decryption(e.to_string()))
}

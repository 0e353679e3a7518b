//! Password-based key derivation
//!
//! PBKDF2-HMAC-SHA256 producing a 32-byte master key. The iteration count is
//! chosen by the caller; counts below [`MIN_RECOMMENDED_ITERATIONS`] are
//! accepted but logged.

use crate::{CryptoError, Result, keys::MasterKey};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::warn;

/// Iteration counts below this are considered weak for interactive passwords
pub const MIN_RECOMMENDED_ITERATIONS: u32 = 100_000;

/// Derive a 32-byte master key from a password and salt
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<MasterKey> {
    if iterations == 0 {
        return Err(CryptoError::InvalidKey(
            "iteration count must be non-zero".to_string(),
        ));
    }
    if iterations < MIN_RECOMMENDED_ITERATIONS {
        warn!(
            iterations,
            recommended = MIN_RECOMMENDED_ITERATIONS,
            "PBKDF2 iteration count below recommended minimum"
        );
    }

    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    Ok(MasterKey::from_array(key))
}

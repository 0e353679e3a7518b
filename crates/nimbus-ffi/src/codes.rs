//! Stable integer error codes for the C ABI
//!
//! Negative return values from `intptr_t`-typed operations carry these
//! codes; non-negative values are byte counts or success. The mapping is
//! frozen: codes never change meaning across releases.

use nimbus_copy::CopyError;
use nimbus_crypto::CryptoError;

pub const SUCCESS: i32 = 0;
pub const ERROR_NULL_POINTER: i32 = -1;
pub const ERROR_INVALID_KEY_SIZE: i32 = -2;
pub const ERROR_ENCRYPTION_FAILED: i32 = -3;
pub const ERROR_DECRYPTION_FAILED: i32 = -4;
pub const ERROR_INVALID_FORMAT: i32 = -5;
pub const ERROR_ALLOCATION_FAILED: i32 = -6;
pub const ERROR_FILE_NOT_FOUND: i32 = -7;
pub const ERROR_PERMISSION_DENIED: i32 = -8;
pub const ERROR_IO_FAILED: i32 = -9;
pub const ERROR_CANCELLED: i32 = -10;
pub const ERROR_INVALID_PATH: i32 = -11;
pub const ERROR_DISK_FULL: i32 = -12;

#[cfg(unix)]
const OS_DISK_FULL: i32 = 28; // ENOSPC
#[cfg(windows)]
const OS_DISK_FULL: i32 = 112; // ERROR_DISK_FULL

/// Map a crypto error onto the stable code table
pub fn crypto_error_code(err: &CryptoError) -> i32 {
    match err {
        CryptoError::InvalidKey(_) => ERROR_INVALID_KEY_SIZE,
        CryptoError::InvalidNonce(_)
        | CryptoError::InvalidFormat(_)
        | CryptoError::DataTooLarge { .. }
        | CryptoError::InvalidChunkSize(_) => ERROR_INVALID_FORMAT,
        CryptoError::Encryption(_)
        | CryptoError::ChunkOutOfOrder { .. }
        | CryptoError::ContextFinalized => ERROR_ENCRYPTION_FAILED,
        CryptoError::Decryption(_) => ERROR_DECRYPTION_FAILED,
        CryptoError::Io(e) => io_error_code(e),
    }
}

/// Map a copy error onto the stable code table
pub fn copy_error_code(err: &CopyError) -> i32 {
    match err {
        CopyError::InvalidChunkSize(_) | CopyError::Serialization(_) => ERROR_INVALID_FORMAT,
        CopyError::Cancelled => ERROR_CANCELLED,
        CopyError::ShortRead { .. } => ERROR_IO_FAILED,
        CopyError::InvalidPath(_) => ERROR_INVALID_PATH,
        CopyError::Io(e) => io_error_code(e),
    }
}

/// Map an IO error onto the stable code table
pub fn io_error_code(err: &std::io::Error) -> i32 {
    match err.kind() {
        std::io::ErrorKind::NotFound => ERROR_FILE_NOT_FOUND,
        std::io::ErrorKind::PermissionDenied => ERROR_PERMISSION_DENIED,
        _ if err.raw_os_error() == Some(OS_DISK_FULL) => ERROR_DISK_FULL,
        _ => ERROR_IO_FAILED,
    }
}

//! Legacy single-blob encryption and key derivation
//!
//! `encrypt_data`/`decrypt_data` carry the original small-payload format
//! `nonce(12) ‖ ciphertext ‖ tag(16)` and remain byte-compatible with
//! containers written by earlier releases.

use crate::{
    buffer::export_vec,
    codes::{
        ERROR_ALLOCATION_FAILED, ERROR_INVALID_FORMAT, ERROR_NULL_POINTER, SUCCESS,
        crypto_error_code,
    },
    ffi_guard, slice_from,
};
use nimbus_crypto::{KEY_SIZE, MasterKey, derive_key, open_blob, seal_blob};
use std::os::raw::c_char;
use std::ptr;

/// Encrypt a buffer with AES-256-GCM into `nonce ‖ ciphertext ‖ tag`
///
/// Returns an owned buffer (release with `free_buffer`) or null on failure.
///
/// # Safety
/// `data` must be valid for `data_len` bytes, `key` for `key_len` bytes, and
/// `output_len` must be a valid writable pointer.
#[no_mangle]
pub unsafe extern "C" fn encrypt_data(
    data: *const u8,
    data_len: usize,
    key: *const u8,
    key_len: usize,
    output_len: *mut usize,
) -> *mut u8 {
    ffi_guard(ptr::null_mut(), || {
        let Some(out_len) = (unsafe { output_len.as_mut() }) else {
            return ptr::null_mut();
        };
        *out_len = 0;

        let (Some(data), Some(key)) =
            (unsafe { slice_from(data, data_len) }, unsafe { slice_from(key, key_len) })
        else {
            return ptr::null_mut();
        };
        let Ok(master) = MasterKey::from_bytes(key) else {
            return ptr::null_mut();
        };

        match seal_blob(&master, data) {
            Ok(blob) => {
                *out_len = blob.len();
                export_vec(blob)
            }
            Err(_) => ptr::null_mut(),
        }
    })
}

/// Decrypt a buffer produced by `encrypt_data`
///
/// # Safety
/// Same pointer requirements as `encrypt_data`.
#[no_mangle]
pub unsafe extern "C" fn decrypt_data(
    encrypted_data: *const u8,
    encrypted_len: usize,
    key: *const u8,
    key_len: usize,
    output_len: *mut usize,
) -> *mut u8 {
    ffi_guard(ptr::null_mut(), || {
        let Some(out_len) = (unsafe { output_len.as_mut() }) else {
            return ptr::null_mut();
        };
        *out_len = 0;

        let (Some(blob), Some(key)) = (
            unsafe { slice_from(encrypted_data, encrypted_len) },
            unsafe { slice_from(key, key_len) },
        ) else {
            return ptr::null_mut();
        };
        let Ok(master) = MasterKey::from_bytes(key) else {
            return ptr::null_mut();
        };

        match open_blob(&master, blob) {
            Ok(plaintext) => {
                *out_len = plaintext.len();
                export_vec(plaintext)
            }
            Err(_) => ptr::null_mut(),
        }
    })
}

/// Derive a 32-byte key from a password with PBKDF2-HMAC-SHA256
///
/// Writes the key to `output_key` and returns `SUCCESS` or a negative code.
///
/// # Safety
/// `password` must be a valid NUL-terminated string, `salt` valid for
/// `salt_len` bytes, and `output_key` valid for 32 writable bytes.
#[no_mangle]
pub unsafe extern "C" fn derive_key_from_password(
    password: *const c_char,
    salt: *const u8,
    salt_len: usize,
    iterations: u32,
    output_key: *mut u8,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        if password.is_null() || output_key.is_null() {
            return ERROR_NULL_POINTER;
        }
        let Some(salt) = (unsafe { slice_from(salt, salt_len) }) else {
            return ERROR_NULL_POINTER;
        };
        let Ok(password) = (unsafe { std::ffi::CStr::from_ptr(password) }).to_str() else {
            return ERROR_INVALID_FORMAT;
        };

        match derive_key(password, salt, iterations) {
            Ok(key) => {
                unsafe {
                    ptr::copy_nonoverlapping(key.as_bytes().as_ptr(), output_key, KEY_SIZE);
                }
                SUCCESS
            }
            Err(e) => crypto_error_code(&e),
        }
    })
}

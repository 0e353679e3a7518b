//! Streaming context handles
//!
//! Opaque encryption/decryption contexts for callers that process one chunk
//! at a time. Handles are created and released only by this library; chunk
//! operations return `intptr_t`: a non-negative byte count on success, a
//! negative code on failure.

use crate::{
    buffer::export_vec,
    codes::{ERROR_ALLOCATION_FAILED, ERROR_NULL_POINTER, SUCCESS, crypto_error_code},
    ffi_guard, slice_from,
};
use nimbus_crypto::{MasterKey, StreamDecryptor, StreamEncryptor};
use std::ptr;

/// Opaque streaming encryption context
pub struct EncryptStream {
    inner: StreamEncryptor,
}

/// Opaque streaming decryption context
pub struct DecryptStream {
    inner: StreamDecryptor,
}

/// Create a streaming encryption context
///
/// On success writes the handle to `out_ctx` and the container prefix
/// (main header plus wrapped FEK, to be persisted before any chunk) to
/// `out_prefix`/`out_prefix_len`, and returns `SUCCESS`.
///
/// # Safety
/// `master_key` must be valid for `master_key_len` bytes; the out pointers
/// must be writable.
#[no_mangle]
pub unsafe extern "C" fn encrypt_stream_new(
    master_key: *const u8,
    master_key_len: usize,
    out_ctx: *mut *mut EncryptStream,
    out_prefix: *mut *mut u8,
    out_prefix_len: *mut usize,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        if out_ctx.is_null() || out_prefix.is_null() || out_prefix_len.is_null() {
            return ERROR_NULL_POINTER;
        }
        let Some(master) = (unsafe { slice_from(master_key, master_key_len) }) else {
            return ERROR_NULL_POINTER;
        };
        let master = match MasterKey::from_bytes(master) {
            Ok(k) => k,
            Err(e) => return crypto_error_code(&e),
        };

        match StreamEncryptor::new(&master) {
            Ok((inner, prefix)) => {
                let prefix = prefix.to_vec();
                unsafe {
                    *out_prefix_len = prefix.len();
                    *out_prefix = export_vec(prefix);
                    *out_ctx = Box::into_raw(Box::new(EncryptStream { inner }));
                }
                SUCCESS
            }
            Err(e) => crypto_error_code(&e),
        }
    })
}

/// Encrypt one chunk, producing a framed record
///
/// `chunk_index` must equal the context's next expected index. On success
/// writes the owned record to `out_buf` and returns its length; on failure
/// returns a negative code and leaves `out_buf` null.
///
/// # Safety
/// `ctx` must be a live handle from `encrypt_stream_new`; `data` must be
/// valid for `data_len` bytes; `out_buf` must be writable.
#[no_mangle]
pub unsafe extern "C" fn encrypt_stream_chunk(
    ctx: *mut EncryptStream,
    data: *const u8,
    data_len: usize,
    chunk_index: u32,
    out_buf: *mut *mut u8,
) -> isize {
    ffi_guard(ERROR_ALLOCATION_FAILED as isize, || {
        let Some(out_buf) = (unsafe { out_buf.as_mut() }) else {
            return ERROR_NULL_POINTER as isize;
        };
        *out_buf = ptr::null_mut();

        let Some(ctx) = (unsafe { ctx.as_mut() }) else {
            return ERROR_NULL_POINTER as isize;
        };
        let Some(data) = (unsafe { slice_from(data, data_len) }) else {
            return ERROR_NULL_POINTER as isize;
        };

        match ctx.inner.encrypt_chunk(data, chunk_index) {
            Ok(record) => {
                let len = record.len();
                *out_buf = export_vec(record.to_vec());
                len as isize
            }
            Err(e) => crypto_error_code(&e) as isize,
        }
    })
}

/// Release a streaming encryption context; the FEK is zeroed
///
/// # Safety
/// `ctx` must be null or a live handle from `encrypt_stream_new`; the
/// handle is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn encrypt_stream_free(ctx: *mut EncryptStream) {
    if !ctx.is_null() {
        drop(unsafe { Box::from_raw(ctx) });
    }
}

/// Create a streaming decryption context from the container prefix
///
/// `prefix` must hold at least `12 + wrapped_fek_len` contiguous bytes.
///
/// # Safety
/// `prefix` and `master_key` must be valid for their stated lengths;
/// `out_ctx` must be writable.
#[no_mangle]
pub unsafe extern "C" fn decrypt_stream_new(
    prefix: *const u8,
    prefix_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    out_ctx: *mut *mut DecryptStream,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        if out_ctx.is_null() {
            return ERROR_NULL_POINTER;
        }
        let (Some(prefix), Some(master)) = (
            unsafe { slice_from(prefix, prefix_len) },
            unsafe { slice_from(master_key, master_key_len) },
        ) else {
            return ERROR_NULL_POINTER;
        };
        let master = match MasterKey::from_bytes(master) {
            Ok(k) => k,
            Err(e) => return crypto_error_code(&e),
        };

        match StreamDecryptor::new(prefix, &master) {
            Ok(inner) => {
                unsafe {
                    *out_ctx = Box::into_raw(Box::new(DecryptStream { inner }));
                }
                SUCCESS
            }
            Err(e) => crypto_error_code(&e),
        }
    })
}

/// Decrypt one framed chunk record
///
/// Chunks must be supplied in index order. On success writes the owned
/// plaintext to `out_buf` and returns its length; any failure poisons the
/// context permanently.
///
/// # Safety
/// `ctx` must be a live handle from `decrypt_stream_new`; `chunk` must be
/// valid for `chunk_len` bytes; `out_buf` must be writable.
#[no_mangle]
pub unsafe extern "C" fn decrypt_stream_chunk(
    ctx: *mut DecryptStream,
    chunk: *const u8,
    chunk_len: usize,
    out_buf: *mut *mut u8,
) -> isize {
    ffi_guard(ERROR_ALLOCATION_FAILED as isize, || {
        let Some(out_buf) = (unsafe { out_buf.as_mut() }) else {
            return ERROR_NULL_POINTER as isize;
        };
        *out_buf = ptr::null_mut();

        let Some(ctx) = (unsafe { ctx.as_mut() }) else {
            return ERROR_NULL_POINTER as isize;
        };
        let Some(chunk) = (unsafe { slice_from(chunk, chunk_len) }) else {
            return ERROR_NULL_POINTER as isize;
        };

        match ctx.inner.decrypt_chunk(chunk) {
            Ok(plaintext) => {
                let len = plaintext.len();
                *out_buf = export_vec(plaintext.to_vec());
                len as isize
            }
            Err(e) => crypto_error_code(&e) as isize,
        }
    })
}

/// Release a streaming decryption context; the FEK is zeroed
///
/// # Safety
/// `ctx` must be null or a live handle from `decrypt_stream_new`; the
/// handle is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn decrypt_stream_free(ctx: *mut DecryptStream) {
    if !ctx.is_null() {
        drop(unsafe { Box::from_raw(ctx) });
    }
}

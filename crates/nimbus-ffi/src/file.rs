//! One-shot whole-file encryption entry points
//!
//! The streaming pair (`encrypt_file_streaming`/`decrypt_file_streaming`)
//! produces the chunked container; the `_with_fek` pair produces the
//! whole-file embedded-FEK form with a caller-supplied key. `encrypt_file`
//! and `decrypt_file` are the backward-compatible wrappers over streaming.

use crate::{
    ProgressCallback, UploadDataCallback,
    buffer::export_vec,
    codes::{ERROR_ALLOCATION_FAILED, ERROR_IO_FAILED, ERROR_NULL_POINTER, SUCCESS,
        crypto_error_code},
    ffi_guard, slice_from,
};
use nimbus_crypto::{
    DEFAULT_CHUNK_SIZE, FileKey, MasterKey, StreamEncryptor, decrypt_bytes,
    decrypt_with_file_key, encrypt_bytes, encrypt_with_file_key,
};
use std::os::raw::c_void;
use std::ptr;

/// Chunk index carried by the container prefix in `encrypt_file_to_callback`
pub const PREFIX_CHUNK_INDEX: u32 = u32::MAX;

/// Encrypt a whole buffer under a caller-supplied FEK wrapped by the master
/// key
///
/// # Safety
/// All data pointers must be valid for their stated lengths; `output_len`
/// must be writable.
#[no_mangle]
pub unsafe extern "C" fn encrypt_file_with_fek(
    file_data: *const u8,
    file_len: usize,
    fek: *const u8,
    fek_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    output_len: *mut usize,
) -> *mut u8 {
    ffi_guard(ptr::null_mut(), || {
        let Some(out_len) = (unsafe { output_len.as_mut() }) else {
            return ptr::null_mut();
        };
        *out_len = 0;

        let (Some(data), Some(fek), Some(master)) = (
            unsafe { slice_from(file_data, file_len) },
            unsafe { slice_from(fek, fek_len) },
            unsafe { slice_from(master_key, master_key_len) },
        ) else {
            return ptr::null_mut();
        };
        let (Ok(fek), Ok(master)) = (FileKey::from_bytes(fek), MasterKey::from_bytes(master))
        else {
            return ptr::null_mut();
        };

        match encrypt_with_file_key(data, &fek, &master) {
            Ok(out) => {
                *out_len = out.len();
                export_vec(out)
            }
            Err(_) => ptr::null_mut(),
        }
    })
}

/// Decrypt a buffer produced by `encrypt_file_with_fek`
///
/// # Safety
/// Same pointer requirements as `encrypt_file_with_fek`.
#[no_mangle]
pub unsafe extern "C" fn decrypt_file_with_fek(
    encrypted_data: *const u8,
    encrypted_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    output_len: *mut usize,
) -> *mut u8 {
    ffi_guard(ptr::null_mut(), || {
        let Some(out_len) = (unsafe { output_len.as_mut() }) else {
            return ptr::null_mut();
        };
        *out_len = 0;

        let (Some(data), Some(master)) = (
            unsafe { slice_from(encrypted_data, encrypted_len) },
            unsafe { slice_from(master_key, master_key_len) },
        ) else {
            return ptr::null_mut();
        };
        let Ok(master) = MasterKey::from_bytes(master) else {
            return ptr::null_mut();
        };

        match decrypt_with_file_key(data, &master) {
            Ok(out) => {
                *out_len = out.len();
                export_vec(out)
            }
            Err(_) => ptr::null_mut(),
        }
    })
}

/// Encrypt a whole buffer into the chunked container format
///
/// The optional progress callback fires after each chunk with
/// `(bytes_processed, total_bytes, user_data)`.
///
/// # Safety
/// All data pointers must be valid for their stated lengths; `output_len`
/// must be writable; `user_data` is passed through untouched.
#[no_mangle]
pub unsafe extern "C" fn encrypt_file_streaming(
    file_data: *const u8,
    file_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    output_len: *mut usize,
    progress_callback: ProgressCallback,
    user_data: *mut c_void,
) -> *mut u8 {
    ffi_guard(ptr::null_mut(), || {
        let Some(out_len) = (unsafe { output_len.as_mut() }) else {
            return ptr::null_mut();
        };
        *out_len = 0;

        let (Some(data), Some(master)) = (
            unsafe { slice_from(file_data, file_len) },
            unsafe { slice_from(master_key, master_key_len) },
        ) else {
            return ptr::null_mut();
        };
        let Ok(master) = MasterKey::from_bytes(master) else {
            return ptr::null_mut();
        };

        let progress = progress_callback
            .map(|cb| move |done: u64, total: u64| cb(done as usize, total as usize, user_data));
        let progress_ref = progress.as_ref().map(|f| f as &nimbus_crypto::ProgressFn);

        match encrypt_bytes(data, &master, DEFAULT_CHUNK_SIZE, progress_ref) {
            Ok(out) => {
                *out_len = out.len();
                export_vec(out)
            }
            Err(_) => ptr::null_mut(),
        }
    })
}

/// Decrypt a chunked container produced by `encrypt_file_streaming`
///
/// # Safety
/// Same pointer requirements as `encrypt_file_streaming`.
#[no_mangle]
pub unsafe extern "C" fn decrypt_file_streaming(
    encrypted_data: *const u8,
    encrypted_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    output_len: *mut usize,
    progress_callback: ProgressCallback,
    user_data: *mut c_void,
) -> *mut u8 {
    ffi_guard(ptr::null_mut(), || {
        let Some(out_len) = (unsafe { output_len.as_mut() }) else {
            return ptr::null_mut();
        };
        *out_len = 0;

        let (Some(data), Some(master)) = (
            unsafe { slice_from(encrypted_data, encrypted_len) },
            unsafe { slice_from(master_key, master_key_len) },
        ) else {
            return ptr::null_mut();
        };
        let Ok(master) = MasterKey::from_bytes(master) else {
            return ptr::null_mut();
        };

        let progress = progress_callback
            .map(|cb| move |done: u64, total: u64| cb(done as usize, total as usize, user_data));
        let progress_ref = progress.as_ref().map(|f| f as &nimbus_crypto::ProgressFn);

        match decrypt_bytes(data, &master, progress_ref) {
            Ok(out) => {
                *out_len = out.len();
                export_vec(out)
            }
            Err(_) => ptr::null_mut(),
        }
    })
}

/// Backward-compatible wrapper: chunked container, no progress reporting
///
/// # Safety
/// Same pointer requirements as `encrypt_file_streaming`.
#[no_mangle]
pub unsafe extern "C" fn encrypt_file(
    file_data: *const u8,
    file_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    output_len: *mut usize,
) -> *mut u8 {
    unsafe {
        encrypt_file_streaming(
            file_data,
            file_len,
            master_key,
            master_key_len,
            output_len,
            None,
            ptr::null_mut(),
        )
    }
}

/// Backward-compatible wrapper: chunked container, no progress reporting
///
/// # Safety
/// Same pointer requirements as `decrypt_file_streaming`.
#[no_mangle]
pub unsafe extern "C" fn decrypt_file(
    encrypted_data: *const u8,
    encrypted_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    output_len: *mut usize,
) -> *mut u8 {
    unsafe {
        decrypt_file_streaming(
            encrypted_data,
            encrypted_len,
            master_key,
            master_key_len,
            output_len,
            None,
            ptr::null_mut(),
        )
    }
}

/// Encrypt a buffer chunk by chunk, handing each record to an upload
/// callback
///
/// The container prefix is delivered first with `chunk_index` set to
/// [`PREFIX_CHUNK_INDEX`]; data chunks follow with their real indices. A
/// negative callback return aborts with `ERROR_IO_FAILED`. `chunk_size` 0
/// selects the default (1 MiB).
///
/// # Safety
/// All data pointers must be valid for their stated lengths; `user_data` is
/// passed through untouched.
#[no_mangle]
pub unsafe extern "C" fn encrypt_file_to_callback(
    file_data: *const u8,
    file_len: usize,
    master_key: *const u8,
    master_key_len: usize,
    chunk_size: usize,
    upload_callback: UploadDataCallback,
    progress_callback: ProgressCallback,
    user_data: *mut c_void,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        let Some(upload) = upload_callback else {
            return ERROR_NULL_POINTER;
        };
        let (Some(data), Some(master)) = (
            unsafe { slice_from(file_data, file_len) },
            unsafe { slice_from(master_key, master_key_len) },
        ) else {
            return ERROR_NULL_POINTER;
        };
        let master = match MasterKey::from_bytes(master) {
            Ok(k) => k,
            Err(e) => return crypto_error_code(&e),
        };
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };

        let (mut encryptor, prefix) = match StreamEncryptor::new(&master) {
            Ok(pair) => pair,
            Err(e) => return crypto_error_code(&e),
        };
        if upload(prefix.as_ptr(), prefix.len(), PREFIX_CHUNK_INDEX, user_data) < 0 {
            return ERROR_IO_FAILED;
        }

        let total = data.len() as u64;
        let mut processed = 0u64;
        let chunks: Vec<&[u8]> = if data.is_empty() {
            vec![data]
        } else {
            data.chunks(chunk_size).collect()
        };
        for (index, chunk) in chunks.into_iter().enumerate() {
            let record = match encryptor.encrypt_chunk(chunk, index as u32) {
                Ok(record) => record,
                Err(e) => return crypto_error_code(&e),
            };
            if upload(record.as_ptr(), record.len(), index as u32, user_data) < 0 {
                return ERROR_IO_FAILED;
            }
            processed += chunk.len() as u64;
            if let Some(cb) = progress_callback {
                cb(processed as usize, total as usize, user_data);
            }
        }

        encryptor.finalize();
        SUCCESS
    })
}

//! Unified copy context over caller transports
//!
//! The context drives `nimbus_copy::CopyOrchestrator` against positioned
//! read/write callbacks. The caller owns the cancel flag's storage (a plain
//! `int32_t` word); the context reads it atomically at each chunk boundary
//! and never writes it.

use crate::{
    ProgressCallback, UnifiedReadCallback, UnifiedWriteCallback, UserData,
    codes::{ERROR_ALLOCATION_FAILED, ERROR_NULL_POINTER, SUCCESS, copy_error_code},
    ffi_guard,
};
use nimbus_copy::{CancelSignal, CopyConfig, CopyOrchestrator};
use std::io;
use std::os::raw::c_void;
use std::sync::atomic::{AtomicI32, Ordering};

/// Opaque unified copy context
pub struct UnifiedCopyContext {
    orchestrator: CopyOrchestrator,
}

/// Caller-owned cancel word, read with acquire ordering
struct RawCancelWord(UserData);

impl CancelSignal for RawCancelWord {
    fn is_cancelled(&self) -> bool {
        let ptr = self.0.0 as *mut i32;
        unsafe { AtomicI32::from_ptr(ptr) }.load(Ordering::Acquire) != 0
    }
}

/// Create a unified copy context
///
/// `chunk_size` must be within [64 KiB, 10 MiB]. `total_bytes` and
/// `total_files` may be 0 when unknown. `cancel_flag` may be null; when
/// non-null it must stay valid for the context's lifetime, and any non-zero
/// value cancels the copy. The optional progress callback fires after each
/// written chunk.
///
/// # Safety
/// `out_ctx` must be writable; `cancel_flag`, when non-null, must point to
/// an `int32_t` that outlives the context; `user_data` is passed through
/// untouched.
#[no_mangle]
pub unsafe extern "C" fn unified_copy_new(
    chunk_size: usize,
    total_bytes: u64,
    total_files: u32,
    cancel_flag: *const i32,
    progress_callback: ProgressCallback,
    user_data: *mut c_void,
    out_ctx: *mut *mut UnifiedCopyContext,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        if out_ctx.is_null() {
            return ERROR_NULL_POINTER;
        }

        let config = CopyConfig::new(chunk_size)
            .with_total_bytes(total_bytes)
            .with_total_files(total_files);
        let mut orchestrator = match CopyOrchestrator::new(config) {
            Ok(orchestrator) => orchestrator,
            Err(e) => return copy_error_code(&e),
        };

        if !cancel_flag.is_null() {
            orchestrator =
                orchestrator.with_cancel(RawCancelWord(UserData(cancel_flag as *mut c_void)));
        }
        if let Some(cb) = progress_callback {
            let user = UserData(user_data);
            orchestrator = orchestrator.with_progress(Box::new(move |p| {
                let user = user;
                cb(p.bytes_copied as usize, p.total_bytes as usize, user.0);
            }));
        }

        unsafe {
            *out_ctx = Box::into_raw(Box::new(UnifiedCopyContext { orchestrator }));
        }
        SUCCESS
    })
}

/// Copy one file of `file_size` bytes through the callbacks
///
/// Returns 1 when the context expects more files, 0 when this was the last
/// expected file, or a negative code on failure. Read callbacks returning 0
/// before `file_size` bytes were delivered surface as `ERROR_IO_FAILED`.
///
/// # Safety
/// `ctx` must be a live handle from `unified_copy_new`; the callbacks must
/// be valid function pointers honoring the documented contract; `user_data`
/// is passed through untouched.
#[no_mangle]
pub unsafe extern "C" fn unified_copy_file(
    ctx: *mut UnifiedCopyContext,
    file_size: u64,
    read_callback: UnifiedReadCallback,
    write_callback: UnifiedWriteCallback,
    user_data: *mut c_void,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        let Some(ctx) = (unsafe { ctx.as_mut() }) else {
            return ERROR_NULL_POINTER;
        };
        let (Some(read_cb), Some(write_cb)) = (read_callback, write_callback) else {
            return ERROR_NULL_POINTER;
        };

        let result = ctx.orchestrator.copy_file(
            file_size,
            |buf, offset| {
                let n = read_cb(buf.as_mut_ptr(), buf.len(), offset, user_data);
                if n < 0 {
                    Err(io::Error::other("read callback failed"))
                } else if n as usize > buf.len() {
                    Err(io::Error::other("read callback overran the buffer"))
                } else {
                    Ok(n as usize)
                }
            },
            |data, offset| {
                if write_cb(data.as_ptr(), data.len(), offset, user_data) < 0 {
                    Err(io::Error::other("write callback failed"))
                } else {
                    Ok(())
                }
            },
        );

        match result {
            Ok(()) => i32::from(ctx.orchestrator.has_remaining_files()),
            Err(e) => copy_error_code(&e),
        }
    })
}

/// Bytes copied so far across all files driven through the context
///
/// Safe to call from a thread other than the one driving the copy.
///
/// # Safety
/// `ctx` must be null or a live handle from `unified_copy_new`.
#[no_mangle]
pub unsafe extern "C" fn unified_copy_bytes_copied(ctx: *const UnifiedCopyContext) -> u64 {
    match unsafe { ctx.as_ref() } {
        Some(ctx) => ctx.orchestrator.bytes_copied(),
        None => 0,
    }
}

/// Files fully copied so far
///
/// # Safety
/// `ctx` must be null or a live handle from `unified_copy_new`.
#[no_mangle]
pub unsafe extern "C" fn unified_copy_files_processed(ctx: *const UnifiedCopyContext) -> u32 {
    match unsafe { ctx.as_ref() } {
        Some(ctx) => ctx.orchestrator.files_processed(),
        None => 0,
    }
}

/// Release a unified copy context
///
/// # Safety
/// `ctx` must be null or a live handle from `unified_copy_new`; the handle
/// is invalid after this call.
#[no_mangle]
pub unsafe extern "C" fn unified_copy_free(ctx: *mut UnifiedCopyContext) {
    if !ctx.is_null() {
        drop(unsafe { Box::from_raw(ctx) });
    }
}

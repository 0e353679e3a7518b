//! # Nimbus FFI
//!
//! C ABI over the nimbus encryption and copy core.
//!
//! ## Conventions
//!
//! - Every buffer returned by this library is owned by the library and must
//!   be released with [`free_buffer`]; see the ledger in [`buffer`].
//! - Contexts are opaque handles created and released only by this library
//!   through their `_new`/`_free` pairs.
//! - Functions returning pointers return null on failure; functions
//!   returning `int32_t`/`intptr_t` return a code from [`codes`] (negative)
//!   or a byte count / `SUCCESS`.
//! - All pointers are null-checked; panics are caught at the boundary and
//!   never unwind into the caller.
//! - Callbacks must not re-enter the context they were invoked from.

pub mod buffer;
pub mod codes;
pub mod copy;
pub mod data;
pub mod file;
pub mod scan;
pub mod stream;

pub use buffer::free_buffer;
pub use codes::*;

use std::os::raw::c_void;

/// Progress callback: `(bytes_processed, total_bytes, user_data)`
pub type ProgressCallback =
    Option<extern "C" fn(bytes_processed: usize, total_bytes: usize, user_data: *mut c_void)>;

/// Per-chunk upload callback: `(data, len, chunk_index, user_data)`;
/// negative return aborts the operation
pub type UploadDataCallback = Option<
    extern "C" fn(data: *const u8, len: usize, chunk_index: u32, user_data: *mut c_void) -> i32,
>;

/// Positioned read callback: returns bytes read, 0 on EOF, negative on error
pub type UnifiedReadCallback = Option<
    extern "C" fn(buffer: *mut u8, buffer_len: usize, offset: u64, user_data: *mut c_void) -> i64,
>;

/// Positioned write callback: returns negative on error
pub type UnifiedWriteCallback = Option<
    extern "C" fn(data: *const u8, len: usize, offset: u64, user_data: *mut c_void) -> i32,
>;

/// View caller memory as a slice; empty lengths need no pointer
///
/// # Safety
/// `ptr` must be valid for `len` bytes for the duration of the call.
pub(crate) unsafe fn slice_from<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Run an FFI body, converting any panic into `fallback`
pub(crate) fn ffi_guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or(fallback)
}

/// Caller-supplied opaque pointer, passed through to callbacks untouched
///
/// The wrapper exists so closures capturing it satisfy `Send + Sync`
/// bounds; the library itself never dereferences the pointer.
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub *mut c_void);

unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

//! Folder scan over the C ABI

use crate::{
    buffer::export_vec,
    codes::{ERROR_ALLOCATION_FAILED, ERROR_INVALID_PATH, ERROR_NULL_POINTER, SUCCESS, copy_error_code},
    ffi_guard,
};
use nimbus_copy::scan_folder;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

/// Recursively scan a directory and return its listing as UTF-8 JSON
///
/// The JSON object carries `root_path`, `items[]` (each with
/// `relative_path`, `name`, `is_folder`, `size`, `absolute_path`),
/// aggregate counts, and `scan_duration_ms`. On success writes the owned
/// buffer to `out_buf`/`out_len` (release with `free_buffer`) and returns
/// `SUCCESS`.
///
/// # Safety
/// `root_path` must be a valid NUL-terminated string; the out pointers must
/// be writable.
#[no_mangle]
pub unsafe extern "C" fn scan_folder_json(
    root_path: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut usize,
) -> i32 {
    ffi_guard(ERROR_ALLOCATION_FAILED, || {
        if root_path.is_null() || out_buf.is_null() || out_len.is_null() {
            return ERROR_NULL_POINTER;
        }
        unsafe {
            *out_buf = ptr::null_mut();
            *out_len = 0;
        }

        let Ok(root) = (unsafe { std::ffi::CStr::from_ptr(root_path) }).to_str() else {
            return ERROR_INVALID_PATH;
        };

        match scan_folder(Path::new(root)).and_then(|result| result.to_json()) {
            Ok(json) => {
                let bytes = json.into_bytes();
                unsafe {
                    *out_len = bytes.len();
                    *out_buf = export_vec(bytes);
                }
                SUCCESS
            }
            Err(e) => copy_error_code(&e),
        }
    })
}

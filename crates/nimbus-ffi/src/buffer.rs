//! Owned-buffer ledger for the C ABI
//!
//! Every byte buffer handed to a C caller is a `Vec<u8>` whose pointer,
//! length, and capacity are recorded here. [`free_buffer`] reconstitutes the
//! vector from the ledger and drops it, which keeps the core
//! allocator-agnostic: callers never `free()` our memory, and we never free
//! theirs.

use std::collections::HashMap;
use std::mem::ManuallyDrop;
use std::sync::{LazyLock, Mutex};
use tracing::warn;

struct BufferRecord {
    len: usize,
    cap: usize,
}

static LEDGER: LazyLock<Mutex<HashMap<usize, BufferRecord>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Hand a vector's storage to the caller, recording it for later release
pub(crate) fn export_vec(vec: Vec<u8>) -> *mut u8 {
    let mut vec = ManuallyDrop::new(vec);
    let ptr = vec.as_mut_ptr();
    let record = BufferRecord {
        len: vec.len(),
        cap: vec.capacity(),
    };
    LEDGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(ptr as usize, record);
    ptr
}

#[cfg(test)]
pub(crate) fn registered_len(ptr: *const u8) -> Option<usize> {
    LEDGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(&(ptr as usize))
        .map(|r| r.len)
}

/// Release a buffer previously returned by this library
///
/// Null and unknown pointers are ignored; double frees are therefore safe,
/// though the second call is logged.
#[no_mangle]
pub extern "C" fn free_buffer(buffer: *mut u8) {
    if buffer.is_null() {
        return;
    }
    let record = LEDGER
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .remove(&(buffer as usize));
    match record {
        Some(r) => unsafe {
            drop(Vec::from_raw_parts(buffer, r.len, r.cap));
        },
        None => warn!(ptr = buffer as usize, "free_buffer: unknown pointer"),
    }
}

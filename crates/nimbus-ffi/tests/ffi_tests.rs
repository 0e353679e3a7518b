//! C ABI tests: round-trips, error codes, and buffer ownership

use nimbus_ffi::{
    ERROR_DECRYPTION_FAILED, ERROR_ENCRYPTION_FAILED, ERROR_INVALID_FORMAT,
    ERROR_INVALID_PATH, ERROR_NULL_POINTER, SUCCESS, free_buffer,
};
use nimbus_ffi::copy::{
    unified_copy_bytes_copied, unified_copy_file, unified_copy_files_processed,
    unified_copy_free, unified_copy_new,
};
use nimbus_ffi::data::{decrypt_data, derive_key_from_password, encrypt_data};
use nimbus_ffi::file::{
    PREFIX_CHUNK_INDEX, decrypt_file, decrypt_file_with_fek, encrypt_file,
    encrypt_file_streaming, encrypt_file_to_callback, encrypt_file_with_fek,
};
use nimbus_ffi::scan::scan_folder_json;
use nimbus_ffi::stream::{
    decrypt_stream_chunk, decrypt_stream_free, decrypt_stream_new, encrypt_stream_chunk,
    encrypt_stream_free, encrypt_stream_new,
};
use std::os::raw::c_void;
use std::ptr;

const KEY: [u8; 32] = [0x42; 32];

/// Copy an FFI-owned buffer into a Vec and release it
unsafe fn take(ptr: *mut u8, len: usize) -> Vec<u8> {
    assert!(!ptr.is_null());
    let out = unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec();
    free_buffer(ptr);
    out
}

#[test]
fn encrypt_decrypt_data_roundtrip() {
    let plaintext = b"small payload";
    let mut enc_len = 0usize;
    let enc_ptr = unsafe {
        encrypt_data(
            plaintext.as_ptr(),
            plaintext.len(),
            KEY.as_ptr(),
            KEY.len(),
            &mut enc_len,
        )
    };
    // nonce(12) + ciphertext + tag(16)
    assert_eq!(enc_len, 12 + plaintext.len() + 16);
    let blob = unsafe { take(enc_ptr, enc_len) };

    let mut dec_len = 0usize;
    let dec_ptr = unsafe {
        decrypt_data(blob.as_ptr(), blob.len(), KEY.as_ptr(), KEY.len(), &mut dec_len)
    };
    let decrypted = unsafe { take(dec_ptr, dec_len) };
    assert_eq!(decrypted.as_slice(), plaintext.as_slice());
}

#[test]
fn null_and_bad_key_inputs_return_null() {
    let mut out_len = 0usize;
    let data = [1u8; 4];

    let p = unsafe { encrypt_data(ptr::null(), 4, KEY.as_ptr(), 32, &mut out_len) };
    assert!(p.is_null());

    let p = unsafe { encrypt_data(data.as_ptr(), 4, KEY.as_ptr(), 31, &mut out_len) };
    assert!(p.is_null());

    let p = unsafe { encrypt_data(data.as_ptr(), 4, KEY.as_ptr(), 32, ptr::null_mut()) };
    assert!(p.is_null());
}

#[test]
fn derive_key_matches_core() {
    let mut key = [0u8; 32];
    let rc = unsafe {
        derive_key_from_password(
            c"password".as_ptr(),
            b"salt".as_ptr(),
            4,
            4096,
            key.as_mut_ptr(),
        )
    };
    assert_eq!(rc, SUCCESS);

    let expected = nimbus_crypto::derive_key("password", b"salt", 4096).unwrap();
    assert_eq!(&key, expected.as_bytes());
}

#[test]
fn derive_key_null_checks() {
    let mut key = [0u8; 32];
    let rc = unsafe {
        derive_key_from_password(ptr::null(), b"salt".as_ptr(), 4, 1000, key.as_mut_ptr())
    };
    assert_eq!(rc, ERROR_NULL_POINTER);

    let rc = unsafe {
        derive_key_from_password(c"pw".as_ptr(), b"salt".as_ptr(), 4, 1000, ptr::null_mut())
    };
    assert_eq!(rc, ERROR_NULL_POINTER);
}

#[test]
fn file_roundtrip_through_simple_wrappers() {
    let plaintext: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();

    let mut enc_len = 0usize;
    let enc_ptr = unsafe {
        encrypt_file(
            plaintext.as_ptr(),
            plaintext.len(),
            KEY.as_ptr(),
            KEY.len(),
            &mut enc_len,
        )
    };
    let container = unsafe { take(enc_ptr, enc_len) };

    let mut dec_len = 0usize;
    let dec_ptr = unsafe {
        decrypt_file(
            container.as_ptr(),
            container.len(),
            KEY.as_ptr(),
            KEY.len(),
            &mut dec_len,
        )
    };
    let decrypted = unsafe { take(dec_ptr, dec_len) };
    assert_eq!(decrypted, plaintext);
}

#[test]
fn embedded_fek_roundtrip() {
    let fek = [0x07u8; 32];
    let plaintext = b"approach one payload";

    let mut enc_len = 0usize;
    let enc_ptr = unsafe {
        encrypt_file_with_fek(
            plaintext.as_ptr(),
            plaintext.len(),
            fek.as_ptr(),
            fek.len(),
            KEY.as_ptr(),
            KEY.len(),
            &mut enc_len,
        )
    };
    // header(12) + wrapped fek(60) + nonce(12) + data + tag(16)
    assert_eq!(enc_len, 12 + 60 + 12 + plaintext.len() + 16);
    let container = unsafe { take(enc_ptr, enc_len) };

    let mut dec_len = 0usize;
    let dec_ptr = unsafe {
        decrypt_file_with_fek(
            container.as_ptr(),
            container.len(),
            KEY.as_ptr(),
            KEY.len(),
            &mut dec_len,
        )
    };
    let decrypted = unsafe { take(dec_ptr, dec_len) };
    assert_eq!(decrypted.as_slice(), plaintext.as_slice());
}

extern "C" fn record_progress(bytes: usize, total: usize, user_data: *mut c_void) {
    let log = unsafe { &mut *(user_data as *mut Vec<(usize, usize)>) };
    log.push((bytes, total));
}

#[test]
fn streaming_progress_reported() {
    let plaintext = vec![9u8; 3_000_000];
    let mut log: Vec<(usize, usize)> = Vec::new();

    let mut enc_len = 0usize;
    let enc_ptr = unsafe {
        encrypt_file_streaming(
            plaintext.as_ptr(),
            plaintext.len(),
            KEY.as_ptr(),
            KEY.len(),
            &mut enc_len,
            Some(record_progress),
            &mut log as *mut _ as *mut c_void,
        )
    };
    let _container = unsafe { take(enc_ptr, enc_len) };

    // 1 MiB default chunks over 3 MB => 3 chunks
    assert_eq!(log.len(), 3);
    assert!(log.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(*log.last().unwrap(), (plaintext.len(), plaintext.len()));
}

#[test]
fn stream_context_roundtrip_and_ordering() {
    let mut enc_ctx = ptr::null_mut();
    let mut prefix_ptr = ptr::null_mut();
    let mut prefix_len = 0usize;
    let rc = unsafe {
        encrypt_stream_new(
            KEY.as_ptr(),
            KEY.len(),
            &mut enc_ctx,
            &mut prefix_ptr,
            &mut prefix_len,
        )
    };
    assert_eq!(rc, SUCCESS);
    assert_eq!(prefix_len, 72); // header(12) + wrapped fek(60)
    let prefix = unsafe { take(prefix_ptr, prefix_len) };

    // out-of-order index is rejected without advancing the context
    let mut rec_ptr = ptr::null_mut();
    let rc = unsafe { encrypt_stream_chunk(enc_ctx, b"x".as_ptr(), 1, 5, &mut rec_ptr) };
    assert_eq!(rc, ERROR_ENCRYPTION_FAILED as isize);
    assert!(rec_ptr.is_null());

    let chunks: Vec<Vec<u8>> = [b"alpha".as_slice(), b"beta".as_slice()]
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut rec_ptr = ptr::null_mut();
            let n = unsafe {
                encrypt_stream_chunk(enc_ctx, part.as_ptr(), part.len(), i as u32, &mut rec_ptr)
            };
            assert_eq!(n as usize, 36 + part.len());
            unsafe { take(rec_ptr, n as usize) }
        })
        .collect();
    unsafe { encrypt_stream_free(enc_ctx) };

    let mut dec_ctx = ptr::null_mut();
    let rc = unsafe {
        decrypt_stream_new(prefix.as_ptr(), prefix.len(), KEY.as_ptr(), KEY.len(), &mut dec_ctx)
    };
    assert_eq!(rc, SUCCESS);

    for (chunk, expected) in chunks.iter().zip([b"alpha".as_slice(), b"beta".as_slice()]) {
        let mut out_ptr = ptr::null_mut();
        let n = unsafe { decrypt_stream_chunk(dec_ctx, chunk.as_ptr(), chunk.len(), &mut out_ptr) };
        assert_eq!(n as usize, expected.len());
        assert_eq!(unsafe { take(out_ptr, n as usize) }.as_slice(), expected);
    }
    unsafe { decrypt_stream_free(dec_ctx) };
}

#[test]
fn wrong_master_key_reported_at_decrypt_init() {
    let mut enc_ctx = ptr::null_mut();
    let mut prefix_ptr = ptr::null_mut();
    let mut prefix_len = 0usize;
    unsafe {
        encrypt_stream_new(KEY.as_ptr(), KEY.len(), &mut enc_ctx, &mut prefix_ptr, &mut prefix_len)
    };
    let prefix = unsafe { take(prefix_ptr, prefix_len) };
    unsafe { encrypt_stream_free(enc_ctx) };

    let wrong = [0x24u8; 32];
    let mut dec_ctx = ptr::null_mut();
    let rc = unsafe {
        decrypt_stream_new(prefix.as_ptr(), prefix.len(), wrong.as_ptr(), wrong.len(), &mut dec_ctx)
    };
    assert_eq!(rc, ERROR_DECRYPTION_FAILED);
    assert!(dec_ctx.is_null());
}

#[test]
fn garbage_prefix_is_invalid_format() {
    let garbage = [0xEEu8; 72];
    let mut dec_ctx = ptr::null_mut();
    let rc = unsafe {
        decrypt_stream_new(garbage.as_ptr(), garbage.len(), KEY.as_ptr(), KEY.len(), &mut dec_ctx)
    };
    assert_eq!(rc, ERROR_INVALID_FORMAT);
}

extern "C" fn collect_upload(data: *const u8, len: usize, chunk_index: u32, user_data: *mut c_void) -> i32 {
    let sink = unsafe { &mut *(user_data as *mut Vec<(u32, Vec<u8>)>) };
    let bytes = unsafe { std::slice::from_raw_parts(data, len) }.to_vec();
    sink.push((chunk_index, bytes));
    0
}

#[test]
fn upload_callback_pipeline_reassembles_to_valid_container() {
    let plaintext: Vec<u8> = (0..300_000).map(|i| (i % 241) as u8).collect();
    let mut sink: Vec<(u32, Vec<u8>)> = Vec::new();

    let rc = unsafe {
        encrypt_file_to_callback(
            plaintext.as_ptr(),
            plaintext.len(),
            KEY.as_ptr(),
            KEY.len(),
            100_000,
            Some(collect_upload),
            None,
            &mut sink as *mut _ as *mut c_void,
        )
    };
    assert_eq!(rc, SUCCESS);

    // prefix first, then data chunks 0..3
    assert_eq!(sink[0].0, PREFIX_CHUNK_INDEX);
    assert_eq!(
        sink[1..].iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    let container: Vec<u8> = sink.iter().flat_map(|(_, bytes)| bytes.clone()).collect();
    let mut dec_len = 0usize;
    let dec_ptr = unsafe {
        decrypt_file(container.as_ptr(), container.len(), KEY.as_ptr(), KEY.len(), &mut dec_len)
    };
    assert_eq!(unsafe { take(dec_ptr, dec_len) }, plaintext);
}

struct CopyHarness {
    source: Vec<u8>,
    sink: Vec<u8>,
    reads: usize,
    cancel_after_reads: Option<(usize, *mut i32)>,
}

extern "C" fn harness_read(buf: *mut u8, buf_len: usize, offset: u64, user_data: *mut c_void) -> i64 {
    let h = unsafe { &mut *(user_data as *mut CopyHarness) };
    h.reads += 1;
    if let Some((after, flag)) = h.cancel_after_reads {
        if h.reads >= after {
            unsafe { *flag = 1 };
        }
    }
    let start = offset as usize;
    let n = buf_len.min(h.source.len() - start);
    unsafe { ptr::copy_nonoverlapping(h.source.as_ptr().add(start), buf, n) };
    n as i64
}

extern "C" fn harness_write(data: *const u8, len: usize, offset: u64, user_data: *mut c_void) -> i32 {
    let h = unsafe { &mut *(user_data as *mut CopyHarness) };
    let start = offset as usize;
    h.sink[start..start + len].copy_from_slice(unsafe { std::slice::from_raw_parts(data, len) });
    0
}

#[test]
fn unified_copy_single_file() {
    const MIB: usize = 1024 * 1024;
    let file_size = 25 * MIB;
    let mut harness = CopyHarness {
        source: (0..file_size).map(|i| (i % 239) as u8).collect(),
        sink: vec![0u8; file_size],
        reads: 0,
        cancel_after_reads: None,
    };
    let user_data = &mut harness as *mut _ as *mut c_void;

    let mut ctx = ptr::null_mut();
    let rc = unsafe {
        unified_copy_new(
            10 * MIB,
            file_size as u64,
            1,
            ptr::null(),
            None,
            ptr::null_mut(),
            &mut ctx,
        )
    };
    assert_eq!(rc, SUCCESS);

    let rc = unsafe {
        unified_copy_file(ctx, file_size as u64, Some(harness_read), Some(harness_write), user_data)
    };
    assert_eq!(rc, 0); // last expected file
    assert_eq!(harness.reads, 3);
    assert_eq!(harness.sink, harness.source);
    assert_eq!(unsafe { unified_copy_bytes_copied(ctx) }, file_size as u64);
    assert_eq!(unsafe { unified_copy_files_processed(ctx) }, 1);

    unsafe { unified_copy_free(ctx) };
}

#[test]
fn unified_copy_cancellation() {
    const MIB: usize = 1024 * 1024;
    let file_size = 25 * MIB;
    let mut cancel_word: i32 = 0;
    let cancel_ptr = &mut cancel_word as *mut i32;
    let mut harness = CopyHarness {
        source: vec![0u8; file_size],
        sink: vec![0u8; file_size],
        reads: 0,
        cancel_after_reads: Some((2, cancel_ptr)),
    };
    let user_data = &mut harness as *mut _ as *mut c_void;

    let mut ctx = ptr::null_mut();
    unsafe {
        unified_copy_new(
            10 * MIB,
            file_size as u64,
            1,
            cancel_ptr,
            None,
            ptr::null_mut(),
            &mut ctx,
        )
    };

    let rc = unsafe {
        unified_copy_file(ctx, file_size as u64, Some(harness_read), Some(harness_write), user_data)
    };
    assert_eq!(rc, nimbus_ffi::ERROR_CANCELLED);
    assert!(unsafe { unified_copy_bytes_copied(ctx) } <= 20 * MIB as u64);

    unsafe { unified_copy_free(ctx) };
}

#[test]
fn unified_copy_rejects_bad_chunk_size() {
    let mut ctx = ptr::null_mut();
    let rc = unsafe {
        unified_copy_new(1024, 0, 0, ptr::null(), None, ptr::null_mut(), &mut ctx)
    };
    assert_eq!(rc, ERROR_INVALID_FORMAT);
    assert!(ctx.is_null());
}

#[test]
fn scan_folder_json_contract() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("a.bin"), vec![0u8; 64]).unwrap();
    std::fs::write(dir.path().join("sub/b.bin"), vec![0u8; 32]).unwrap();

    let root = std::ffi::CString::new(dir.path().to_str().unwrap()).unwrap();
    let mut out_buf = ptr::null_mut();
    let mut out_len = 0usize;
    let rc = unsafe { scan_folder_json(root.as_ptr(), &mut out_buf, &mut out_len) };
    assert_eq!(rc, SUCCESS);

    let json = unsafe { take(out_buf, out_len) };
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["total_files"], 2);
    assert_eq!(value["total_folders"], 1);
    assert_eq!(value["total_size"], 96);
    assert_eq!(value["items"].as_array().unwrap().len(), 3);

    let missing = std::ffi::CString::new("/definitely/not/here").unwrap();
    let rc = unsafe { scan_folder_json(missing.as_ptr(), &mut out_buf, &mut out_len) };
    assert_eq!(rc, ERROR_INVALID_PATH);
}

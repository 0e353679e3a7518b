//! One-shot file helpers over the streaming core
//!
//! Whole-buffer conveniences for callers that do not need incremental
//! processing. Three formats live here:
//!
//! - the chunked container ([`encrypt_bytes`] / [`decrypt_bytes`]), driven
//!   through the streaming contexts;
//! - the legacy single blob `nonce(12) ‖ ciphertext ‖ tag(16)` used for
//!   small payloads ([`seal_blob`] / [`open_blob`]);
//! - the whole-file embedded-FEK form `MainHeader ‖ WrappedFEK ‖ nonce ‖
//!   ciphertext ‖ tag` with a caller-supplied FEK
//!   ([`encrypt_with_file_key`] / [`decrypt_with_file_key`]).
//!
//! The formats share no entry points; callers pick one and stay with it.

use crate::{
    CryptoError, Result, aead,
    aead::Nonce,
    format::{self, MainHeader, CHUNK_HEADER_LEN, CHUNK_OVERHEAD, HEADER_LEN,
        MAX_CHUNK_PLAINTEXT_LEN},
    keys::{FileKey, MasterKey, NONCE_SIZE, TAG_SIZE},
    stream::{StreamDecryptor, StreamEncryptor},
    wrap,
};
use tracing::debug;

/// Default chunk size for one-shot encryption (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Progress observer: `(bytes_processed, total_bytes)`
///
/// Invoked after each chunk; the first argument is monotonically
/// non-decreasing and reaches `total_bytes` on success.
pub type ProgressFn = dyn Fn(u64, u64);

/// Encrypt a whole buffer into the chunked container format
///
/// Empty input produces a container with a single empty-payload chunk.
pub fn encrypt_bytes(
    data: &[u8],
    master: &MasterKey,
    chunk_size: usize,
    progress: Option<&ProgressFn>,
) -> Result<Vec<u8>> {
    if chunk_size == 0 || chunk_size > MAX_CHUNK_PLAINTEXT_LEN {
        return Err(CryptoError::InvalidChunkSize(chunk_size));
    }

    let (mut encryptor, prefix) = StreamEncryptor::new(master)?;
    let num_chunks = if data.is_empty() {
        1
    } else {
        data.len().div_ceil(chunk_size)
    };

    let mut out = Vec::with_capacity(prefix.len() + data.len() + num_chunks * CHUNK_OVERHEAD);
    out.extend_from_slice(&prefix);

    let total = data.len() as u64;
    if data.is_empty() {
        let record = encryptor.encrypt_chunk(b"", 0)?;
        out.extend_from_slice(&record);
        if let Some(cb) = progress {
            cb(0, 0);
        }
    } else {
        let mut processed = 0u64;
        for (index, chunk) in data.chunks(chunk_size).enumerate() {
            let record = encryptor.encrypt_chunk(chunk, index as u32)?;
            out.extend_from_slice(&record);
            processed += chunk.len() as u64;
            if let Some(cb) = progress {
                cb(processed, total);
            }
        }
    }

    encryptor.finalize();
    debug!(input_len = data.len(), output_len = out.len(), num_chunks, "buffer encrypted");
    Ok(out)
}

/// Decrypt a chunked container back into the original buffer
pub fn decrypt_bytes(
    data: &[u8],
    master: &MasterKey,
    progress: Option<&ProgressFn>,
) -> Result<Vec<u8>> {
    let (header, _) = format::split_prefix(data)?;
    let prefix_len = header.prefix_len();
    let mut decryptor = StreamDecryptor::new(&data[..prefix_len], master)?;

    // First pass walks the framing to size the output and learn the total
    // for progress reporting; nothing is decrypted yet.
    let mut total = 0u64;
    let mut offset = prefix_len;
    while offset < data.len() {
        let (chunk_header, sealed) = format::split_chunk(&data[offset..])?;
        total += u64::from(chunk_header.plaintext_len);
        offset += CHUNK_HEADER_LEN + sealed.len();
    }

    let mut out = Vec::with_capacity(total as usize);
    let mut processed = 0u64;
    let mut offset = prefix_len;
    while offset < data.len() {
        let (_, sealed) = format::split_chunk(&data[offset..])?;
        let record_len = CHUNK_HEADER_LEN + sealed.len();
        let plaintext = decryptor.decrypt_chunk(&data[offset..offset + record_len])?;
        processed += plaintext.len() as u64;
        out.extend_from_slice(&plaintext);
        if let Some(cb) = progress {
            cb(processed, total);
        }
        offset += record_len;
    }

    decryptor.finalize();
    Ok(out)
}

/// Encrypt a small payload into the legacy single-blob format
///
/// Output: `nonce(12) ‖ ciphertext ‖ tag(16)`.
pub fn seal_blob(key: &MasterKey, data: &[u8]) -> Result<Vec<u8>> {
    let nonce = Nonce::generate();
    let sealed = aead::seal(key.as_bytes(), &nonce, data, b"")?;

    let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a legacy single-blob payload
pub fn open_blob(key: &MasterKey, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidFormat(format!(
            "blob too short: {} bytes, need at least {}",
            blob.len(),
            NONCE_SIZE + TAG_SIZE
        )));
    }
    let nonce = Nonce::from_bytes(&blob[..NONCE_SIZE])?;
    aead::open(key.as_bytes(), &nonce, &blob[NONCE_SIZE..], b"")
}

/// Encrypt a whole buffer under a caller-supplied FEK
///
/// Output: `MainHeader(12) ‖ WrappedFEK(60) ‖ nonce(12) ‖ ciphertext ‖
/// tag(16)`. Unlike the chunked container, the body is one sealed segment.
pub fn encrypt_with_file_key(
    data: &[u8],
    file_key: &FileKey,
    master: &MasterKey,
) -> Result<Vec<u8>> {
    let wrapped = wrap::wrap_file_key(master, file_key)?;
    let header = MainHeader::new(wrapped.len() as u32);

    let nonce = Nonce::generate();
    let sealed = aead::seal(file_key.as_bytes(), &nonce, data, b"")?;

    let mut out =
        Vec::with_capacity(HEADER_LEN + wrapped.len() + NONCE_SIZE + sealed.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&wrapped);
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a whole-file embedded-FEK buffer
pub fn decrypt_with_file_key(data: &[u8], master: &MasterKey) -> Result<Vec<u8>> {
    let (header, wrapped) = format::split_prefix(data)?;
    let file_key = wrap::unwrap_file_key(master, wrapped)?;

    let body = &data[header.prefix_len()..];
    if body.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidFormat(format!(
            "sealed body too short: {} bytes",
            body.len()
        )));
    }
    let nonce = Nonce::from_bytes(&body[..NONCE_SIZE])?;
    aead::open(file_key.as_bytes(), &nonce, &body[NONCE_SIZE..], b"")
}

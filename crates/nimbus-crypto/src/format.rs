//! Container codec for the chunked encryption format
//!
//! ## Layout
//!
//! ```text
//! MainHeader(12) ‖ WrappedFEK(wrapped_key_len) ‖ Chunk₀ ‖ Chunk₁ ‖ …
//!
//! MainHeader:   magic(4) ‖ version(1) ‖ reserved(3) ‖ wrapped_key_len(4, LE)
//! Chunk record: index(4, LE) ‖ plaintext_len(4, LE) ‖ nonce(12) ‖
//!               ciphertext(plaintext_len) ‖ tag(16)
//! ```
//!
//! All multi-byte integers are little-endian. There is no end-of-stream
//! marker; the input length bounds the chunk sequence. Reserved bytes are
//! written as zero and ignored on read.

use crate::{CryptoError, Result, aead::Nonce, keys::TAG_SIZE};

/// Container magic, frozen at format version 1
pub const MAGIC: [u8; 4] = *b"NVLT";

/// Current container format version
pub const FORMAT_VERSION: u8 = 1;

/// Encoded length of the main header
pub const HEADER_LEN: usize = 12;

/// Encoded length of a chunk header (metadata before the ciphertext)
pub const CHUNK_HEADER_LEN: usize = 20;

/// Total framing overhead per chunk: header plus trailing tag
pub const CHUNK_OVERHEAD: usize = CHUNK_HEADER_LEN + TAG_SIZE;

/// Sanity bound on the wrapped-key field
pub const MAX_WRAPPED_KEY_LEN: usize = 1024;

/// Sanity bound on a single chunk's plaintext
pub const MAX_CHUNK_PLAINTEXT_LEN: usize = 64 * 1024 * 1024;

/// The main container header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainHeader {
    /// Format version
    pub version: u8,
    /// Length of the wrapped FEK that follows the header
    pub wrapped_key_len: u32,
}

impl MainHeader {
    /// Create a header for the current format version
    pub fn new(wrapped_key_len: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            wrapped_key_len,
        }
    }

    /// Encode the header to its 12-byte wire form
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&MAGIC);
        out[4] = self.version;
        // bytes 5..8 reserved, zero
        out[8..12].copy_from_slice(&self.wrapped_key_len.to_le_bytes());
        out
    }

    /// Parse a header from the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CryptoError::InvalidFormat(format!(
                "container too short: {} bytes, need at least {}",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if bytes[..4] != MAGIC {
            return Err(CryptoError::InvalidFormat("bad magic".to_string()));
        }
        let version = bytes[4];
        if version != FORMAT_VERSION {
            return Err(CryptoError::InvalidFormat(format!(
                "unsupported format version {}",
                version
            )));
        }
        let wrapped_key_len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if wrapped_key_len as usize > MAX_WRAPPED_KEY_LEN {
            return Err(CryptoError::InvalidFormat(format!(
                "wrapped key length {} exceeds bound {}",
                wrapped_key_len, MAX_WRAPPED_KEY_LEN
            )));
        }
        Ok(Self {
            version,
            wrapped_key_len,
        })
    }

    /// Length of the full container prefix: header plus wrapped key
    pub fn prefix_len(&self) -> usize {
        HEADER_LEN + self.wrapped_key_len as usize
    }
}

/// Parse the container prefix, returning the header and the wrapped FEK bytes
pub fn split_prefix(bytes: &[u8]) -> Result<(MainHeader, &[u8])> {
    let header = MainHeader::parse(bytes)?;
    let prefix_len = header.prefix_len();
    if bytes.len() < prefix_len {
        return Err(CryptoError::InvalidFormat(format!(
            "container prefix truncated: {} bytes, need {}",
            bytes.len(),
            prefix_len
        )));
    }
    let wrapped = &bytes[HEADER_LEN..prefix_len];
    Ok((header, wrapped))
}

/// The per-chunk header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    /// 0-based chunk ordinal
    pub index: u32,
    /// Plaintext length; equals ciphertext length under GCM
    pub plaintext_len: u32,
    /// Per-chunk nonce
    pub nonce: Nonce,
}

impl ChunkHeader {
    /// Encode the chunk header to its 20-byte wire form
    pub fn encode(&self) -> [u8; CHUNK_HEADER_LEN] {
        let mut out = [0u8; CHUNK_HEADER_LEN];
        out[..4].copy_from_slice(&self.index.to_le_bytes());
        out[4..8].copy_from_slice(&self.plaintext_len.to_le_bytes());
        out[8..20].copy_from_slice(self.nonce.as_bytes());
        out
    }

    /// Parse a chunk header from the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < CHUNK_HEADER_LEN {
            return Err(CryptoError::InvalidFormat(format!(
                "chunk record too short: {} bytes, need at least {}",
                bytes.len(),
                CHUNK_HEADER_LEN
            )));
        }
        let index = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let plaintext_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if plaintext_len as usize > MAX_CHUNK_PLAINTEXT_LEN {
            return Err(CryptoError::DataTooLarge {
                size: u64::from(plaintext_len),
                max: MAX_CHUNK_PLAINTEXT_LEN as u64,
            });
        }
        let nonce = Nonce::from_bytes(&bytes[8..20])?;
        Ok(Self {
            index,
            plaintext_len,
            nonce,
        })
    }

    /// Total encoded length of the record this header describes
    pub fn record_len(&self) -> usize {
        CHUNK_HEADER_LEN + self.plaintext_len as usize + TAG_SIZE
    }
}

/// Parse one chunk record from the start of `bytes`
///
/// Returns the header and the exact `ciphertext ‖ tag` slice; trailing bytes
/// beyond the record are left for the caller.
pub fn split_chunk(bytes: &[u8]) -> Result<(ChunkHeader, &[u8])> {
    let header = ChunkHeader::parse(bytes)?;
    let record_len = header.record_len();
    if bytes.len() < record_len {
        return Err(CryptoError::InvalidFormat(format!(
            "chunk record truncated: {} bytes, need {}",
            bytes.len(),
            record_len
        )));
    }
    let sealed = &bytes[CHUNK_HEADER_LEN..record_len];
    Ok((header, sealed))
}

/// Associated data for chunk `index`: `index(4, LE) ‖ plaintext_len(4, LE)`
///
/// Binding both fields into the tag makes reordering and resizing chunks
/// detectable at decrypt time.
pub fn chunk_aad(index: u32, plaintext_len: u32) -> [u8; 8] {
    let mut aad = [0u8; 8];
    aad[..4].copy_from_slice(&index.to_le_bytes());
    aad[4..].copy_from_slice(&plaintext_len.to_le_bytes());
    aad
}

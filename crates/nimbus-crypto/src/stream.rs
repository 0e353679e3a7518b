//! Streaming encryption and decryption contexts
//!
//! One chunk in, one framed record out; memory stays O(chunk) regardless of
//! file size. The encryptor hands back the container prefix (main header plus
//! wrapped FEK) as a single contiguous buffer that must be persisted before
//! any chunk record.
//!
//! Chunk indices are strictly sequential from 0. A decryption failure of any
//! kind poisons the decryptor: the FEK is zeroed and every subsequent call
//! fails. Skipping a corrupt chunk would silently drop data, so there is no
//! recovery path.

use crate::{
    CryptoError, Result, aead,
    aead::Nonce,
    format::{self, ChunkHeader, MainHeader, CHUNK_HEADER_LEN, HEADER_LEN, MAX_CHUNK_PLAINTEXT_LEN},
    keys::{FileKey, MasterKey},
    wrap,
};
use bytes::Bytes;
use tracing::debug;
use zeroize::Zeroize;

/// Streaming encryption context
///
/// State machine: `Ready → (encrypt_chunk)* → Finalized`. Finalized is
/// absorbing; the FEK is zeroed at finalization and again on drop.
pub struct StreamEncryptor {
    file_key: FileKey,
    next_index: u32,
    finalized: bool,
}

impl StreamEncryptor {
    /// Create a context and the container prefix
    ///
    /// Generates a fresh FEK, wraps it under `master`, and returns the
    /// context together with `MainHeader ‖ WrappedFEK`.
    pub fn new(master: &MasterKey) -> Result<(Self, Bytes)> {
        let file_key = FileKey::generate();
        let wrapped = wrap::wrap_file_key(master, &file_key)?;

        let header = MainHeader::new(wrapped.len() as u32);
        let mut prefix = Vec::with_capacity(HEADER_LEN + wrapped.len());
        prefix.extend_from_slice(&header.encode());
        prefix.extend_from_slice(&wrapped);

        debug!(prefix_len = prefix.len(), "encryption context created");
        Ok((
            Self {
                file_key,
                next_index: 0,
                finalized: false,
            },
            Bytes::from(prefix),
        ))
    }

    /// Encrypt one chunk, returning the framed record
    ///
    /// `index` must equal the context's next expected index. Empty plaintext
    /// is valid and produces an empty-payload record.
    pub fn encrypt_chunk(&mut self, plaintext: &[u8], index: u32) -> Result<Bytes> {
        if self.finalized {
            return Err(CryptoError::ContextFinalized);
        }
        if index != self.next_index {
            return Err(CryptoError::ChunkOutOfOrder {
                expected: self.next_index,
                got: index,
            });
        }
        if plaintext.len() > MAX_CHUNK_PLAINTEXT_LEN {
            return Err(CryptoError::DataTooLarge {
                size: plaintext.len() as u64,
                max: MAX_CHUNK_PLAINTEXT_LEN as u64,
            });
        }

        let nonce = Nonce::generate();
        let aad = format::chunk_aad(index, plaintext.len() as u32);
        let sealed = aead::seal(self.file_key.as_bytes(), &nonce, plaintext, &aad)?;

        let header = ChunkHeader {
            index,
            plaintext_len: plaintext.len() as u32,
            nonce,
        };
        let mut record = Vec::with_capacity(CHUNK_HEADER_LEN + sealed.len());
        record.extend_from_slice(&header.encode());
        record.extend_from_slice(&sealed);

        self.next_index += 1;
        Ok(Bytes::from(record))
    }

    /// Index the next `encrypt_chunk` call must pass
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Finalize the context and zero the FEK
    ///
    /// Subsequent `encrypt_chunk` calls fail with
    /// [`CryptoError::ContextFinalized`].
    pub fn finalize(&mut self) {
        self.finalized = true;
        self.file_key.zeroize();
        debug!(chunks = self.next_index, "encryption context finalized");
    }
}

/// Streaming decryption context
///
/// State machine: `Ready → (decrypt_chunk)* → Finalized | Failed`, with
/// Failed absorbing.
pub struct StreamDecryptor {
    file_key: FileKey,
    expected_index: u32,
    failed: bool,
}

impl StreamDecryptor {
    /// Create a context from the container prefix
    ///
    /// `prefix` must hold at least `HEADER_LEN + wrapped_key_len` contiguous
    /// bytes; trailing chunk data after the prefix is ignored here.
    pub fn new(prefix: &[u8], master: &MasterKey) -> Result<Self> {
        let (header, wrapped) = format::split_prefix(prefix)?;
        let file_key = wrap::unwrap_file_key(master, wrapped)?;

        debug!(version = header.version, "decryption context created");
        Ok(Self {
            file_key,
            expected_index: 0,
            failed: false,
        })
    }

    /// Decrypt one framed chunk record, returning the plaintext
    ///
    /// Chunks must arrive in index order. Any failure is terminal for the
    /// context.
    pub fn decrypt_chunk(&mut self, chunk: &[u8]) -> Result<Bytes> {
        if self.failed {
            return Err(CryptoError::Decryption(
                "context has failed; create a new one".to_string(),
            ));
        }

        match self.try_decrypt(chunk) {
            Ok(plaintext) => {
                self.expected_index += 1;
                Ok(plaintext)
            }
            Err(e) => {
                self.failed = true;
                self.file_key.zeroize();
                Err(e)
            }
        }
    }

    fn try_decrypt(&self, chunk: &[u8]) -> Result<Bytes> {
        let (header, sealed) = format::split_chunk(chunk)?;
        if header.index != self.expected_index {
            return Err(CryptoError::Decryption(format!(
                "unexpected chunk index {} (expected {})",
                header.index, self.expected_index
            )));
        }

        let aad = format::chunk_aad(header.index, header.plaintext_len);
        let plaintext = aead::open(self.file_key.as_bytes(), &header.nonce, sealed, &aad)?;
        Ok(Bytes::from(plaintext))
    }

    /// Index the next chunk record must carry
    pub fn expected_index(&self) -> u32 {
        self.expected_index
    }

    /// Whether a previous failure has poisoned the context
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Consume the context; the FEK is zeroed on drop
    pub fn finalize(self) {
        debug!(chunks = self.expected_index, "decryption context finalized");
    }
}

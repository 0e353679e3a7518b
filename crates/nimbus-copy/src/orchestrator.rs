//! The unified copy orchestrator
//!
//! Drives a download→upload pipeline across caller-provided read and write
//! callbacks. The orchestrator is agnostic to the source and destination
//! transports and to whether the payload is encrypted; it only enforces
//! chunk boundaries, accounts progress, and honors cancellation.
//!
//! Per file, the loop is:
//! 1. bail out if the cancel signal is set;
//! 2. compute `this_chunk = min(chunk_size, file_size - bytes_done)`,
//!    done when zero;
//! 3. ask the read callback for `this_chunk` bytes at `offset = bytes_done`
//!    (0 returned = EOF, which is an error before `file_size` is reached);
//! 4. re-check cancellation, then hand the bytes to the write callback at
//!    the same offset;
//! 5. account the bytes, emit progress, repeat.

use crate::{
    CancelSignal, CopyError, CopyProgress, ProgressCallback, Result,
};
use std::io;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::debug;

/// Smallest accepted chunk size (64 KiB)
pub const MIN_COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted chunk size (10 MiB)
pub const MAX_COPY_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Default chunk size (8 MiB)
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Configuration for a copy context
#[derive(Clone, Debug)]
pub struct CopyConfig {
    /// Transfer chunk size; must be within
    /// [`MIN_COPY_CHUNK_SIZE`, `MAX_COPY_CHUNK_SIZE`]
    pub chunk_size: usize,
    /// Total bytes expected across all files, 0 when unknown
    pub total_bytes: u64,
    /// Total files expected, 0 when unknown
    pub total_files: u32,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_COPY_CHUNK_SIZE,
            total_bytes: 0,
            total_files: 0,
        }
    }
}

impl CopyConfig {
    /// Create a config with the given chunk size
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Default::default()
        }
    }

    /// Set the expected total byte count
    pub fn with_total_bytes(mut self, total_bytes: u64) -> Self {
        self.total_bytes = total_bytes;
        self
    }

    /// Set the expected file count
    pub fn with_total_files(mut self, total_files: u32) -> Self {
        self.total_files = total_files;
        self
    }
}

/// A copy context driving one or more files through read/write callbacks
///
/// Single-threaded per context: the caller must not invoke two operations on
/// the same context concurrently. The progress counters may be read from
/// other threads through the accessor methods, which take atomic snapshots.
pub struct CopyOrchestrator {
    chunk_size: usize,
    total_bytes: u64,
    total_files: u32,
    bytes_copied: AtomicU64,
    files_processed: AtomicU32,
    cancel: Option<Box<dyn CancelSignal>>,
    progress: Option<ProgressCallback>,
}

impl CopyOrchestrator {
    /// Create an orchestrator; rejects out-of-range chunk sizes
    pub fn new(config: CopyConfig) -> Result<Self> {
        if !(MIN_COPY_CHUNK_SIZE..=MAX_COPY_CHUNK_SIZE).contains(&config.chunk_size) {
            return Err(CopyError::InvalidChunkSize(config.chunk_size));
        }
        Ok(Self {
            chunk_size: config.chunk_size,
            total_bytes: config.total_bytes,
            total_files: config.total_files,
            bytes_copied: AtomicU64::new(0),
            files_processed: AtomicU32::new(0),
            cancel: None,
            progress: None,
        })
    }

    /// Attach a cancellation signal, polled at each chunk boundary
    pub fn with_cancel(mut self, cancel: impl CancelSignal + 'static) -> Self {
        self.cancel = Some(Box::new(cancel));
        self
    }

    /// Attach a progress callback, invoked after each written chunk
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Copy one file of `file_size` bytes through the callbacks
    ///
    /// `read` fills the buffer at the given offset and returns the byte
    /// count actually read (0 = EOF); `write` must consume the full slice at
    /// the given offset. A zero-length file completes without invoking
    /// either callback.
    pub fn copy_file<R, W>(&mut self, file_size: u64, mut read: R, mut write: W) -> Result<()>
    where
        R: FnMut(&mut [u8], u64) -> io::Result<usize>,
        W: FnMut(&[u8], u64) -> io::Result<()>,
    {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut bytes_done: u64 = 0;

        loop {
            self.check_cancel()?;

            let this_chunk = (file_size - bytes_done).min(self.chunk_size as u64) as usize;
            if this_chunk == 0 {
                break;
            }

            let n = read(&mut buffer[..this_chunk], bytes_done)?;
            if n == 0 {
                return Err(CopyError::ShortRead {
                    expected: file_size,
                    got: bytes_done,
                });
            }

            self.check_cancel()?;
            write(&buffer[..n], bytes_done)?;

            bytes_done += n as u64;
            let copied = self.bytes_copied.fetch_add(n as u64, Ordering::Relaxed) + n as u64;
            debug_assert!(self.total_bytes == 0 || copied <= self.total_bytes);
            self.emit_progress(copied);
        }

        let done = self.files_processed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(file_size, files_processed = done, "file copy complete");
        Ok(())
    }

    /// Bytes copied so far (torn-read-safe snapshot)
    pub fn bytes_copied(&self) -> u64 {
        self.bytes_copied.load(Ordering::Relaxed)
    }

    /// Files fully copied so far (torn-read-safe snapshot)
    pub fn files_processed(&self) -> u32 {
        self.files_processed.load(Ordering::Relaxed)
    }

    /// Whether the context expects more files after those already processed
    ///
    /// Always false when the expected file count is unknown (0).
    pub fn has_remaining_files(&self) -> bool {
        self.files_processed() < self.total_files
    }

    fn check_cancel(&self) -> Result<()> {
        if let Some(cancel) = &self.cancel {
            if cancel.is_cancelled() {
                debug!(bytes_copied = self.bytes_copied(), "copy cancelled");
                return Err(CopyError::Cancelled);
            }
        }
        Ok(())
    }

    fn emit_progress(&self, bytes_copied: u64) {
        if let Some(cb) = &self.progress {
            cb(CopyProgress {
                bytes_copied,
                total_bytes: self.total_bytes,
                files_processed: self.files_processed.load(Ordering::Relaxed),
                total_files: self.total_files,
            });
        }
    }
}

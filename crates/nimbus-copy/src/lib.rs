//! # Nimbus Copy
//!
//! Transport-agnostic copy orchestration for cloud-to-cloud and local file
//! transfers.
//!
//! The orchestrator drives a read-chunk → write-chunk pipeline against
//! caller-supplied callbacks. It never performs network I/O itself and does
//! not care whether the payload is encrypted; it enforces chunk boundaries,
//! accounts progress, and honors cooperative cancellation at every chunk
//! boundary.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nimbus_copy::{CancelFlag, CopyConfig, CopyOrchestrator};
//!
//! let cancel = CancelFlag::new();
//! let mut orchestrator = CopyOrchestrator::new(CopyConfig::new(4 * 1024 * 1024))?
//!     .with_cancel(cancel.clone())
//!     .with_progress(Box::new(|p| println!("{:.1}%", p.percentage())));
//!
//! orchestrator.copy_file(
//!     file_size,
//!     |buf, offset| source.read_at(buf, offset),
//!     |data, offset| sink.write_at(data, offset),
//! )?;
//! ```
//!
//! Also in this crate: local file copy over the same loop ([`local`]) and
//! the recursive folder listing used across the FFI boundary ([`scan`]).

pub mod cancel;
pub mod error;
pub mod local;
pub mod orchestrator;
pub mod progress;
pub mod scan;

pub use cancel::{CancelFlag, CancelSignal};
pub use error::{CopyError, Result};
pub use local::copy_local_file;
pub use orchestrator::{
    CopyConfig, CopyOrchestrator, DEFAULT_COPY_CHUNK_SIZE, MAX_COPY_CHUNK_SIZE,
    MIN_COPY_CHUNK_SIZE,
};
pub use progress::{CopyProgress, ProgressCallback};
pub use scan::{ScanEntry, ScanResult, scan_folder};

//! Cooperative cancellation
//!
//! The orchestrator polls a cancel signal at each chunk boundary, so
//! cancellation is observable within one chunk of I/O. The caller owns the
//! flag's storage; the orchestrator only reads it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A signal the copy loop polls between chunks
///
/// Implementations must be cheap: the flag is read twice per chunk.
pub trait CancelSignal: Send + Sync {
    /// Whether cancellation has been requested (acquire ordering)
    fn is_cancelled(&self) -> bool;
}

/// Shared cancellation flag for Rust callers
///
/// Clone one handle into the thread driving the copy and keep another to
/// request cancellation from anywhere.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

impl CancelSignal for CancelFlag {
    fn is_cancelled(&self) -> bool {
        CancelFlag::is_cancelled(self)
    }
}

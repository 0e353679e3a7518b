//! Progress reporting for copy operations

/// Snapshot of a copy operation's progress
#[derive(Clone, Copy, Debug)]
pub struct CopyProgress {
    /// Bytes copied so far, across all files driven through the context
    pub bytes_copied: u64,
    /// Total bytes expected, 0 when unknown
    pub total_bytes: u64,
    /// Files fully copied so far
    pub files_processed: u32,
    /// Total files expected, 0 when unknown
    pub total_files: u32,
}

impl CopyProgress {
    /// Get percentage complete
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.bytes_copied as f64 / self.total_bytes as f64) * 100.0
    }
}

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(CopyProgress) + Send + Sync>;

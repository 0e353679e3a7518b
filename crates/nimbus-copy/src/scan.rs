//! Recursive folder listing
//!
//! Produces the JSON contract consumed across the FFI boundary: a root path,
//! a flat list of entries with relative and absolute paths, and aggregate
//! counts plus the scan duration.

use crate::{CopyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use walkdir::WalkDir;

/// One file or directory found under the scan root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Path relative to the scan root
    pub relative_path: String,
    /// Final path component
    pub name: String,
    /// Whether the entry is a directory
    pub is_folder: bool,
    /// File size in bytes; 0 for directories
    pub size: u64,
    /// Absolute path of the entry
    pub absolute_path: String,
}

/// Result of a recursive folder scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// The scanned root directory
    pub root_path: String,
    /// All entries below the root, depth-first, sorted by file name
    pub items: Vec<ScanEntry>,
    /// Number of files found
    pub total_files: u64,
    /// Number of directories found
    pub total_folders: u64,
    /// Sum of all file sizes in bytes
    pub total_size: u64,
    /// Wall-clock scan duration in milliseconds
    pub scan_duration_ms: u64,
}

impl ScanResult {
    /// Serialize to the JSON wire form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CopyError::Serialization(e.to_string()))
    }
}

/// Recursively scan `root`, which must be an existing directory
pub fn scan_folder(root: &Path) -> Result<ScanResult> {
    if !root.is_dir() {
        return Err(CopyError::InvalidPath(root.display().to_string()));
    }

    let started = Instant::now();
    let mut items = Vec::new();
    let mut total_files = 0u64;
    let mut total_folders = 0u64;
    let mut total_size = 0u64;

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .map(CopyError::Io)
                .unwrap_or_else(|| CopyError::InvalidPath("filesystem loop".to_string()))
        })?;
        let metadata = entry.metadata().map_err(|e| {
            e.into_io_error()
                .map(CopyError::Io)
                .unwrap_or_else(|| CopyError::InvalidPath("filesystem loop".to_string()))
        })?;

        let is_folder = metadata.is_dir();
        let size = if is_folder { 0 } else { metadata.len() };
        if is_folder {
            total_folders += 1;
        } else {
            total_files += 1;
            total_size += size;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| CopyError::InvalidPath(e.to_string()))?;
        items.push(ScanEntry {
            relative_path: relative.display().to_string(),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_folder,
            size,
            absolute_path: entry.path().display().to_string(),
        });
    }

    let scan_duration_ms = started.elapsed().as_millis() as u64;
    debug!(
        root = %root.display(),
        total_files,
        total_folders,
        total_size,
        scan_duration_ms,
        "folder scan complete"
    );

    Ok(ScanResult {
        root_path: root.display().to_string(),
        items,
        total_files,
        total_folders,
        total_size,
        scan_duration_ms,
    })
}

//! Local filesystem copy over the orchestrator
//!
//! Thin adapter that feeds positioned file reads and writes into
//! [`CopyOrchestrator::copy_file`], so local copies share the same
//! cancellation, progress, and chunking behavior as cloud transfers.

use crate::{CopyOrchestrator, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Copy a single file from `src` to `dst`, returning the byte count
pub fn copy_local_file(
    src: &Path,
    dst: &Path,
    orchestrator: &mut CopyOrchestrator,
) -> Result<u64> {
    let mut input = File::open(src)?;
    let file_size = input.metadata()?.len();
    let mut output = File::create(dst)?;

    orchestrator.copy_file(
        file_size,
        |buf, offset| {
            input.seek(SeekFrom::Start(offset))?;
            input.read(buf)
        },
        |data, offset| {
            output.seek(SeekFrom::Start(offset))?;
            output.write_all(data)
        },
    )?;

    output.sync_all()?;
    debug!(src = %src.display(), dst = %dst.display(), file_size, "local copy complete");
    Ok(file_size)
}

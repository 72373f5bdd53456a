//! Temporary file helpers.
//!
//! Jobs write small control files (the concat list) and reserve private
//! directories (two-pass statistics) that must outlive the builder call
//! because the engine uses them later. These helpers create them through the
//! tempfile crate for unique names, then detach them from drop-based deletion;
//! removal is the job's cleanup step.

use crate::error::{CoreError, CoreResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Creates a temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(prefix)
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

/// Writes `contents` to a new uniquely named file in `dir` and keeps it on
/// disk. The caller owns the returned path.
pub fn write_kept_temp_file(
    dir: &Path,
    prefix: &str,
    extension: &str,
    contents: &str,
) -> CoreResult<PathBuf> {
    let mut file = create_temp_file(dir, prefix, extension)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| CoreError::Io(e.error))?;
    Ok(path)
}

/// Creates a new uniquely named directory in `dir` and keeps it on disk.
pub fn create_kept_temp_dir(dir: &Path, prefix: &str) -> CoreResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let temp_dir = TempFileBuilder::new().prefix(prefix).tempdir_in(dir)?;
    Ok(temp_dir.keep())
}

//! Committing generated file sets to disk.
//!
//! Each file lands via temp-write-then-rename, so an interrupt or a
//! concurrent reader sees either the fully-old or the fully-new content.

use std::path::Path;

use tracing::{debug, info};

use slicewright_common_fs as fs;

use crate::error::SkeletonError;
use crate::generator::{ExistingFiles, FileRole, GeneratedFile};

/// Largest slice source file the reader will load.
const MAX_SOURCE_FILE_SIZE: usize = 4 * 1024 * 1024;

/// Write a generated file set into a slice directory.
pub fn write_file_set(dir: &Path, files: &[GeneratedFile]) -> Result<(), SkeletonError> {
    fs::ensure_dir(dir)?;
    for file in files {
        let path = dir.join(&file.file_name);
        debug!(path = %path.display(), "writing generated file");
        fs::write_string_atomic(&path, &file.content)?;
    }
    info!(dir = %dir.display(), count = files.len(), "slice file set written");
    Ok(())
}

/// Load whichever role files already exist in a slice directory.
pub fn read_existing(dir: &Path, slice: &str) -> Result<ExistingFiles, SkeletonError> {
    let mut existing = ExistingFiles::new();
    for role in FileRole::ALL {
        let path = dir.join(role.file_name(slice));
        if path.is_file() {
            let content = fs::read_to_string(&path, MAX_SOURCE_FILE_SIZE)?;
            existing.insert(role, content);
        }
    }
    Ok(existing)
}

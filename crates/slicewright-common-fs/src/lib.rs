//! File system utilities for slicewright.
//!
//! Every write that lands in a generated tree goes through [`write_atomic`]:
//! a concurrent reader (or a crash mid-write) observes either the fully-old
//! or fully-new file, never an intermediate state.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use slicewright_common_core::{Error, Result};

/// Read a file to string with a size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: usize) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::fs(
            "file not found",
            path.to_string_lossy(),
            Some(Box::new(e)),
        ),
        _ => Error::fs(
            "failed to read metadata",
            path.to_string_lossy(),
            Some(Box::new(e)),
        ),
    })?;

    if metadata.len() as usize > max_size {
        return Err(Error::fs(
            format!("file too large: {} bytes (max: {})", metadata.len(), max_size),
            path.to_string_lossy(),
            None,
        ));
    }

    fs::read_to_string(path).map_err(|e| {
        Error::fs("failed to read file", path.to_string_lossy(), Some(Box::new(e)))
    })
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));

    fs::create_dir_all(parent).map_err(|e| {
        Error::fs(
            "failed to create parent directory",
            parent.to_string_lossy(),
            Some(Box::new(e)),
        )
    })?;

    // Temp file must live in the same directory so the rename stays on one
    // file system.
    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::fs(
                "failed to create temporary file",
                temp_path.to_string_lossy(),
                Some(Box::new(e)),
            )
        })?;

        file.write_all(contents).map_err(|e| {
            Error::fs(
                "failed to write temporary file",
                temp_path.to_string_lossy(),
                Some(Box::new(e)),
            )
        })?;

        file.sync_all().map_err(|e| {
            Error::fs(
                "failed to sync temporary file",
                temp_path.to_string_lossy(),
                Some(Box::new(e)),
            )
        })?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::fs(
            "failed to rename temporary file to target",
            path.to_string_lossy(),
            Some(Box::new(e)),
        )
    })?;

    Ok(())
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            Error::fs(
                "failed to create directory",
                path.to_string_lossy(),
                Some(Box::new(e)),
            )
        })?;
    }
    Ok(())
}

/// Recursively collect files under a root matching an extension.
///
/// Returned paths are sorted so callers get a stable traversal order.
pub fn collect_files(root: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    collect_into(root, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let read_dir = fs::read_dir(dir).map_err(|e| {
        Error::fs(
            "failed to read directory",
            dir.to_string_lossy(),
            Some(Box::new(e)),
        )
    })?;

    for entry in read_dir {
        let entry = entry.map_err(|e| {
            Error::fs(
                "failed to read directory entry",
                dir.to_string_lossy(),
                Some(Box::new(e)),
            )
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_into(&path, extension, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            out.push(path);
        }
    }

    Ok(())
}

//! File metadata helpers: modification times, checksums and read-only flags.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Modification time, or `None` when the file does not exist or cannot be stat'ed.
#[must_use]
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Calculates the SHA-256 checksum of a file as lowercase hex.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let content = fs::read(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&content);
    let result = hasher.finalize();

    Ok(hex::encode(result))
}

/// True when both files exist and have identical contents.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    if !a.is_file() || !b.is_file() {
        return Ok(false);
    }
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(calculate_checksum(a)? == calculate_checksum(b)?)
}

/// Sets or clears the read-only flag on a file.
pub fn set_read_only(path: &Path, read_only: bool) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("Failed to get metadata for: {}", path.display()))?
        .permissions();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = perms.mode();
        let mode = if read_only { mode & !0o222 } else { mode | 0o200 };
        perms.set_mode(mode);
    }
    #[cfg(not(unix))]
    perms.set_readonly(read_only);

    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions on: {}", path.display()))
}

/// Copies `src` over `dst` and marks the copy read-only.
///
/// An existing read-only `dst` is made writable first so it can be replaced.
pub fn copy_read_only(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        set_read_only(dst, false)?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    set_read_only(dst, true)
}

/// Removes a file, clearing a read-only flag first. Missing files are ignored.
pub fn remove_file_forced(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    #[cfg(not(unix))]
    set_read_only(path, false)?;
    fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
}

//! Atomic file writes.
//!
//! Configuration stores and generated artifacts are written through a temp file
//! in the same directory followed by a rename, so a crash never leaves a
//! half-written file where a reader expects a complete one.

use crate::utils::fs::dirs::ensure_dir;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes a string to a file atomically.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Writes bytes to a file atomically.
///
/// The parent directory is created when missing. Content goes to a uniquely
/// named temp file beside the target, is synced, then renamed over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".rapuma-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Writes `content` only when the file is missing or differs.
///
/// Returns `true` when the file was written. An unchanged file keeps its
/// modification time, which is what staleness checks downstream rely on.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if path.is_file() {
        let current = fs::read(path)
            .with_context(|| format!("Failed to read existing file: {}", path.display()))?;
        if current == content.as_bytes() {
            return Ok(false);
        }
    }
    safe_write(path, content)?;
    Ok(true)
}

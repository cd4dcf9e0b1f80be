//! Directory helpers.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Ensures a directory exists, creating it and any missing parents.
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Copies every file under `src` into `dst`, keeping the relative layout.
///
/// Files already present in `dst` are left alone, as are any names in
/// `exempt`. Returns the number of files copied.
pub fn copy_missing_files(src: &Path, dst: &Path, exempt: &[&str]) -> Result<usize> {
    ensure_dir(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if exempt.iter().any(|e| *e == name) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} is outside {}", entry.path().display(), src.display()))?;
        let target = dst.join(relative);
        if target.exists() {
            continue;
        }
        ensure_parent_dir(&target)?;
        fs::copy(entry.path(), &target).with_context(|| {
            format!("Failed to copy {} to {}", entry.path().display(), target.display())
        })?;
        debug!("Copied {}", target.display());
        copied += 1;
    }

    Ok(copied)
}

/// Removes a directory tree. A missing directory is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_rejects_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir(&file).is_err());
        assert!(ensure_dir(&temp.path().join("a/b")).is_ok());
    }

    #[test]
    fn test_copy_missing_files_skips_existing_and_exempt() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.tex"), "a").unwrap();
        fs::write(src.join("sub/b.tex"), "b").unwrap();
        fs::write(src.join("skip.tex"), "skip").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("a.tex"), "local edit").unwrap();

        let copied = copy_missing_files(&src, &dst, &["skip.tex"]).unwrap();

        assert_eq!(copied, 1);
        assert_eq!(fs::read_to_string(dst.join("a.tex")).unwrap(), "local edit");
        assert_eq!(fs::read_to_string(dst.join("sub/b.tex")).unwrap(), "b");
        assert!(!dst.join("skip.tex").exists());
    }
}

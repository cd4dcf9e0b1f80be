//! `cv1` backups of component working texts.
//!
//! A component has at most one backup, `<cid>.<cType>.cv1`, taken just before
//! its working text is replaced or removed. The backup is read-only. Taking a
//! new backup replaces the old one.

use crate::project::ProjectPaths;
use crate::utils::fs::{copy_read_only, files_identical, remove_file_forced, set_read_only};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Backup handling for one component.
#[derive(Debug, Clone)]
pub struct ComponentBackup {
    working: PathBuf,
    backup: PathBuf,
}

impl ComponentBackup {
    #[must_use]
    pub fn new(paths: &ProjectPaths, cid: &str, ctype: &str) -> Self {
        Self {
            working: paths.working_text(cid, ctype),
            backup: paths.cv1_file(cid, ctype),
        }
    }

    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    #[must_use]
    pub fn working_path(&self) -> &Path {
        &self.working
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.backup.is_file()
    }

    /// Snapshot the working text. Returns `false` when there is no working
    /// text to back up.
    pub fn create(&self) -> Result<bool> {
        if !self.working.is_file() {
            debug!(target: "lifecycle", "No working text at {}, nothing to back up", self.working.display());
            return Ok(false);
        }
        copy_read_only(&self.working, &self.backup)?;
        info!(target: "lifecycle", "Backed up {}", self.working.display());
        Ok(true)
    }

    /// Copy the backup over the working text and delete the backup.
    pub fn restore(&self) -> Result<()> {
        if self.working.exists() {
            set_read_only(&self.working, false)?;
        }
        fs::copy(&self.backup, &self.working).with_context(|| {
            format!("Failed to restore {} from {}", self.working.display(), self.backup.display())
        })?;
        set_read_only(&self.working, false)?;
        self.remove()?;
        info!(target: "lifecycle", "Restored {}", self.working.display());
        Ok(())
    }

    /// Delete the backup when it matches the working text. Returns whether
    /// it was deleted.
    pub fn discard_if_identical(&self) -> Result<bool> {
        if files_identical(&self.working, &self.backup)? {
            self.remove()?;
            debug!(target: "lifecycle", "Backup {} matched the working text, removed", self.backup.display());
            return Ok(true);
        }
        Ok(false)
    }

    pub fn remove(&self) -> Result<()> {
        remove_file_forced(&self.backup)
    }
}

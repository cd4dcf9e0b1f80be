//! On-disk project fixtures.
//!
//! [`ProjectFixture`] lays out a temporary project together with a fake
//! installation root (`RAPUMA_BASE`) holding a minimal `usfmTex` macro
//! package, and a source folder of USFM texts.

use crate::config::project::{GROUPS, keys};
use crate::config::{ConfigStore, SystemSettings};
use crate::core::{ProjectContext, ResourceRoots};
use crate::project::{ProjectPaths, init_project};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A small but valid USFM text for `cid`.
#[must_use]
pub fn usfm_text(cid: &str) -> String {
    format!(
        "\\id {} Test text\n\\mt {}\n\\c 1\n\\p\n\\v 1 In the beginning.\n\\v 2 And then.\n",
        cid.to_ascii_uppercase(),
        cid
    )
}

/// Set a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) -> Result<()> {
    File::open(path)
        .and_then(|f| f.set_modified(time))
        .with_context(|| format!("Failed to set mtime of {}", path.display()))
}

/// Move the modification time of every file under `root` `secs` into the past.
///
/// Filesystems with coarse timestamps make "newer than" flaky within one
/// test; backdating everything first leaves room for later writes to be
/// strictly newer.
pub fn backdate_tree(root: &Path, secs: u64) -> Result<()> {
    let time = SystemTime::now() - Duration::from_secs(secs);
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            set_mtime(entry.path(), time)?;
        }
    }
    Ok(())
}

pub struct ProjectFixture {
    temp: TempDir,
}

impl ProjectFixture {
    /// An initialised project plus a fake installation root and sources for
    /// `gen`, `exo` and `mat`.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let fixture = Self {
            temp,
        };
        init_project(&fixture.paths(), Some("TEST"), false)?;

        let macros = fixture.base().join("resource").join("macros").join("usfmTex");
        fs::create_dir_all(&macros)?;
        fs::write(macros.join("paratext2.tex"), "% usfmTex entry\n\\relax\n")?;
        fs::write(macros.join("usfm.sty"), "\\Marker p\n\\FontSize 12\n")?;
        fs::write(macros.join("ptxplus-marginalverses.tex"), "% marginal verses\n")?;
        fs::write(macros.join("ptx-helpers.tex"), "% helper macros\n")?;

        fs::create_dir_all(fixture.source_dir())?;
        for cid in ["gen", "exo", "mat"] {
            fixture.write_source(cid, &usfm_text(cid))?;
        }
        Ok(fixture)
    }

    #[must_use]
    pub fn home(&self) -> PathBuf {
        self.temp.path().join("project")
    }

    /// Fake `RAPUMA_BASE`.
    #[must_use]
    pub fn base(&self) -> PathBuf {
        self.temp.path().join("base")
    }

    /// Fake `RAPUMA_USER`.
    #[must_use]
    pub fn user(&self) -> PathBuf {
        self.temp.path().join("user")
    }

    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.temp.path().join("source")
    }

    #[must_use]
    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(self.home())
    }

    #[must_use]
    pub fn resources(&self) -> ResourceRoots {
        ResourceRoots {
            base: Some(self.base()),
            user: Some(self.user()),
            user_resources: None,
        }
    }

    /// Context with default settings and this fixture's resource roots.
    pub fn context(&self) -> Result<ProjectContext> {
        self.context_with(SystemSettings::default())
    }

    pub fn context_with(&self, settings: SystemSettings) -> Result<ProjectContext> {
        ProjectContext::open_with(self.home(), settings, self.resources())
    }

    /// Write `<cid>.usfm` into the source folder.
    pub fn write_source(&self, cid: &str, content: &str) -> Result<PathBuf> {
        let path = self.source_dir().join(format!("{cid}.usfm"));
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Configure a group and place working texts directly, without going
    /// through the lifecycle manager.
    pub fn add_group_config(&self, gid: &str, cids: &[&str]) -> Result<()> {
        let paths = self.paths();
        let mut store = ConfigStore::load(paths.project_conf())?;
        let section = [GROUPS, gid];
        store.set(&section, keys::CTYPE, "usfm")?;
        store.set_list(&section, keys::CID_LIST, cids)?;
        store.set(&section, keys::IS_LOCKED, true)?;
        store.save()?;

        for cid in cids {
            let working = paths.working_text(cid, "usfm");
            fs::create_dir_all(paths.component_dir(cid))?;
            fs::write(&working, usfm_text(cid))?;
        }
        Ok(())
    }

    /// Edit a store in place.
    pub fn edit_store(&self, path: &Path, edit: impl FnOnce(&mut ConfigStore) -> Result<()>) -> Result<()> {
        let mut store = ConfigStore::load(path)?;
        edit(&mut store)?;
        store.save()
    }

    /// Write the processed hyphenation word list for a component type.
    pub fn write_word_list(&self, ctype: &str, content: &str) -> Result<PathBuf> {
        let path = self.paths().word_list(ctype);
        fs::create_dir_all(self.paths().hyphenation_dir())?;
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn backdate(&self, secs: u64) -> Result<()> {
        backdate_tree(&self.home(), secs)
    }
}

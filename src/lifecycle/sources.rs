//! Locating the source file of a component in a source folder.
//!
//! A file belongs to a component when its `\id` marker names the component,
//! compared without case. Files without an `\id` marker fall back to their
//! file stem. The first match in file-name order wins.

use crate::core::RapumaError;
use anyhow::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// The component id a text declares with `\id`, lower-cased.
#[must_use]
pub fn declared_id(text: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^\s*\\id\s+([A-Za-z0-9]{3})").ok()?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    re.captures(text).map(|c| c[1].to_ascii_lowercase())
}

/// Find the source file for `cid` under `source_dir`.
pub fn find_source(source_dir: &Path, cid: &str) -> Result<PathBuf> {
    if !source_dir.is_dir() {
        return Err(RapumaError::MissingRequiredSource {
            path: source_dir.display().to_string(),
        }
        .into());
    }

    let cid = cid.to_ascii_lowercase();
    let mut by_stem = None;
    let walker = WalkDir::new(source_dir).sort_by_file_name().into_iter().filter_map(Result::ok);
    for entry in walker.filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        // Binary files and other encodings are not sources.
        let Ok(text) = fs::read_to_string(path) else {
            continue;
        };
        match declared_id(&text) {
            Some(id) if id == cid => {
                debug!(target: "lifecycle", "Found {} by its \\id marker: {}", cid, path.display());
                return Ok(path.to_path_buf());
            }
            Some(_) => {}
            None => {
                let stem_matches = path
                    .file_stem()
                    .is_some_and(|s| s.to_string_lossy().eq_ignore_ascii_case(&cid));
                if stem_matches && by_stem.is_none() {
                    by_stem = Some(path.to_path_buf());
                }
            }
        }
    }

    by_stem.ok_or_else(|| {
        RapumaError::MissingRequiredSource {
            path: source_dir.join(format!("<{cid}>")).display().to_string(),
        }
        .into()
    })
}

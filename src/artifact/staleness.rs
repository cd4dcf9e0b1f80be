//! Modification-time staleness checks.
//!
//! A target is stale when it does not exist, or when any dependency that does
//! exist was modified strictly after it. Equal timestamps favour the target.
//! Missing dependencies impose no constraint; whether a missing dependency is
//! fatal is the generator's decision, not the checker's.
//!
//! Nothing is cached: every call stats the filesystem again, so edits made
//! between two checks are always seen.

use crate::utils::fs::modified_time;
use std::path::{Path, PathBuf};

/// Why a target needs rebuilding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    Missing,
    NewerDependency(PathBuf),
}

/// The first reason `target` is stale, or `None` when it is fresh.
#[must_use]
pub fn stale_reason<P: AsRef<Path>>(target: &Path, deps: &[P]) -> Option<StaleReason> {
    let Some(target_time) = modified_time(target) else {
        return Some(StaleReason::Missing);
    };
    for dep in deps {
        let dep: &Path = dep.as_ref();
        if modified_time(dep).is_some_and(|t| t > target_time) {
            return Some(StaleReason::NewerDependency(dep.to_path_buf()));
        }
    }
    None
}

#[must_use]
pub fn is_stale<P: AsRef<Path>>(target: &Path, deps: &[P]) -> bool {
    stale_reason(target, deps).is_some()
}

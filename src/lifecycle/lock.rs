//! Group lifecycle state and the advisory lock.
//!
//! The lock is a flag in `[Groups.<gid>]`, not an OS lock. It records the
//! intent that a group's installed texts should not change, and every
//! mutating lifecycle operation honours it unless forced. Two processes that
//! ignore it can still race.

use crate::config::ProjectConfig;
use crate::config::project::{GROUPS, keys};
use crate::core::{ProjectContext, RapumaError};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupState {
    /// No `[Groups.<gid>]` entry.
    Absent,
    /// An add was started and has not finished.
    Installing,
    Unlocked,
    Locked,
}

impl GroupState {
    #[must_use]
    pub fn of(config: &ProjectConfig, gid: &str) -> Self {
        if !config.has_group(gid) {
            return Self::Absent;
        }
        let section = [GROUPS, gid];
        if config.project.get_bool_or(&section, keys::INSTALLING, false) {
            Self::Installing
        } else if config.project.get_bool_or(&section, keys::IS_LOCKED, false) {
            Self::Locked
        } else {
            Self::Unlocked
        }
    }
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Absent => "absent",
            Self::Installing => "installing",
            Self::Unlocked => "unlocked",
            Self::Locked => "locked",
        };
        f.write_str(label)
    }
}

/// Fail with `GroupLocked` when `gid` is locked and `force` is off.
pub fn ensure_unlocked(config: &ProjectConfig, gid: &str, force: bool) -> Result<()> {
    config.group(gid)?;
    if GroupState::of(config, gid) == GroupState::Locked && !force {
        return Err(RapumaError::GroupLocked {
            gid: gid.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Persist the lock flag. A no-op for groups that no longer exist.
pub fn set_locked(ctx: &mut ProjectContext, gid: &str, locked: bool) -> Result<()> {
    if !ctx.config.has_group(gid) {
        return Ok(());
    }
    let section = [GROUPS, gid];
    if ctx.config.project.get_bool(&section, keys::IS_LOCKED) == Some(locked) {
        return Ok(());
    }
    ctx.config.project.set(&section, keys::IS_LOCKED, locked)?;
    ctx.config.project.save()?;
    debug!(target: "lifecycle", "{} is now {}", gid, if locked { "locked" } else { "unlocked" });
    Ok(())
}

/// Run a mutating operation on `gid` under the lock rules.
///
/// A locked group is refused without `force`, before anything is touched.
/// Otherwise the group is unlocked for the duration of `op`. After success
/// the group is locked. After failure it returns to its previous state.
pub fn with_unlocked<T>(
    ctx: &mut ProjectContext,
    gid: &str,
    force: bool,
    op: impl FnOnce(&mut ProjectContext) -> Result<T>,
) -> Result<T> {
    ensure_unlocked(&ctx.config, gid, force)?;
    let was_locked = GroupState::of(&ctx.config, gid) == GroupState::Locked;
    if was_locked {
        info!(target: "lifecycle", "Forcing changes to locked group {}", gid);
        set_locked(ctx, gid, false)?;
    }

    match op(ctx) {
        Ok(value) => {
            set_locked(ctx, gid, true)?;
            Ok(value)
        }
        Err(err) => {
            // Pick up whatever the operation managed to write before failing.
            ctx.reload()?;
            set_locked(ctx, gid, was_locked)?;
            Err(err)
        }
    }
}

/// Lock a group. Returns `false` when it was already locked.
pub fn lock_group(ctx: &mut ProjectContext, gid: &str) -> Result<bool> {
    ctx.config.group(gid)?;
    let changed = GroupState::of(&ctx.config, gid) != GroupState::Locked;
    set_locked(ctx, gid, true)?;
    Ok(changed)
}

/// Unlock a group. Returns `false` when it was already unlocked.
pub fn unlock_group(ctx: &mut ProjectContext, gid: &str) -> Result<bool> {
    ctx.config.group(gid)?;
    let changed = GroupState::of(&ctx.config, gid) == GroupState::Locked;
    set_locked(ctx, gid, false)?;
    Ok(changed)
}

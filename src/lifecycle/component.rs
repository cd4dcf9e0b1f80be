//! Installing, updating, uninstalling and restoring one component.
//!
//! Installation turns an imported source file into the working text the
//! renderer reads:
//!
//! 1. copy the source to `<cid>_base.<cType>.source` (read-only)
//! 2. copy that to the working text, dropping a byte-order mark
//! 3. run the group's preprocess script on the working text, if any
//! 4. lift `\fig` markers into `illustration.toml` and `<cid>.piclist`
//! 5. drop `\fe` endnotes
//! 6. validate the markup; a failure removes the working text
//!
//! The public operations here apply the group lock rules. The `*_unchecked`
//! variants are for callers that already hold the group unlocked.

use crate::config::GroupEntry;
use crate::config::expand_path;
use crate::config::project::{GROUPS, keys};
use crate::core::{ProjectContext, RapumaError};
use crate::lifecycle::backup::ComponentBackup;
use crate::lifecycle::figures::{extract_figures, store_figures, strip_endnotes, warn_endnotes, write_piclist};
use crate::lifecycle::lock::with_unlocked;
use crate::lifecycle::sources::find_source;
use crate::lifecycle::validate::validate_markup;
use crate::render::command::ExternalCommand;
use crate::utils::fs::{copy_read_only, ensure_dir, files_identical, remove_file_forced, safe_write};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What an update did to one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The source has not changed since the last install.
    Unchanged,
    /// The working text was reinstalled. `backup` is the previous working
    /// text, kept when it differs from the new one.
    Updated {
        working: PathBuf,
        backup: Option<PathBuf>,
    },
}

/// Install `cid` of `group` from `source`.
pub fn install_component(ctx: &mut ProjectContext, group: &GroupEntry, cid: &str, source: &Path) -> Result<()> {
    let paths = ctx.paths.clone();
    let ctype = group.ctype.as_str();
    let source_copy = paths.source_copy(cid, ctype);
    let working = paths.working_text(cid, ctype);
    ensure_dir(&paths.component_dir(cid))?;

    copy_read_only(source, &source_copy)?;
    let raw = fs::read_to_string(&source_copy)
        .with_context(|| format!("Failed to read source {}", source_copy.display()))?;
    let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
    safe_write(&working, text)?;

    if group.use_preprocess_script {
        if let Some(script) = &group.preprocess_script {
            run_preprocess(ctx, script, &working);
        }
    }

    let text = fs::read_to_string(&working)
        .with_context(|| format!("Failed to read working text {}", working.display()))?;
    let (text, figures) = extract_figures(&text, cid)?;
    if store_figures(&mut ctx.config.illustration, &group.gid, cid, &figures)? {
        ctx.config.illustration.save()?;
    }
    write_piclist(&paths.piclist_file(cid), &figures)?;
    let (text, endnotes) = strip_endnotes(&text)?;
    warn_endnotes(cid, endnotes);
    safe_write(&working, &text)?;

    if group.validate_source_markup {
        if let Err(err) = validate_markup(&text, cid, &working) {
            remove_file_forced(&working)?;
            return Err(err);
        }
    }

    info!(target: "lifecycle", "Installed {} into group {}", cid, group.gid);
    Ok(())
}

fn run_preprocess(ctx: &ProjectContext, script: &str, working: &Path) {
    let script = expand_path(Path::new(script));
    let script = if script.is_relative() {
        ctx.paths.home().join(script)
    } else {
        script
    };
    let result = ExternalCommand::new(script.display().to_string())
        .arg(working.display().to_string())
        .with_context("preprocess")
        .execute_success();
    match result {
        Ok(_) => debug!(target: "lifecycle", "Preprocessed {}", working.display()),
        Err(err) => warn!(target: "lifecycle", "Preprocess script failed on {}: {:#}", working.display(), err),
    }
}

fn source_dir(group: &GroupEntry) -> Result<PathBuf> {
    group.source_path.clone().ok_or_else(|| {
        RapumaError::ConfigError {
            file: "project.toml".to_string(),
            reason: format!("group '{}' has no sourcePath", group.gid),
        }
        .into()
    })
}

fn member(group: &GroupEntry, cid: &str) -> Result<String> {
    let cid = cid.trim().to_ascii_lowercase();
    if !group.cid_list.contains(&cid) {
        return Err(RapumaError::InvalidComponentId {
            reason: format!("not a component of group '{}'", group.gid),
            cid,
        }
        .into());
    }
    Ok(cid)
}

/// Reinstall `cid` when its source has changed, or always with `force`.
/// The caller holds the group unlocked.
pub fn update_component_unchecked(
    ctx: &mut ProjectContext,
    group: &GroupEntry,
    cid: &str,
    force: bool,
) -> Result<UpdateOutcome> {
    let source = find_source(&source_dir(group)?, cid)?;
    let source_copy = ctx.paths.source_copy(cid, &group.ctype);
    if !force && files_identical(&source, &source_copy)? {
        debug!(target: "lifecycle", "{} is unchanged at its source", cid);
        return Ok(UpdateOutcome::Unchanged);
    }

    let backup = ComponentBackup::new(&ctx.paths, cid, &group.ctype);
    backup.create()?;
    install_component(ctx, group, cid, &source)?;
    let kept = if backup.exists() && !backup.discard_if_identical()? {
        Some(backup.backup_path().to_path_buf())
    } else {
        None
    };
    Ok(UpdateOutcome::Updated {
        working: backup.working_path().to_path_buf(),
        backup: kept,
    })
}

/// Update one component of a group under the lock rules.
pub fn update_component(ctx: &mut ProjectContext, gid: &str, cid: &str, force: bool) -> Result<UpdateOutcome> {
    let group = ctx.config.group(gid)?;
    let cid = member(&group, cid)?;
    with_unlocked(ctx, gid, force, |ctx| update_component_unchecked(ctx, &group, &cid, force))
}

fn ensure_not_shared(ctx: &ProjectContext, group: &GroupEntry, cid: &str) -> Result<()> {
    match ctx.config.groups_sharing(cid, &group.gid).into_iter().next() {
        Some(other_gid) => Err(RapumaError::SharedComponent {
            gid: group.gid.clone(),
            cid: cid.to_string(),
            other_gid,
        }
        .into()),
        None => Ok(()),
    }
}

/// Remove `cid` from `group`, keeping a backup of its working text.
/// The caller holds the group unlocked.
pub fn uninstall_component_unchecked(ctx: &mut ProjectContext, group: &GroupEntry, cid: &str) -> Result<()> {
    ensure_not_shared(ctx, group, cid)?;

    let backup = ComponentBackup::new(&ctx.paths, cid, &group.ctype);
    backup.create()?;
    let dir = ctx.paths.component_dir(cid);
    if dir.is_dir() {
        for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() && path != backup.backup_path() {
                remove_file_forced(&path)?;
            }
        }
    }

    if store_figures(&mut ctx.config.illustration, &group.gid, cid, &[])? {
        ctx.config.illustration.save()?;
    }
    let section = [GROUPS, group.gid.as_str()];
    let remaining: Vec<String> = ctx
        .config
        .project
        .get_list_or_empty(&section, keys::CID_LIST)
        .into_iter()
        .filter(|c| c != cid)
        .collect();
    ctx.config.project.set_list(&section, keys::CID_LIST, &remaining)?;
    ctx.config.project.save()?;

    info!(target: "lifecycle", "Uninstalled {} from group {}", cid, group.gid);
    Ok(())
}

/// Uninstall one component under the lock rules.
pub fn uninstall_component(ctx: &mut ProjectContext, gid: &str, cid: &str, force: bool) -> Result<()> {
    let group = ctx.config.group(gid)?;
    let cid = member(&group, cid)?;
    // Refused before the lock flag is touched, so project.toml stays as it was.
    ensure_not_shared(ctx, &group, &cid)?;
    with_unlocked(ctx, gid, force, |ctx| uninstall_component_unchecked(ctx, &group, &cid))
}

/// Put the `cv1` backup of `cid` back as its working text.
pub fn restore_component(ctx: &mut ProjectContext, gid: &str, cid: &str, force: bool) -> Result<()> {
    let group = ctx.config.group(gid)?;
    let cid = member(&group, cid)?;
    let backup = ComponentBackup::new(&ctx.paths, &cid, &group.ctype);
    if !backup.exists() {
        return Err(RapumaError::MissingRequiredSource {
            path: backup.backup_path().display().to_string(),
        }
        .into());
    }
    with_unlocked(ctx, gid, force, |_| backup.restore())
}

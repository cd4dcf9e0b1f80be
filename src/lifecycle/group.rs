//! Group operations: add, update, remove and list.

use crate::config::ConfigStore;
use crate::config::project::{GROUPS, group_defaults, keys};
use crate::core::{ProjectContext, RapumaError};
use crate::generators::settings::install_layout_defaults;
use crate::lifecycle::component::{
    UpdateOutcome, install_component, uninstall_component_unchecked, update_component_unchecked,
};
use crate::lifecycle::lock::{GroupState, with_unlocked};
use crate::lifecycle::sources::find_source;
use crate::project::validate_cids;
use crate::utils::fs::{ensure_dir, remove_dir_all};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Request to create a group.
#[derive(Debug, Clone)]
pub struct AddGroupOptions {
    pub ctype: String,
    pub source_dir: PathBuf,
    pub cids: Vec<String>,
    pub force: bool,
}

/// Result of [`remove_group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Whether the group's folder and entry were deleted.
    pub removed: bool,
    /// Shared components that stayed in the group.
    pub kept: Vec<String>,
}

/// One line of `group list`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub gid: String,
    #[serde(rename = "cType")]
    pub ctype: String,
    pub state: GroupState,
    pub cids: Vec<String>,
}

/// Create group `gid` and install its components. The group ends locked.
///
/// Components already installed for another group are shared: their working
/// text is reused, not reinstalled.
pub fn add_group(ctx: &mut ProjectContext, gid: &str, options: &AddGroupOptions) -> Result<GroupSummary> {
    if ctx.config.has_group(gid) && !options.force {
        return Err(RapumaError::GroupExists {
            gid: gid.to_string(),
        }
        .into());
    }
    let cids = validate_cids(&options.cids)?;
    let package = ctx
        .registry
        .for_ctype(&options.ctype, ctx.config.macro_package_for(&options.ctype).as_deref())?;
    let source_dir = crate::config::expand_path(&options.source_dir);
    let sources = cids.iter().map(|cid| find_source(&source_dir, cid)).collect::<Result<Vec<_>>>()?;

    let section = [GROUPS, gid];
    let store = &mut ctx.config.project;
    store.set(&section, keys::CTYPE, options.ctype.as_str())?;
    store.set_list(&section, keys::CID_LIST, &cids)?;
    store.set(&section, keys::SOURCE_PATH, source_dir.display().to_string())?;
    store.set(&section, keys::IS_LOCKED, false)?;
    store.set(&section, keys::INSTALLING, true)?;
    store.merge_defaults(&section, &group_defaults())?;
    store.save()?;
    info!(target: "lifecycle", "Adding group {} ({}) with {}", gid, options.ctype, cids.join(", "));

    ensure_dir(&ctx.paths.group_dir(gid))?;
    if install_layout_defaults(&ctx.paths, &*package)? {
        ctx.config.layout = ConfigStore::load(ctx.paths.layout_conf())?;
    }

    let group = ctx.config.group(gid)?;
    for (cid, source) in cids.iter().zip(&sources) {
        let shared = ctx.config.groups_sharing(cid, gid);
        if let Some(other) = shared.first() {
            if ctx.paths.working_text(cid, &group.ctype).is_file() {
                info!(target: "lifecycle", "{} is shared with group {}, keeping its working text", cid, other);
                continue;
            }
        }
        install_component(ctx, &group, cid, source)?;
    }

    let store = &mut ctx.config.project;
    store.remove_key(&section, keys::INSTALLING);
    store.set(&section, keys::IS_LOCKED, true)?;
    store.save()?;
    info!(target: "lifecycle", "Group {} added", gid);
    summary(ctx, gid)
}

/// Update every component of a group, or only `cid`.
pub fn update_group(
    ctx: &mut ProjectContext,
    gid: &str,
    cid: Option<&str>,
    force: bool,
) -> Result<Vec<(String, UpdateOutcome)>> {
    let group = ctx.config.group(gid)?;
    let targets: Vec<String> = match cid {
        Some(cid) => {
            let cid = cid.trim().to_ascii_lowercase();
            if !group.cid_list.contains(&cid) {
                return Err(RapumaError::InvalidComponentId {
                    reason: format!("not a component of group '{gid}'"),
                    cid,
                }
                .into());
            }
            vec![cid]
        }
        None => group.cid_list.clone(),
    };

    with_unlocked(ctx, gid, force, |ctx| {
        let mut outcomes = Vec::with_capacity(targets.len());
        for cid in targets {
            let outcome = update_component_unchecked(ctx, &group, &cid, force)?;
            outcomes.push((cid, outcome));
        }
        Ok(outcomes)
    })
}

/// Uninstall every component of `gid`, then delete the group if nothing is
/// left in it. Shared components stay and keep the group alive.
pub fn remove_group(ctx: &mut ProjectContext, gid: &str, force: bool) -> Result<RemoveOutcome> {
    let group = ctx.config.group(gid)?;
    with_unlocked(ctx, gid, force, |ctx| {
        let mut kept = Vec::new();
        for cid in &group.cid_list {
            match uninstall_component_unchecked(ctx, &group, cid) {
                Ok(()) => {}
                Err(err) => match err.downcast_ref::<RapumaError>() {
                    Some(RapumaError::SharedComponent { other_gid, .. }) => {
                        warn!(target: "lifecycle", "Keeping {}: it is shared with group {}", cid, other_gid);
                        kept.push(cid.clone());
                    }
                    _ => return Err(err),
                },
            }
        }

        if !kept.is_empty() {
            return Ok(RemoveOutcome {
                removed: false,
                kept,
            });
        }

        remove_dir_all(&ctx.paths.group_dir(gid))?;
        ctx.config.project.remove_section(&[GROUPS, gid]);
        ctx.config.project.save()?;
        if ctx.config.illustration.remove_section(&[gid]) {
            ctx.config.illustration.save()?;
        }
        info!(target: "lifecycle", "Removed group {}", gid);
        Ok(RemoveOutcome {
            removed: true,
            kept,
        })
    })
}

fn summary(ctx: &ProjectContext, gid: &str) -> Result<GroupSummary> {
    let group = ctx.config.group(gid)?;
    Ok(GroupSummary {
        gid: group.gid,
        ctype: group.ctype,
        state: GroupState::of(&ctx.config, gid),
        cids: group.cid_list,
    })
}

/// Every configured group in document order.
pub fn list_groups(ctx: &ProjectContext) -> Result<Vec<GroupSummary>> {
    ctx.config.group_ids().iter().map(|gid| summary(ctx, gid)).collect()
}

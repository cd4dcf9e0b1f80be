//! Extension placeholders.
//!
//! Project, group and component extension files are where users put their
//! own macros and styles. Each is created once and never touched again. A
//! new file is copied from the user's resource folder if it has one by that
//! name, else from the packaged macro folder, else written as an empty file
//! with a header comment.

use crate::artifact::ArtifactKind;
use crate::core::ProjectContext;
use crate::generators::{ArtifactGenerator, BuildRequest, file_header};
use crate::project::Switch;
use crate::utils::fs::{ensure_parent_dir, safe_write};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct PlaceholderGenerator {
    kind: ArtifactKind,
}

impl PlaceholderGenerator {
    #[must_use]
    pub const fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
        }
    }

    fn description(&self) -> &'static str {
        match self.kind {
            ArtifactKind::Extension => "Project macro extensions",
            ArtifactKind::DefaultStyleExtension => "Project style extensions",
            ArtifactKind::GroupTexExtension => "Macro overrides for this group",
            ArtifactKind::GroupStyleExtension => "Style overrides for this group",
            ArtifactKind::ComponentTexExtension => "Macro overrides for one component",
            _ => "Style overrides for one component",
        }
    }
}

/// Where a placeholder's initial content comes from.
fn template_for(ctx: &ProjectContext, mac_pack: &str, file_name: &str) -> Option<PathBuf> {
    let user = ctx.resources.user_macros().map(|d| d.join(file_name));
    let packaged = ctx.resources.packaged_macros(mac_pack).map(|d| d.join(file_name));
    user.into_iter().chain(packaged).find(|p| p.is_file())
}

fn create_placeholder(ctx: &ProjectContext, mac_pack: &str, target: &Path, description: &str) -> Result<()> {
    let file_name = target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if let Some(template) = template_for(ctx, mac_pack, &file_name) {
        ensure_parent_dir(target)?;
        fs::copy(&template, target).with_context(|| {
            format!("Failed to copy {} to {}", template.display(), target.display())
        })?;
        info!("Copied {} from {}", file_name, template.display());
    } else {
        safe_write(target, &file_header(target, description, true))?;
        debug!("Created empty placeholder {}", target.display());
    }
    Ok(())
}

/// On/off pairs for the rendered components named in `list`.
fn override_pairs(
    req: &BuildRequest,
    list: &[String],
    path: impl Fn(&str, Switch) -> PathBuf,
) -> Vec<PathBuf> {
    req.cids
        .iter()
        .filter(|cid| list.contains(*cid))
        .flat_map(|cid| [path(cid, Switch::On), path(cid, Switch::Off)])
        .collect()
}

impl ArtifactGenerator for PlaceholderGenerator {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        let p = &ctx.paths;
        let g = &req.group;
        match self.kind {
            ArtifactKind::Extension => vec![p.extension_file(req.ctype())],
            ArtifactKind::DefaultStyleExtension => vec![p.default_style_ext(req.ctype())],
            ArtifactKind::GroupTexExtension if g.use_grp_tex_override => vec![p.group_tex_ext(&req.gid)],
            ArtifactKind::GroupStyleExtension if g.use_grp_sty_override => {
                vec![p.group_style_ext(&req.gid)]
            }
            ArtifactKind::ComponentTexExtension => {
                override_pairs(req, &g.comp_tex_override_list, |cid, s| p.component_tex_ext(&req.gid, cid, s))
            }
            ArtifactKind::ComponentStyleExtension => {
                override_pairs(req, &g.comp_sty_override_list, |cid, s| p.component_style_ext(&req.gid, cid, s))
            }
            _ => Vec::new(),
        }
    }

    fn dependencies(&self, _ctx: &ProjectContext, _req: &BuildRequest) -> Vec<PathBuf> {
        Vec::new()
    }

    fn needs_generation(&self, ctx: &ProjectContext, req: &BuildRequest) -> bool {
        self.targets(ctx, req).iter().any(|t| !t.exists())
    }

    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()> {
        for target in self.targets(ctx, req) {
            if !target.exists() {
                create_placeholder(ctx, req.mac_pack(), &target, self.description())?;
            }
        }
        Ok(())
    }
}

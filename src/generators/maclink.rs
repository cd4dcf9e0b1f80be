//! Macro-link file: `Tex/<cType>_macLink.tex`.
//!
//! Inputs the macro package's entry file and, when the layout enables
//! marginal verses, the marginal verses extension. Turning the flag off
//! removes the extension from the project again.

use crate::artifact::ArtifactKind;
use crate::core::{ProjectContext, RapumaError};
use crate::generators::{ArtifactGenerator, BuildRequest, file_header, tex_path};
use crate::render::registry::MacroPackage;
use crate::utils::fs::{copy_missing_files, ensure_dir, remove_file_forced, safe_write};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Copy the packaged macro files the project does not have yet.
///
/// Existing files are never replaced. The marginal verses file is left
/// behind; it is linked on demand by the macro-link generator.
pub fn ensure_macro_package(ctx: &ProjectContext, package: &dyn MacroPackage) -> Result<usize> {
    let target = ctx.paths.macpack_dir(package.name());
    ensure_dir(&target)?;
    let Some(source) = ctx.resources.packaged_macros(package.name()).filter(|p| p.is_dir()) else {
        debug!("No packaged copy of {} available", package.name());
        return Ok(0);
    };
    let exempt: Vec<&str> = package.marginal_verses_file().into_iter().collect();
    let copied = copy_missing_files(&source, &target, &exempt)?;
    if copied > 0 {
        info!("Copied {} macro file(s) into {}", copied, target.display());
    }
    Ok(copied)
}

fn uses_marginal_verses(ctx: &ProjectContext) -> bool {
    ctx.config.layout.get_bool_or(&["ChapterVerse"], "useMarginalVerses", false)
}

pub struct MacroLinkGenerator;

impl ArtifactGenerator for MacroLinkGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::MacroLink
    }

    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![ctx.paths.maclink_file(req.ctype())]
    }

    fn dependencies(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![
            ctx.paths.macpack_dir(req.mac_pack()).join(req.package.entry_file()),
            ctx.paths.font_conf(),
            ctx.paths.layout_conf(),
            ctx.paths.project_conf(),
        ]
    }

    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()> {
        let package = req.package.as_ref();
        ensure_macro_package(ctx, package)?;

        let macpack_dir = ctx.paths.macpack_dir(package.name());
        let entry = macpack_dir.join(package.entry_file());
        if !entry.is_file() {
            return Err(RapumaError::MissingRequiredSource {
                path: entry.display().to_string(),
            }
            .into());
        }

        let target = ctx.paths.maclink_file(req.ctype());
        let mut content = file_header(&target, "Links the project to its macro package", false);
        content.push_str(&package.input_directive(&tex_path(&entry)));
        content.push('\n');

        if let Some(marginal) = package.marginal_verses_file() {
            let local = macpack_dir.join(marginal);
            if uses_marginal_verses(ctx) {
                if !local.is_file() {
                    let packaged = ctx
                        .resources
                        .packaged_macros(package.name())
                        .map(|p| p.join(marginal))
                        .filter(|p| p.is_file())
                        .ok_or_else(|| RapumaError::MissingRequiredSource {
                            path: local.display().to_string(),
                        })?;
                    fs::copy(&packaged, &local).with_context(|| {
                        format!("Failed to copy {} into the project", packaged.display())
                    })?;
                    info!("Linked marginal verses file {}", local.display());
                }
                content.push_str(&package.input_directive(&tex_path(&local)));
                content.push('\n');
            } else if local.exists() {
                remove_file_forced(&local)?;
                info!("Removed marginal verses file {}", local.display());
            }
        }

        safe_write(&target, &content)
    }
}

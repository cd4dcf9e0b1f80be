//! Default stylesheet: `Styles/<cType>.sty`, copied once from the macro package.

use crate::artifact::ArtifactKind;
use crate::core::{ProjectContext, RapumaError};
use crate::generators::maclink::ensure_macro_package;
use crate::generators::{ArtifactGenerator, BuildRequest};
use crate::utils::fs::ensure_parent_dir;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub struct DefaultStyleGenerator;

impl ArtifactGenerator for DefaultStyleGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::DefaultStyle
    }

    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![ctx.paths.default_style(req.ctype())]
    }

    // The project copy belongs to the user once it exists.
    fn dependencies(&self, _ctx: &ProjectContext, _req: &BuildRequest) -> Vec<PathBuf> {
        Vec::new()
    }

    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()> {
        ensure_macro_package(ctx, req.package.as_ref())?;
        let source = ctx.paths.macpack_dir(req.mac_pack()).join(req.package.default_style_file());
        if !source.is_file() {
            return Err(RapumaError::MissingRequiredSource {
                path: source.display().to_string(),
            }
            .into());
        }
        let target = ctx.paths.default_style(req.ctype());
        ensure_parent_dir(&target)?;
        fs::copy(&source, &target)
            .with_context(|| format!("Failed to copy default stylesheet to {}", target.display()))?;
        info!("Copied default stylesheet {}", target.display());
        Ok(())
    }
}

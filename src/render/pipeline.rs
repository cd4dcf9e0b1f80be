//! Rendering one group, or a subset of its components, end to end.
//!
//! Artifacts are assembled first. The renderer runs only when the output PDF
//! is missing or older than anything it is built from. Post-processing
//! follows.

use crate::artifact::{StaleReason, stale_reason};
use crate::assembler::{AssemblyReport, ControlFileAssembler};
use crate::core::ProjectContext;
use crate::generators::BuildRequest;
use crate::generators::control::component_inputs;
use crate::postprocess::{PostProcessReport, post_process};
use crate::render::invoker::{RenderInvoker, RenderOutcome};
use crate::utils::fs::remove_file_forced;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Components to render; empty renders the whole group.
    pub cids: Vec<String>,
    /// Delete the output before checking whether it is current.
    pub force: bool,
    /// Rebuild the background composite even when it is current.
    pub force_background: bool,
}

#[derive(Debug, Clone)]
pub struct RenderReport {
    pub gid: String,
    pub target: PathBuf,
    pub assembly: AssemblyReport,
    /// `None` when the output was already current.
    pub outcome: Option<RenderOutcome>,
    pub postprocess: PostProcessReport,
}

impl RenderReport {
    #[must_use]
    pub const fn rendered(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Files the output PDF is built from.
#[must_use]
pub fn pdf_dependencies(ctx: &ProjectContext, req: &BuildRequest, assembly: &AssemblyReport) -> Vec<PathBuf> {
    let mut deps = vec![
        assembly.control_file.clone(),
        ctx.paths.project_conf(),
        ctx.paths.layout_conf(),
        ctx.paths.font_conf(),
        ctx.paths.illustration_conf(),
        ctx.paths.macpack_conf(req.mac_pack()),
    ];
    for path in assembly.dependencies.iter().cloned().chain(component_inputs(ctx, req)) {
        if !deps.contains(&path) {
            deps.push(path);
        }
    }
    deps
}

/// Render `gid`.
pub fn render_group(ctx: &ProjectContext, gid: &str, options: &RenderOptions) -> Result<RenderReport> {
    let subset = (!options.cids.is_empty()).then_some(options.cids.as_slice());
    let req = BuildRequest::new(ctx, gid, subset)?;
    let target = if req.full_group {
        ctx.paths.group_pdf(gid)
    } else {
        ctx.paths.subset_pdf(gid, req.cids.as_slice())
    };

    if options.force && target.exists() {
        remove_file_forced(&target)?;
        debug!(target: "render", "Removed {} before rendering", target.display());
    }

    let assembly = ControlFileAssembler::new(ctx, &req).assemble()?;
    let deps = pdf_dependencies(ctx, &req, &assembly);

    let outcome = match stale_reason(&target, &deps) {
        None => {
            info!(target: "render", "{} is up to date", target.display());
            None
        }
        Some(reason) => {
            match &reason {
                StaleReason::Missing => debug!(target: "render", "{} does not exist yet", target.display()),
                StaleReason::NewerDependency(dep) => {
                    debug!(target: "render", "{} is newer than {}", dep.display(), target.display());
                }
            }
            Some(RenderInvoker::from_context(ctx).invoke(ctx, &req, &target)?)
        }
    };

    let label = target.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let postprocess = match post_process(ctx, &target, &label, outcome.is_some(), options.force_background) {
        Ok(report) => report,
        Err(err) => {
            // A half-processed output must not pass as current on the next run.
            if outcome.is_some() && target.exists() {
                remove_file_forced(&target)?;
                warn!(target: "render", "Removed {} after post-processing failed", target.display());
            }
            return Err(err);
        }
    };

    Ok(RenderReport {
        gid: gid.to_string(),
        target,
        assembly,
        outcome,
        postprocess,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RapumaError, find_rapuma_error};
    use crate::test_utils::ProjectFixture;

    #[test]
    fn test_dependencies_cover_component_files() {
        let fixture = ProjectFixture::new().unwrap();
        fixture.add_group_config("g1", &["gen"]).unwrap();
        std::fs::write(fixture.paths().adjustment_file("gen"), "GEN 1.1 +1\n").unwrap();
        let ctx = fixture.context().unwrap();
        let req = BuildRequest::new(&ctx, "g1", None).unwrap();
        let assembly = ControlFileAssembler::new(&ctx, &req).assemble().unwrap();

        let deps = pdf_dependencies(&ctx, &req, &assembly);
        assert!(deps.contains(&ctx.paths.control_file("g1")));
        assert!(deps.contains(&ctx.paths.settings_file("usfm")));
        assert!(deps.contains(&ctx.paths.default_style("usfm")));
        assert!(deps.contains(&ctx.paths.adjustment_file("gen")));
        assert!(!deps.contains(&ctx.paths.piclist_file("gen")));
        let unique: std::collections::BTreeSet<_> = deps.iter().collect();
        assert_eq!(unique.len(), deps.len());
    }

    #[test]
    fn test_unknown_subset_component_is_rejected() {
        let fixture = ProjectFixture::new().unwrap();
        fixture.add_group_config("g1", &["gen"]).unwrap();
        let ctx = fixture.context().unwrap();
        let options = RenderOptions {
            cids: vec!["mat".to_string()],
            ..RenderOptions::default()
        };
        let err = render_group(&ctx, "g1", &options).unwrap_err();
        assert!(matches!(find_rapuma_error(&err), Some(RapumaError::InvalidComponentId { .. })));
    }
}

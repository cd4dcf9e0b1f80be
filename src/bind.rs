//! Binding rendered groups into one document.
//!
//! Groups with a positive `bindingOrder` are concatenated in that order into
//! `Deliverable/<pid>_contents.pdf`. The background and overlay settings of
//! the project apply to the bound file as they do to a group render. Saving
//! keeps a dated copy beside it.

use crate::config::project::{GROUPS, keys};
use crate::core::{ProjectContext, RapumaError};
use crate::postprocess::BackgroundSettings;
use crate::postprocess::background::ensure_background;
use crate::postprocess::merge::{merge_background, temp_beside};
use crate::postprocess::overlay::ensure_view;
use crate::render::command::ExternalCommand;
use crate::utils::fs::ensure_dir;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct BindReport {
    /// Bound groups in binding order.
    pub groups: Vec<String>,
    pub output: PathBuf,
    pub view: Option<PathBuf>,
    pub saved: Option<PathBuf>,
}

/// Groups to bind, sorted by binding order. Ties keep configuration order.
#[must_use]
pub fn binding_order(ctx: &ProjectContext) -> Vec<String> {
    let mut ordered: Vec<(i64, String)> = ctx
        .config
        .group_ids()
        .into_iter()
        .map(|gid| (ctx.config.project.get_int_or(&[GROUPS, gid.as_str()], keys::BINDING_ORDER, 0), gid))
        .filter(|(order, _)| *order > 0)
        .collect();
    ordered.sort_by_key(|(order, _)| *order);
    ordered.into_iter().map(|(_, gid)| gid).collect()
}

/// `<tool> -dBATCH -dNOPAUSE -q -sDEVICE=pdfwrite -dPDFSETTINGS=/prepress -sOutputFile=<out> <pdfs...>`
#[must_use]
pub fn bind_command(tool: &str, output: &Path, pdfs: &[PathBuf]) -> ExternalCommand {
    ExternalCommand::new(tool)
        .args(["-dBATCH", "-dNOPAUSE", "-q", "-sDEVICE=pdfwrite", "-dPDFSETTINGS=/prepress"])
        .arg(format!("-sOutputFile={}", output.display()))
        .args(pdfs.iter().map(|p| p.display().to_string()))
        .with_context("bind")
}

/// Bind every group with a binding order. With `save`, also copy the result
/// to a dated deliverable.
pub fn bind(ctx: &ProjectContext, save: bool) -> Result<BindReport> {
    let groups = binding_order(ctx);
    if groups.is_empty() {
        return Err(RapumaError::Other {
            message: "No group has a binding order greater than 0".to_string(),
        }
        .into());
    }

    let mut pdfs = Vec::with_capacity(groups.len());
    for gid in &groups {
        let pdf = ctx.paths.group_pdf(gid);
        if !pdf.is_file() {
            return Err(RapumaError::MissingRequiredArtifact {
                artifact: "pdf".to_string(),
                path: pdf.display().to_string(),
            }
            .into());
        }
        pdfs.push(pdf);
    }

    let pid = ctx.config.project_id(&ctx.paths);
    let deliverable = ctx.paths.deliverable_dir();
    ensure_dir(&deliverable)?;
    let output = deliverable.join(format!("{pid}_contents.pdf"));

    let temp = temp_beside(&output)?;
    bind_command(&ctx.settings.merge_tool, temp.path(), &pdfs).execute_success()?;
    temp.persist(&output).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Bound {} group(s) into {}", groups.len(), output.display());

    let settings = BackgroundSettings::from_store(&ctx.config.project);
    if settings.has_background() {
        match ensure_background(ctx, &settings, false) {
            Ok((background, _)) => merge_background(&ctx.settings.pdf_utility, &output, &background)?,
            Err(err) => warn!("Binding without background: {:#}", err),
        }
    }
    let view = if settings.wants_view() {
        ensure_view(ctx, &settings, &output, "contents")?
    } else {
        None
    };

    let saved = if save {
        let dated = deliverable.join(format!("{pid}_contents_{}.pdf", Local::now().format("%Y%m%d")));
        let from = view.as_deref().unwrap_or(&output);
        fs::copy(from, &dated)
            .with_context(|| format!("Failed to copy {} to {}", from.display(), dated.display()))?;
        info!("Saved {}", dated.display());
        Some(dated)
    } else {
        None
    };

    Ok(BindReport {
        groups,
        output,
        view,
        saved,
    })
}

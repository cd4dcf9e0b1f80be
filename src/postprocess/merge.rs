//! Merging a layer behind the pages of a PDF.
//!
//! The merge writes to a uniquely named temporary file beside the result,
//! which is then renamed over it. The temporary file is removed if anything
//! fails on the way.

use crate::render::command::ExternalCommand;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// A fresh temporary PDF in the same folder as `path`.
pub fn temp_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    tempfile::Builder::new()
        .prefix(".rapuma-")
        .suffix(".pdf")
        .tempfile_in(&dir)
        .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))
}

/// `<tool> <base> background <layer> output <out>`
#[must_use]
pub fn merge_command(tool: &str, base: &Path, layer: &Path, output: &Path) -> ExternalCommand {
    ExternalCommand::new(tool)
        .arg(base.display().to_string())
        .arg("background")
        .arg(layer.display().to_string())
        .arg("output")
        .arg(output.display().to_string())
        .with_context("merge")
}

/// Merge `layer` behind `base` and write the result to `output`, which may
/// be `base` itself.
pub fn merge_into(tool: &str, base: &Path, layer: &Path, output: &Path) -> Result<()> {
    let temp = temp_beside(output)?;
    merge_command(tool, base, layer, temp.path()).execute_success()?;
    temp.persist(output).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

/// Merge the background composite into a rendered PDF in place.
pub fn merge_background(tool: &str, pdf: &Path, background: &Path) -> Result<()> {
    merge_into(tool, pdf, background, pdf)?;
    info!(target: "postprocess", "Merged {} into {}", background.display(), pdf.display());
    Ok(())
}

//! Centering rendered pages on a print sheet.

use crate::constants::{SHEET_A4, SHEET_LETTER};
use crate::core::ProjectContext;
use crate::postprocess::BackgroundSettings;
use crate::postprocess::background::PageGeometry;
use crate::postprocess::merge::temp_beside;
use crate::render::command::ExternalCommand;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Sheet size in points for a size code, falling back to the trim size.
#[must_use]
pub fn sheet_points(code: &str, trim: (f64, f64)) -> (f64, f64) {
    match code.trim().to_ascii_lowercase().as_str() {
        "a4" => SHEET_A4,
        "letter" => SHEET_LETTER,
        _ => trim,
    }
}

/// Offset that puts a `trim` page in the middle of `sheet`.
#[must_use]
pub fn page_offset(sheet: (f64, f64), trim: (f64, f64)) -> (f64, f64) {
    ((sheet.0 - trim.0) / 2.0, (sheet.1 - trim.1) / 2.0)
}

/// Centering command writing `input` onto `output`.
#[must_use]
pub fn center_command(tool: &str, input: &Path, output: &Path, sheet: (f64, f64), offset: (f64, f64)) -> ExternalCommand {
    ExternalCommand::new(tool)
        .arg("-o")
        .arg(output.display().to_string())
        .arg("-sDEVICE=pdfwrite")
        .arg(format!("-dDEVICEWIDTHPOINTS={:.0}", sheet.0))
        .arg(format!("-dDEVICEHEIGHTPOINTS={:.0}", sheet.1))
        .arg("-dFIXEDMEDIA")
        .arg("-c")
        .arg(format!("<</PageOffset [{:.2} {:.2}]>>", offset.0, offset.1))
        .arg("setpagedevice")
        .arg("-f")
        .arg(input.display().to_string())
        .with_context("center")
}

/// Replace `pdf` with a copy centered on the configured sheet.
pub fn center_on_sheet(ctx: &ProjectContext, settings: &BackgroundSettings, pdf: &Path) -> Result<()> {
    let trim = PageGeometry::from_layout(&ctx.config.layout).trim_points();
    let sheet = sheet_points(&settings.sheet_size, trim);
    let offset = page_offset(sheet, trim);

    let temp = temp_beside(pdf)?;
    center_command(&ctx.settings.center_tool, pdf, temp.path(), sheet, offset).execute_success()?;
    temp.persist(pdf).with_context(|| format!("Failed to replace {}", pdf.display()))?;
    info!(target: "postprocess", "Centered {} on a {:.0}x{:.0}pt sheet", pdf.display(), sheet.0, sheet.1);
    Ok(())
}

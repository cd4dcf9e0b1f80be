//! Steps applied to a rendered PDF.
//!
//! Each step is switched on in `project.toml [Backgrounds]` and runs in a
//! fixed order:
//!
//! 1. rebuild the background composite when stale or forced
//! 2. center the pages on the print sheet
//! 3. merge the background behind the pages
//! 4. write a `-view` copy carrying the watermark and document info
//!
//! Steps 2 and 3 change the rendered file and only run right after a
//! render. The view is rebuilt whenever it is older than the PDF.

pub mod background;
pub mod center;
pub mod merge;
pub mod overlay;

use crate::config::ConfigStore;
use crate::config::project::BACKGROUNDS;
use crate::core::ProjectContext;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Background layers Rapuma knows about.
pub const KNOWN_LAYERS: &[&str] = &["lines", CROPMARKS_LAYER, "box"];

/// Crop marks sit outside the trim area, so the renderer draws them
/// (`PageLayout.useCropmarks`) and the composite leaves them out.
pub const CROPMARKS_LAYER: &str = "cropmarks";

/// `[Backgrounds]` of `project.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSettings {
    pub layers: Vec<String>,
    pub center_on_sheet: bool,
    pub sheet_size: String,
    pub use_watermark: bool,
    pub watermark_text: String,
    pub use_doc_info: bool,
}

impl BackgroundSettings {
    #[must_use]
    pub fn from_store(project: &ConfigStore) -> Self {
        let section = [BACKGROUNDS];
        let layers = project
            .get_list_or_empty(&section, "layers")
            .into_iter()
            .filter(|layer| {
                let known = KNOWN_LAYERS.contains(&layer.as_str());
                if !known {
                    warn!(target: "postprocess", "Ignoring unknown background layer '{}'", layer);
                }
                known
            })
            .collect();
        Self {
            layers,
            center_on_sheet: project.get_bool_or(&section, "centerOnSheet", false),
            sheet_size: project.get_str_or(&section, "sheetSize", ""),
            use_watermark: project.get_bool_or(&section, "useWatermark", false),
            watermark_text: project.get_str_or(&section, "watermarkText", "DRAFT"),
            use_doc_info: project.get_bool_or(&section, "useDocInfo", false),
        }
    }

    /// Layers drawn into the background composite.
    pub fn drawn_layers(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(String::as_str).filter(|layer| *layer != CROPMARKS_LAYER)
    }

    #[must_use]
    pub fn has_background(&self) -> bool {
        self.drawn_layers().next().is_some()
    }

    #[must_use]
    pub const fn wants_view(&self) -> bool {
        self.use_watermark || self.use_doc_info
    }
}

/// What the post-processor did.
#[derive(Debug, Clone, Default)]
pub struct PostProcessReport {
    pub background: Option<PathBuf>,
    pub background_rebuilt: bool,
    pub centered: bool,
    pub background_merged: bool,
    pub view: Option<PathBuf>,
}

/// Apply every enabled step to `pdf`.
///
/// `rendered` says whether `pdf` was produced in this invocation. Optional
/// steps that fail are logged and skipped.
pub fn post_process(
    ctx: &ProjectContext,
    pdf: &Path,
    label: &str,
    rendered: bool,
    force_background: bool,
) -> Result<PostProcessReport> {
    let settings = BackgroundSettings::from_store(&ctx.config.project);
    let mut report = PostProcessReport::default();

    if settings.has_background() {
        match background::ensure_background(ctx, &settings, force_background) {
            Ok((path, rebuilt)) => {
                report.background = Some(path);
                report.background_rebuilt = rebuilt;
            }
            Err(err) => warn!(target: "postprocess", "Background unavailable, skipping it: {:#}", err),
        }
    }

    if rendered && settings.center_on_sheet {
        center::center_on_sheet(ctx, &settings, pdf)?;
        report.centered = true;
    }

    if rendered {
        if let Some(bg) = &report.background {
            merge::merge_background(&ctx.settings.pdf_utility, pdf, bg)?;
            report.background_merged = true;
        }
    }

    if settings.wants_view() {
        report.view = overlay::ensure_view(ctx, &settings, pdf, label)?;
    } else {
        debug!(target: "postprocess", "No overlays enabled");
    }
    Ok(report)
}

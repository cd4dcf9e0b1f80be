//! Watermark and document-info views.
//!
//! The view is a copy of the rendered PDF, `<name>-view.pdf`, with each
//! enabled overlay merged in. The rendered file itself is never changed.

use crate::artifact::is_stale;
use crate::core::ProjectContext;
use crate::postprocess::BackgroundSettings;
use crate::postprocess::background::{PageGeometry, svg_to_pdf};
use crate::postprocess::merge::{merge_into, temp_beside};
use crate::project::ProjectPaths;
use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_page(geometry: &PageGeometry, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n\
         {body}</svg>\n",
        w = geometry.width,
        h = geometry.height,
    )
}

/// Large diagonal text across the page.
#[must_use]
pub fn watermark_svg(geometry: &PageGeometry, text: &str) -> String {
    let (cx, cy) = (geometry.width / 2.0, geometry.height / 2.0);
    let size = geometry.width / 5.0;
    let body = format!(
        "  <text x=\"{cx:.2}\" y=\"{cy:.2}\" font-family=\"sans-serif\" font-size=\"{size:.2}\" \
         fill=\"#d0d0d0\" fill-opacity=\"0.5\" text-anchor=\"middle\" \
         transform=\"rotate(-45 {cx:.2} {cy:.2})\">{}</text>\n",
        escape_xml(text)
    );
    svg_page(geometry, &body)
}

/// One line of small text in the bottom margin.
#[must_use]
pub fn doc_info_svg(geometry: &PageGeometry, text: &str) -> String {
    let y = geometry.height - geometry.bottom_margin() / 3.0;
    let body = format!(
        "  <text x=\"{:.2}\" y=\"{y:.2}\" font-family=\"sans-serif\" font-size=\"2.5\" fill=\"#404040\">{}</text>\n",
        geometry.side_margin(),
        escape_xml(text)
    );
    svg_page(geometry, &body)
}

/// Text of the document-info line.
#[must_use]
pub fn doc_info_text(ctx: &ProjectContext, label: &str) -> String {
    format!(
        "{} | {} | {}",
        ctx.config.project_id(&ctx.paths),
        label,
        Local::now().format("%Y-%m-%d %H:%M")
    )
}

/// Make sure `<pdf>-view.pdf` is current. `None` when there is nothing to
/// overlay onto.
pub fn ensure_view(
    ctx: &ProjectContext,
    settings: &BackgroundSettings,
    pdf: &Path,
    label: &str,
) -> Result<Option<PathBuf>> {
    if !pdf.is_file() {
        warn!(target: "postprocess", "No {} to build a view from", pdf.display());
        return Ok(None);
    }
    let view = ProjectPaths::view_pdf(pdf);
    if !is_stale(&view, &[pdf.to_path_buf(), ctx.paths.project_conf()]) {
        return Ok(Some(view));
    }

    let geometry = PageGeometry::from_layout(&ctx.config.layout);
    let mut layers = Vec::new();
    if settings.use_watermark {
        layers.push(("watermark", watermark_svg(&geometry, &settings.watermark_text)));
    }
    if settings.use_doc_info {
        layers.push(("document info", doc_info_svg(&geometry, &doc_info_text(ctx, label))));
    }

    let mut base = pdf.to_path_buf();
    for (name, svg) in layers {
        let layer = temp_beside(&view)?;
        svg_to_pdf(ctx, &svg, layer.path())?;
        merge_into(&ctx.settings.pdf_utility, &base, layer.path(), &view)?;
        info!(target: "postprocess", "Added {} to {}", name, view.display());
        base.clone_from(&view);
    }
    Ok(Some(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ProjectFixture;

    fn geometry() -> PageGeometry {
        PageGeometry {
            width: 150.0,
            height: 210.0,
            margin_unit: 12.0,
            top_margin_factor: 1.75,
            bottom_margin_factor: 2.0,
            side_margin_factor: 1.0,
            baseline_skip: 5.0,
        }
    }

    #[test]
    fn test_watermark_is_escaped_and_centered() {
        let svg = watermark_svg(&geometry(), "R&D <draft>");
        assert!(svg.contains(">R&amp;D &lt;draft&gt;</text>"));
        assert!(svg.contains("rotate(-45 75.00 105.00)"));
        assert!(svg.contains("font-size=\"30.00\""));
    }

    #[test]
    fn test_doc_info_position() {
        let svg = doc_info_svg(&geometry(), "TEST | g1");
        assert!(svg.contains("x=\"12.00\" y=\"202.00\""));
        assert!(svg.contains(">TEST | g1</text>"));
    }

    #[test]
    fn test_no_view_without_pdf() {
        let fixture = ProjectFixture::new().unwrap();
        let ctx = fixture.context().unwrap();
        let settings = BackgroundSettings {
            layers: Vec::new(),
            center_on_sheet: false,
            sheet_size: String::new(),
            use_watermark: true,
            watermark_text: "DRAFT".to_string(),
            use_doc_info: false,
        };
        let view = ensure_view(&ctx, &settings, &fixture.paths().group_pdf("g1"), "g1").unwrap();
        assert!(view.is_none());
        assert!(doc_info_text(&ctx, "g1").starts_with("TEST | g1 | "));
    }
}

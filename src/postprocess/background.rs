//! Background composite: `Illustrations/background.pdf`.
//!
//! The enabled layers are drawn into one SVG page sized from the layout and
//! converted to PDF with the configured SVG converter. Sizes in the SVG are
//! millimetres. Crop marks are not part of the composite; the renderer
//! places them on the sheet when `PageLayout.useCropmarks` is set.

use crate::artifact::is_stale;
use crate::config::ConfigStore;
use crate::constants::MM_TO_PT;
use crate::core::{ProjectContext, RapumaError};
use crate::postprocess::BackgroundSettings;
use crate::render::command::ExternalCommand;
use crate::utils::fs::ensure_dir;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

const STROKE: &str = "#7fa7d0";

/// Page geometry in millimetres, read from `layout.toml`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_unit: f64,
    pub top_margin_factor: f64,
    pub bottom_margin_factor: f64,
    pub side_margin_factor: f64,
    /// Distance between baselines.
    pub baseline_skip: f64,
}

impl PageGeometry {
    #[must_use]
    pub fn from_layout(layout: &ConfigStore) -> Self {
        let page = ["PageLayout"];
        let text = ["TextElements"];
        let font_size_unit = layout.get_float(&text, "fontSizeUnit").unwrap_or(0.9);
        let line_spacing = layout.get_float(&text, "lineSpacingFactor").unwrap_or(1.1);
        Self {
            width: layout.get_float(&page, "pageWidth").unwrap_or(148.0),
            height: layout.get_float(&page, "pageHeight").unwrap_or(210.0),
            margin_unit: layout.get_float(&page, "marginUnit").unwrap_or(12.0),
            top_margin_factor: layout.get_float(&page, "topMarginFactor").unwrap_or(1.75),
            bottom_margin_factor: layout.get_float(&page, "bottomMarginFactor").unwrap_or(2.0),
            side_margin_factor: layout.get_float(&page, "sideMarginFactor").unwrap_or(1.0),
            // 12pt body size scaled by the font size unit, with 1.2 leading
            baseline_skip: 12.0 * font_size_unit * line_spacing * 1.2 / MM_TO_PT,
        }
    }

    #[must_use]
    pub fn top_margin(&self) -> f64 {
        self.margin_unit * self.top_margin_factor
    }

    #[must_use]
    pub fn bottom_margin(&self) -> f64 {
        self.margin_unit * self.bottom_margin_factor
    }

    #[must_use]
    pub fn side_margin(&self) -> f64 {
        self.margin_unit * self.side_margin_factor
    }

    /// Trim size in PostScript points.
    #[must_use]
    pub fn trim_points(&self) -> (f64, f64) {
        (self.width * MM_TO_PT, self.height * MM_TO_PT)
    }
}

fn line(svg: &mut String, x1: f64, y1: f64, x2: f64, y2: f64) {
    let _ = writeln!(
        svg,
        r#"  <line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{STROKE}" stroke-width="0.15"/>"#
    );
}

fn draw_lines(svg: &mut String, g: &PageGeometry) {
    let left = g.side_margin();
    let right = g.width - g.side_margin();
    let bottom = g.height - g.bottom_margin();
    let mut y = g.top_margin() + g.baseline_skip;
    while y <= bottom && g.baseline_skip > 0.0 {
        line(svg, left, y, right, y);
        y += g.baseline_skip;
    }
}

fn draw_box(svg: &mut String, g: &PageGeometry) {
    let _ = writeln!(
        svg,
        r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{STROKE}" stroke-width="0.25"/>"#,
        g.side_margin(),
        g.top_margin(),
        g.width - 2.0 * g.side_margin(),
        g.height - g.top_margin() - g.bottom_margin(),
    );
}

/// One SVG page with every requested layer.
#[must_use]
pub fn background_svg<'a>(geometry: &PageGeometry, layers: impl IntoIterator<Item = &'a str>) -> String {
    let mut svg = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n",
        w = geometry.width,
        h = geometry.height,
    );
    for layer in layers {
        match layer {
            "lines" => draw_lines(&mut svg, geometry),
            "box" => draw_box(&mut svg, geometry),
            _ => {}
        }
    }
    svg.push_str("</svg>\n");
    svg
}

/// Convert an SVG document to `output` with the configured converter.
pub fn svg_to_pdf(ctx: &ProjectContext, svg: &str, output: &Path) -> Result<()> {
    let dir = output.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    ensure_dir(&dir)?;
    let mut source = tempfile::Builder::new()
        .prefix(".rapuma-")
        .suffix(".svg")
        .tempfile_in(&dir)
        .context("Failed to create temporary SVG file")?;
    source.write_all(svg.as_bytes()).context("Failed to write temporary SVG file")?;
    source.flush()?;

    let argv = ctx.settings.svg_converter_args(source.path(), output);
    ExternalCommand::from_argv(&argv)?.with_context("svg conversion").execute_success()?;
    Ok(())
}

/// Make sure the background composite is current.
///
/// Returns its path and whether it was rebuilt in this call.
pub fn ensure_background(
    ctx: &ProjectContext,
    settings: &BackgroundSettings,
    force: bool,
) -> Result<(PathBuf, bool)> {
    let target = ctx.paths.background_pdf();
    let deps = [ctx.paths.layout_conf(), ctx.paths.project_conf()];
    if !force && !is_stale(&target, &deps) {
        return Ok((target, false));
    }

    let geometry = PageGeometry::from_layout(&ctx.config.layout);
    let svg = background_svg(&geometry, settings.drawn_layers());
    svg_to_pdf(ctx, &svg, &target)?;
    if !target.is_file() {
        return Err(RapumaError::RenderOutputMissing {
            path: target.display().to_string(),
        }
        .into());
    }
    let layers: Vec<&str> = settings.drawn_layers().collect();
    info!(target: "postprocess", "Rebuilt background {} ({})", target.display(), layers.join(", "));
    Ok((target, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> PageGeometry {
        PageGeometry {
            width: 148.0,
            height: 210.0,
            margin_unit: 12.0,
            top_margin_factor: 1.75,
            bottom_margin_factor: 2.0,
            side_margin_factor: 1.0,
            baseline_skip: 5.0,
        }
    }

    /// `(x1, y1, x2, y2)` of every `<line>` in `svg`.
    fn segments(svg: &str) -> Vec<[f64; 4]> {
        let re = regex::Regex::new(r#"x1="([\d.-]+)" y1="([\d.-]+)" x2="([\d.-]+)" y2="([\d.-]+)""#).unwrap();
        re.captures_iter(svg)
            .map(|c| [1_usize, 2, 3, 4].map(|i| c[i].parse::<f64>().unwrap()))
            .collect()
    }

    #[test]
    fn test_layers_drawn() {
        let g = geometry();
        let svg = background_svg(&g, ["box"]);
        assert!(svg.contains("width=\"148mm\""));
        assert!(svg.contains(r#"<rect x="12.00" y="21.00" width="124.00" height="165.00""#));
        assert!(!svg.contains("<line"));

        let svg = background_svg(&g, ["lines"]);
        // Baselines from 26mm down to the bottom margin at 186mm.
        let lines = segments(&svg);
        assert_eq!(lines.len(), 33);
        for [x1, y1, x2, y2] in lines {
            for (x, y) in [(x1, y1), (x2, y2)] {
                assert!((0.0..=g.width).contains(&x) && (0.0..=g.height).contains(&y));
            }
        }
    }

    #[test]
    fn test_cropmarks_are_left_to_the_renderer() {
        let g = geometry();
        let svg = background_svg(&g, ["cropmarks"]);
        assert!(segments(&svg).is_empty());
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn test_geometry_from_layout_defaults() {
        let layout = ConfigStore::parse("layout.toml", "[PageLayout]\npageWidth = \"100\"\n").unwrap();
        let g = PageGeometry::from_layout(&layout);
        assert!((g.width - 100.0).abs() < f64::EPSILON);
        assert!((g.height - 210.0).abs() < f64::EPSILON);
        let (w, _) = g.trim_points();
        assert!((w - 283.46).abs() < 0.01);
    }
}

//! Global constants used throughout the Rapuma codebase.
//!
//! This module holds fixed file-name suffixes, folder names, external tool
//! defaults and the renderer exit-code table. Keeping them in one place makes
//! the on-disk naming scheme of a project discoverable.

/// Environment variable naming the installation root that holds shared
/// macro packages and illustration resources.
pub const ENV_BASE_ROOT: &str = "RAPUMA_BASE";

/// Environment variable naming the per-user root (user config and resources).
pub const ENV_USER_ROOT: &str = "RAPUMA_USER";

/// Name of the user settings file inside the user root.
pub const USER_SETTINGS_FILE: &str = "rapuma.toml";

/// Project configuration folder.
pub const CONFIG_FOLDER: &str = "Config";
/// Folder holding one sub-folder per group and per component.
pub const COMPONENTS_FOLDER: &str = "Components";
/// Project macro folder. Macro packages live in sub-folders.
pub const MACROS_FOLDER: &str = "Macros";
/// Generated and user-editable TeX files.
pub const TEX_FOLDER: &str = "Tex";
/// Stylesheets.
pub const STYLES_FOLDER: &str = "Styles";
/// Processed hyphenation word lists.
pub const HYPHENATION_FOLDER: &str = "Hyphenation";
/// Illustrations and background layers.
pub const ILLUSTRATIONS_FOLDER: &str = "Illustrations";
/// Bound deliverables.
pub const DELIVERABLE_FOLDER: &str = "Deliverable";
/// Fonts installed into the project.
pub const FONTS_FOLDER: &str = "Fonts";

/// Project store file names.
pub const PROJECT_CONF: &str = "project.toml";
pub const LAYOUT_CONF: &str = "layout.toml";
pub const FONT_CONF: &str = "font.toml";
pub const ILLUSTRATION_CONF: &str = "illustration.toml";

/// Suffix for the read-only copy of the imported source text.
pub const SOURCE_SUFFIX: &str = "source";

/// Suffix for the versioned backup of a component's working text.
pub const CV1_SUFFIX: &str = "cv1";

/// Working-text handle appended to every component id.
pub const BASE_HANDLE: &str = "_base";

/// File name of the rendered background composite.
pub const BACKGROUND_PDF: &str = "background.pdf";

/// Suffix of the overlay view output.
pub const VIEW_SUFFIX: &str = "-view";

/// Default external tools.
pub const DEFAULT_RENDERER: &str = "xetex";
pub const DEFAULT_PDF_UTILITY: &str = "pdftk";
pub const DEFAULT_CENTER_TOOL: &str = "gs";
pub const DEFAULT_MERGE_TOOL: &str = "gs";

/// Default vector-to-PDF conversion command. `{in}` and `{out}` are replaced
/// with the input SVG and the output PDF.
pub const DEFAULT_SVG_CONVERTER: &[&str] = &["rsvg-convert", "-f", "pdf", "-o", "{out}", "{in}"];

/// Renderer exit status signalling success.
pub const RENDER_OK: i32 = 0;

/// Renderer exit status the renderer uses for a catastrophic failure.
pub const RENDER_CATASTROPHIC: i32 = 256;

/// Human-readable mapping of known renderer exit codes.
pub fn render_exit_message(code: i32) -> Option<&'static str> {
    match code {
        RENDER_OK => Some("Rendering successful."),
        RENDER_CATASTROPHIC => Some("Something really awful happened."),
        _ => None,
    }
}

/// Sheet sizes in PostScript points (width, height).
pub const SHEET_A4: (f64, f64) = (595.0, 842.0);
pub const SHEET_LETTER: (f64, f64) = (612.0, 792.0);

/// Millimetres to PostScript points.
pub const MM_TO_PT: f64 = 72.0 / 25.4;

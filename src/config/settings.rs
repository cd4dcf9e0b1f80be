//! User-level system settings.
//!
//! Settings that belong to the machine rather than to a project: which
//! renderer to run, which PDF tools to call, and where the user keeps their own
//! resource overrides. The file is `rapuma.toml`, looked up in this order:
//!
//! 1. `$RAPUMA_USER/rapuma.toml`
//! 2. `<platform config dir>/rapuma/rapuma.toml`
//!
//! A missing file is not an error; every field has a default.
//!
//! ```toml
//! renderer = "xetex"
//! pdfUtility = "pdftk"
//! centerTool = "gs"
//! mergeTool = "gs"
//! svgConverter = ["rsvg-convert", "-f", "pdf", "-o", "{out}", "{in}"]
//! diffCommand = ["meld"]
//! userResources = "~/Publishing/rapuma-resources"
//! ```
//!
//! `svgConverter` is an argument vector; `{in}` and `{out}` are replaced by
//! the SVG source and the PDF destination.

use crate::constants::{
    DEFAULT_CENTER_TOOL, DEFAULT_MERGE_TOOL, DEFAULT_PDF_UTILITY, DEFAULT_RENDERER,
    DEFAULT_SVG_CONVERTER, ENV_USER_ROOT, USER_SETTINGS_FILE,
};
use crate::core::RapumaError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemSettings {
    /// TeX engine invoked for rendering.
    pub renderer: String,

    /// Tool used to stamp one PDF onto another (`pdftk`-compatible).
    pub pdf_utility: String,

    /// Ghostscript-compatible tool used to place a page on a larger sheet.
    pub center_tool: String,

    /// Ghostscript-compatible tool used to concatenate PDFs when binding.
    pub merge_tool: String,

    /// Argument vector that converts an SVG to PDF.
    pub svg_converter: Vec<String>,

    /// Optional external viewer for update diffs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diff_command: Vec<String>,

    /// Root of the user's own resource overrides (macros, ext templates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_resources: Option<PathBuf>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            renderer: DEFAULT_RENDERER.to_string(),
            pdf_utility: DEFAULT_PDF_UTILITY.to_string(),
            center_tool: DEFAULT_CENTER_TOOL.to_string(),
            merge_tool: DEFAULT_MERGE_TOOL.to_string(),
            svg_converter: DEFAULT_SVG_CONVERTER.iter().map(ToString::to_string).collect(),
            diff_command: Vec::new(),
            user_resources: None,
        }
    }
}

impl SystemSettings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            Some(path) => {
                debug!("No system settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read system settings: {}", path.display()))?;
        let mut settings: Self = toml::from_str(&content).map_err(|e| RapumaError::ConfigError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        settings.user_resources = settings.user_resources.map(|p| expand_path(&p));
        Ok(settings)
    }

    /// `$RAPUMA_USER/rapuma.toml` when set, else the platform config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        match std::env::var(ENV_USER_ROOT) {
            Ok(user_root) if !user_root.is_empty() => {
                return Some(expand_path(Path::new(&user_root)).join(USER_SETTINGS_FILE));
            }
            _ => {}
        }
        dirs::config_dir().map(|dir| dir.join("rapuma").join(USER_SETTINGS_FILE))
    }

    /// The SVG converter argv with `{in}`/`{out}` substituted.
    #[must_use]
    pub fn svg_converter_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.display().to_string();
        let output = output.display().to_string();
        self.svg_converter
            .iter()
            .map(|arg| arg.replace("{in}", &input).replace("{out}", &output))
            .collect()
    }
}

/// Expand `~` and environment variables in a path.
#[must_use]
pub fn expand_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    match shellexpand::full(&text) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_for_missing_fields() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("rapuma.toml");
        fs::write(&path, "renderer = \"xelatex\"\n").unwrap();

        let settings = SystemSettings::load_from(&path).unwrap();
        assert_eq!(settings.renderer, "xelatex");
        assert_eq!(settings.pdf_utility, "pdftk");
        assert_eq!(settings.svg_converter[0], "rsvg-convert");
        assert!(settings.user_resources.is_none());
    }

    #[test]
    fn test_svg_converter_args() {
        let settings = SystemSettings {
            svg_converter: vec!["conv".into(), "{in}".into(), "--out={out}".into()],
            ..SystemSettings::default()
        };
        let args = settings.svg_converter_args(Path::new("a.svg"), Path::new("b.pdf"));
        assert_eq!(args, vec!["conv", "a.svg", "--out=b.pdf"]);
    }

    #[test]
    fn test_invalid_settings_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("rapuma.toml");
        fs::write(&path, "renderer = [").unwrap();
        assert!(SystemSettings::load_from(&path).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_user_root_selects_settings_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(USER_SETTINGS_FILE), "mergeTool = \"qpdf\"\n").unwrap();

        let previous = std::env::var_os(ENV_USER_ROOT);
        // SAFETY: every test reading RAPUMA_USER runs serially
        unsafe { std::env::set_var(ENV_USER_ROOT, temp.path()) };
        let path = SystemSettings::default_path();
        let settings = SystemSettings::load();
        unsafe {
            match previous {
                Some(value) => std::env::set_var(ENV_USER_ROOT, value),
                None => std::env::remove_var(ENV_USER_ROOT),
            }
        }

        assert_eq!(path, Some(temp.path().join(USER_SETTINGS_FILE)));
        assert_eq!(settings.unwrap().merge_tool, "qpdf");
    }
}

//! Settings file: `Tex/<cType>_set.tex`.
//!
//! Turns `layout.toml` into renderer directives using the macro package's
//! settings map (`Config/<macPack>.toml`, or the map built into Rapuma), then
//! appends one block per installed font and a fixed set of helper macros.
//!
//! # Key order
//!
//! Within a section, keys are written in this order, each key once:
//!
//! 1. the layout section's own `inputOrder` list
//! 2. the map section's `inputOrder` list
//! 3. every remaining key in the order the layout holds them
//!
//! # Skipped values
//!
//! Empty values, `0`, keys without a TeX line, and keys whose `boolDepend`
//! flag does not have the wanted state produce no line. A section without
//! any line is left out entirely, header included.

use crate::artifact::ArtifactKind;
use crate::config::ConfigStore;
use crate::config::project::BACKGROUNDS;
use crate::core::{ProjectContext, RapumaError};
use crate::generators::{ArtifactGenerator, BuildRequest, file_header};
use crate::postprocess::CROPMARKS_LAYER;
use crate::project::ProjectPaths;
use crate::render::registry::MacroPackage;
use crate::utils::fs::safe_write;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{Item, Table};
use tracing::{debug, info};

const GENERAL_SETTINGS: &str = "GeneralSettings";
const INPUT_ORDER: &str = "inputOrder";

/// Fixed helper macros appended to every settings file.
const SPECIAL_COMMANDS: &str = "\n% Special commands\n\
\\catcode`@=11\n\
\\def\\makedigitsother{\\m@kedigitsother}\n\
\\def\\makedigitsletters{\\m@kedigitsletters}\n\
\\catcode `@=12\n\
\\def\\nbsp{\u{00a0}}\n\
\\def\\zwsp{\u{200b}}\n\
\\newdimen\\remblskip \\remblskip=\\baselineskip\n\
\\def\\suckupline{\\vskip -\\baselineskip}\n\
\\def\\suckuphalfline{\\vskip -0.5\\baselineskip}\n\
\\def\\suckupqline{\\vskip -0.25\\baselineskip}\n\
\\def\\skipline{\\vskip\\baselineskip}\n\
\\def\\skiphalfline{\\vskip 0.5\\baselineskip}\n\
\\def\\skipqline{\\vskip 0.25\\baselineskip}\n";

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsMap {
    #[serde(rename = "section", default)]
    pub sections: Vec<MapSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSection {
    pub id: String,
    #[serde(default)]
    pub input_order: Vec<String>,
    #[serde(rename = "setting", default)]
    pub settings: Vec<MapSetting>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSetting {
    pub key: String,
    #[serde(default)]
    pub tex: String,
    #[serde(default)]
    pub default: Option<toml::Value>,
    #[serde(default)]
    pub bool_depend: Option<BoolDepend>,
}

/// `Section:key` flag gating a setting.
#[derive(Debug, Clone, Deserialize)]
pub struct BoolDepend {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default = "default_state")]
    pub state: bool,
}

const fn default_state() -> bool {
    true
}

impl SettingsMap {
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            RapumaError::ConfigError {
                file: origin.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// The project's map when it has one, else the package's built-in map.
    pub fn load(paths: &ProjectPaths, package: &dyn MacroPackage) -> Result<Self> {
        let path = paths.macpack_conf(package.name());
        if path.is_file() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings map: {}", path.display()))?;
            Self::parse(&content, &path.display().to_string())
        } else {
            Self::parse(package.builtin_settings_map(), package.name())
        }
    }

    fn section(&self, id: &str) -> Option<&MapSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Layout defaults as a table of sections.
    #[must_use]
    pub fn defaults(&self) -> Table {
        let mut root = Table::new();
        for section in &self.sections {
            let mut table = Table::new();
            for setting in &section.settings {
                if let Some(value) = setting.default.as_ref().and_then(to_edit_value) {
                    table.insert(&setting.key, Item::Value(value));
                }
            }
            if !table.is_empty() {
                root.insert(&section.id, Item::Table(table));
            }
        }
        root
    }
}

fn to_edit_value(value: &toml::Value) -> Option<toml_edit::Value> {
    match value {
        toml::Value::String(s) => Some(s.as_str().into()),
        toml::Value::Integer(i) => Some((*i).into()),
        toml::Value::Float(f) => Some((*f).into()),
        toml::Value::Boolean(b) => Some((*b).into()),
        _ => None,
    }
}

impl MapSection {
    fn setting(&self, key: &str) -> Option<&MapSetting> {
        self.settings.iter().find(|s| s.key == key)
    }
}

/// Persist the macro package's settings map and layout defaults into the
/// project. Existing values are never overwritten. Returns whether
/// `layout.toml` changed.
pub fn install_layout_defaults(paths: &ProjectPaths, package: &dyn MacroPackage) -> Result<bool> {
    let map_path = paths.macpack_conf(package.name());
    if !map_path.exists() {
        safe_write(&map_path, package.builtin_settings_map())?;
        info!("Installed settings map {}", map_path.display());
    }
    let map = SettingsMap::load(paths, package)?;
    let mut layout = ConfigStore::load(paths.layout_conf())?;
    let changed = layout.merge_defaults(&[], &map.defaults())?;
    if changed {
        layout.save()?;
        debug!("Merged layout defaults for {}", package.name());
    }
    Ok(changed)
}

/// Keys of one section in output order.
fn ordered_keys(layout: &ConfigStore, section: &MapSection) -> Vec<String> {
    let present: Vec<String> =
        layout.keys(&[section.id.as_str()]).into_iter().filter(|k| k != INPUT_ORDER).collect();
    let overrides = layout.get_list_or_empty(&[section.id.as_str()], INPUT_ORDER);

    let mut order: Vec<String> = Vec::with_capacity(present.len());
    for key in overrides.iter().chain(&section.input_order).chain(&present) {
        if present.contains(key) && !order.contains(key) {
            order.push(key.clone());
        }
    }
    order
}

fn bool_depend_holds(layout: &ConfigStore, depend: &BoolDepend) -> bool {
    let Some((section, key)) = depend.reference.split_once(':') else {
        return false;
    };
    layout.get_bool(&[section], key).unwrap_or(false) == depend.state
}

fn project_folder(paths: &ProjectPaths, name: &str) -> Option<PathBuf> {
    Some(match name {
        "home" => paths.home().to_path_buf(),
        "components" => paths.components_dir(),
        "fonts" => paths.fonts_dir(),
        "hyphenation" => paths.hyphenation_dir(),
        "illustrations" => paths.illustrations_dir(),
        "macros" => paths.macros_dir(),
        "styles" => paths.styles_dir(),
        "tex" => paths.tex_dir(),
        _ => return None,
    })
}

/// Replace the placeholder in a TeX line with its value.
fn fill_placeholder(line: &str, value: &str, unit: &str, paths: &ProjectPaths) -> Result<String> {
    let re = Regex::new(r"\[(vm|v|path:([A-Za-z]+))\]")?;
    let Some(caps) = re.captures(line) else {
        return Ok(line.to_string());
    };
    let replacement = match caps.get(2) {
        Some(folder) => project_folder(paths, folder.as_str())
            .ok_or_else(|| RapumaError::GeneratorFailed {
                artifact: ArtifactKind::Settings.to_string(),
                reason: format!("unknown path placeholder '{}'", folder.as_str()),
            })?
            .display()
            .to_string(),
        None if &caps[1] == "vm" => format!("{value}{unit}"),
        None => value.to_string(),
    };
    Ok(re.replace(line, regex::NoExpand(&replacement)).into_owned())
}

fn layout_lines(ctx: &ProjectContext, map: &SettingsMap, layout: &ConfigStore) -> Result<String> {
    let unit = layout.get_str_or(&[GENERAL_SETTINGS], "measurementUnit", "mm");
    let mut out = String::new();
    for section in &map.sections {
        let mut lines = Vec::new();
        for key in ordered_keys(layout, section) {
            let Some(setting) = section.setting(&key) else {
                continue;
            };
            if setting.tex.is_empty() {
                continue;
            }
            let Some(value) = layout.get_str(&[section.id.as_str()], &key) else {
                continue;
            };
            if value.is_empty() || value == "0" {
                continue;
            }
            if let Some(depend) = &setting.bool_depend {
                if !bool_depend_holds(layout, depend) {
                    continue;
                }
            }
            lines.push(fill_placeholder(&setting.tex, &value, &unit, &ctx.paths)?);
        }
        if !lines.is_empty() {
            out.push_str(&format!("\n% {}\n", section.id));
            for line in lines {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

/// Substitute `^^name^^` font parameters and tidy what is left.
fn apply_font_params(line: &str, params: &[(&str, String)]) -> Result<String> {
    let mut line = line.to_string();
    for (name, value) in params {
        line = line.replace(name, value);
    }
    let unused = Regex::new(r"\^\^[a-z]+\^\^")?;
    let line = unused.replace_all(&line, "");
    Ok(line.replace(":\"", "\""))
}

fn font_lines(ctx: &ProjectContext) -> Result<String> {
    let font = &ctx.config.font;
    let primary = font.get_str_or(&["FontSettings"], "primaryFont", "");
    let mapping = font.get_str_or(&["FontSettings"], "useMapping", "");
    let renderer = font.get_str_or(&["FontSettings"], "useRenderingSystem", "");
    let language = font.get_str_or(&["FontSettings"], "useLanguage", "");

    let mut out = String::from("\n% Font Definitions\n");
    for name in font.keys(&["Fonts"]) {
        let font_path = ctx.paths.fonts_dir().join(&name).display().to_string();
        let defs = |kind: &str| -> Vec<String> {
            let section = ["Fonts", name.as_str(), kind];
            font.keys(&section).iter().filter_map(|k| font.get_str(&section, k)).collect()
        };

        if name == primary {
            let mut params = vec![("^^path^^", font_path.clone())];
            if !mapping.is_empty() {
                params.push(("^^mapping^^", format!("mapping={font_path}/{mapping}:")));
            }
            if !renderer.is_empty() {
                params.push(("^^renderer^^", format!("/{renderer}:")));
            }
            if !language.is_empty() {
                params.push(("^^language^^", format!("language={language}:")));
            }
            out.push_str("\n% These are normal use fonts for this type of component.\n");
            for def in defs("PrimaryFont") {
                out.push_str(&apply_font_params(&def, &params)?);
                out.push('\n');
            }
            out.push_str("\n% These are font settings for other custom uses.\n");
            for def in defs("SecondaryFont") {
                out.push_str(&apply_font_params(&def, &params)?);
                out.push('\n');
            }
        } else {
            let params = vec![
                ("^^mapping^^", String::new()),
                ("^^renderer^^", String::new()),
                ("^^language^^", String::new()),
                ("^^path^^", font_path.clone()),
            ];
            out.push_str("\n% These are non-primary extra font settings for other custom uses.\n");
            for def in defs("SecondaryFont") {
                out.push_str(&apply_font_params(&def, &params)?);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

/// Full settings file content.
pub fn settings_content(ctx: &ProjectContext, package: &dyn MacroPackage, target: &Path) -> Result<String> {
    let map = SettingsMap::load(&ctx.paths, package)?;
    let mut layout = ctx.config.layout.clone();
    layout.merge_defaults(&[], &map.defaults())?;

    let layers = ctx.config.project.get_list_or_empty(&[BACKGROUNDS], "layers");
    if layers.iter().any(|l| l == CROPMARKS_LAYER) {
        layout.set(&["PageLayout"], "useCropmarks", true)?;
    }

    let mut content = file_header(target, "Layout and font settings for the renderer", false);
    content.push_str(&layout_lines(ctx, &map, &layout)?);
    content.push_str(&font_lines(ctx)?);
    content.push_str(SPECIAL_COMMANDS);
    Ok(content)
}

pub struct SettingsGenerator;

impl ArtifactGenerator for SettingsGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Settings
    }

    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![ctx.paths.settings_file(req.ctype())]
    }

    fn dependencies(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf> {
        vec![
            ctx.paths.layout_conf(),
            ctx.paths.font_conf(),
            ctx.paths.project_conf(),
            ctx.paths.macpack_conf(req.mac_pack()),
        ]
    }

    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()> {
        let target = ctx.paths.settings_file(req.ctype());
        let content = settings_content(ctx, req.package.as_ref(), &target)?;
        safe_write(&target, &content)
    }
}

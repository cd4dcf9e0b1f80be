//! Artifact generators.
//!
//! One generator per artifact kind. A generator names the files it produces
//! for a [`BuildRequest`], the files those depend on, and how to write them.
//! It never decides whether a failure is fatal: the assembler consults the
//! artifact catalog for that.
//!
//! | kind                    | module         |
//! |-------------------------|----------------|
//! | macro link              | [`maclink`]    |
//! | settings                | [`settings`]   |
//! | extension placeholders  | [`extension`]  |
//! | default stylesheet      | [`style`]      |
//! | hyphenation and lccode  | [`hyphenation`]|
//! | control file            | [`control`]    |

pub mod control;
pub mod extension;
pub mod hyphenation;
pub mod maclink;
pub mod settings;
pub mod style;

use crate::artifact::{ArtifactKind, is_stale};
use crate::config::GroupEntry;
use crate::core::{ProjectContext, RapumaError};
use crate::render::registry::MacroPackage;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a generator needs to know about one render.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub gid: String,
    pub group: GroupEntry,
    /// Components included in this render, in group order.
    pub cids: Vec<String>,
    /// Whether `cids` is the group's whole component list.
    pub full_group: bool,
    pub package: Arc<dyn MacroPackage>,
}

impl BuildRequest {
    /// Resolve a request for `gid`. `subset` restricts the render to some of
    /// the group's components; ids outside the group are rejected.
    pub fn new(ctx: &ProjectContext, gid: &str, subset: Option<&[String]>) -> Result<Self> {
        let group = ctx.config.group(gid)?;
        let package = ctx
            .registry
            .for_ctype(&group.ctype, ctx.config.macro_package_for(&group.ctype).as_deref())?;

        let (cids, full_group) = match subset.filter(|s| !s.is_empty()) {
            None => (group.cid_list.clone(), true),
            Some(requested) => {
                let requested: Vec<String> =
                    requested.iter().map(|c| c.trim().to_ascii_lowercase()).collect();
                for cid in &requested {
                    if !group.cid_list.contains(cid) {
                        return Err(RapumaError::InvalidComponentId {
                            cid: cid.clone(),
                            reason: format!("not a component of group '{gid}'"),
                        }
                        .into());
                    }
                }
                let ordered: Vec<String> =
                    group.cid_list.iter().filter(|c| requested.contains(c)).cloned().collect();
                let full = ordered.len() == group.cid_list.len();
                (ordered, full)
            }
        };

        Ok(Self {
            gid: gid.to_string(),
            group,
            cids,
            full_group,
            package,
        })
    }

    #[must_use]
    pub fn ctype(&self) -> &str {
        &self.group.ctype
    }

    #[must_use]
    pub fn mac_pack(&self) -> &str {
        self.package.name()
    }
}

/// A producer of one artifact kind.
pub trait ArtifactGenerator {
    fn kind(&self) -> ArtifactKind;

    /// Files produced for this request. Empty when the feature is switched off.
    fn targets(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf>;

    /// Files the targets are built from.
    fn dependencies(&self, ctx: &ProjectContext, req: &BuildRequest) -> Vec<PathBuf>;

    /// Whether any target must be (re)built.
    fn needs_generation(&self, ctx: &ProjectContext, req: &BuildRequest) -> bool {
        let deps = self.dependencies(ctx, req);
        self.targets(ctx, req).iter().any(|t| is_stale(t, &deps))
    }

    /// Write the targets.
    fn generate(&self, ctx: &ProjectContext, req: &BuildRequest) -> Result<()>;
}

/// The generator for a kind, or `None` for kinds produced elsewhere
/// (control file, PDF, background).
#[must_use]
pub fn generator_for(kind: ArtifactKind) -> Option<Box<dyn ArtifactGenerator>> {
    use ArtifactKind as K;
    match kind {
        K::MacroLink => Some(Box::new(maclink::MacroLinkGenerator)),
        K::Settings => Some(Box::new(settings::SettingsGenerator)),
        K::Extension
        | K::DefaultStyleExtension
        | K::GroupTexExtension
        | K::GroupStyleExtension
        | K::ComponentTexExtension
        | K::ComponentStyleExtension => Some(Box::new(extension::PlaceholderGenerator::new(kind))),
        K::DefaultStyle => Some(Box::new(style::DefaultStyleGenerator)),
        K::HyphenationExceptions => Some(Box::new(hyphenation::HyphenationGenerator)),
        K::Lccode => Some(Box::new(hyphenation::LccodeGenerator)),
        K::Control | K::Pdf | K::Background => None,
    }
}

/// Header for a generated file. No timestamp, so output is reproducible.
#[must_use]
pub fn file_header(path: &Path, description: &str, editable: bool) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let comment = if path.extension().is_some_and(|e| e == "sty") { "#" } else { "%" };
    let note = if editable {
        "Edit this file to customise the project"
    } else {
        "This file is auto-generated, do not bother editing it"
    };
    format!("{comment} {name}\n{comment} {description}\n{comment} {note}\n\n")
}

/// Display form of a path as written into TeX files.
#[must_use]
pub fn tex_path(path: &Path) -> String {
    path.display().to_string()
}

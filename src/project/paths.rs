//! Every folder and file name of a project on disk.
//!
//! ```text
//! <home>/
//!   Config/        project.toml layout.toml font.toml illustration.toml <macPack>.toml
//!   Components/    <gid>/ (control file, PDFs)   <cid>/ (working text, backups, piclist)
//!   Macros/        <macPack>/ (copied macro package)
//!   Tex/           macLink, settings, extension and hyphenation TeX files
//!   Styles/        default and extension stylesheets
//!   Hyphenation/   processed word lists
//!   Illustrations/ background composite
//!   Deliverable/   bound output
//! ```

use crate::constants::{
    BACKGROUND_PDF, BASE_HANDLE, COMPONENTS_FOLDER, CONFIG_FOLDER, CV1_SUFFIX, DELIVERABLE_FOLDER,
    FONT_CONF, FONTS_FOLDER, HYPHENATION_FOLDER, ILLUSTRATION_CONF, ILLUSTRATIONS_FOLDER,
    LAYOUT_CONF, MACROS_FOLDER, PROJECT_CONF, SOURCE_SUFFIX, STYLES_FOLDER, TEX_FOLDER,
    VIEW_SUFFIX,
};
use crate::project::ids::canonical_number;
use std::path::{Path, PathBuf};

/// Which half of a component override pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    home: PathBuf,
}

impl ProjectPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
        }
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    // Config

    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.home.join(CONFIG_FOLDER)
    }

    #[must_use]
    pub fn project_conf(&self) -> PathBuf {
        self.config_dir().join(PROJECT_CONF)
    }

    #[must_use]
    pub fn layout_conf(&self) -> PathBuf {
        self.config_dir().join(LAYOUT_CONF)
    }

    #[must_use]
    pub fn font_conf(&self) -> PathBuf {
        self.config_dir().join(FONT_CONF)
    }

    #[must_use]
    pub fn illustration_conf(&self) -> PathBuf {
        self.config_dir().join(ILLUSTRATION_CONF)
    }

    /// Settings map of a macro package, `Config/<macPack>.toml`.
    #[must_use]
    pub fn macpack_conf(&self, mac_pack: &str) -> PathBuf {
        self.config_dir().join(format!("{mac_pack}.toml"))
    }

    // Components

    #[must_use]
    pub fn components_dir(&self) -> PathBuf {
        self.home.join(COMPONENTS_FOLDER)
    }

    #[must_use]
    pub fn group_dir(&self, gid: &str) -> PathBuf {
        self.components_dir().join(gid)
    }

    #[must_use]
    pub fn component_dir(&self, cid: &str) -> PathBuf {
        self.components_dir().join(cid)
    }

    /// The control file handed to the renderer.
    #[must_use]
    pub fn control_file(&self, gid: &str) -> PathBuf {
        self.group_dir(gid).join(format!("{gid}.tex"))
    }

    #[must_use]
    pub fn group_pdf(&self, gid: &str) -> PathBuf {
        self.group_dir(gid).join(format!("{gid}.pdf"))
    }

    /// Output of a subset render: `<nnn>-<cid>-<cid>-<gid>.pdf`, where `nnn`
    /// is the canonical number of the first cid.
    #[must_use]
    pub fn subset_pdf<S: AsRef<str>>(&self, gid: &str, cids: &[S]) -> PathBuf {
        let number = cids.first().and_then(|cid| canonical_number(cid.as_ref())).unwrap_or(0);
        let joined = cids.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("-");
        self.group_dir(gid).join(format!("{number:03}-{joined}-{gid}.pdf"))
    }

    /// `<stem>-view.pdf` beside a rendered PDF.
    #[must_use]
    pub fn view_pdf(pdf: &Path) -> PathBuf {
        let stem = pdf.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        pdf.with_file_name(format!("{stem}{VIEW_SUFFIX}.pdf"))
    }

    #[must_use]
    pub fn working_text(&self, cid: &str, ctype: &str) -> PathBuf {
        self.component_dir(cid).join(format!("{cid}{BASE_HANDLE}.{ctype}"))
    }

    /// Read-only copy of the imported source.
    #[must_use]
    pub fn source_copy(&self, cid: &str, ctype: &str) -> PathBuf {
        self.component_dir(cid).join(format!("{cid}{BASE_HANDLE}.{ctype}.{SOURCE_SUFFIX}"))
    }

    #[must_use]
    pub fn adjustment_file(&self, cid: &str) -> PathBuf {
        self.component_dir(cid).join(format!("{cid}.adj"))
    }

    #[must_use]
    pub fn piclist_file(&self, cid: &str) -> PathBuf {
        self.component_dir(cid).join(format!("{cid}.piclist"))
    }

    #[must_use]
    pub fn cv1_file(&self, cid: &str, ctype: &str) -> PathBuf {
        self.component_dir(cid).join(format!("{cid}.{ctype}.{CV1_SUFFIX}"))
    }

    // Macros

    #[must_use]
    pub fn macros_dir(&self) -> PathBuf {
        self.home.join(MACROS_FOLDER)
    }

    #[must_use]
    pub fn macpack_dir(&self, mac_pack: &str) -> PathBuf {
        self.macros_dir().join(mac_pack)
    }

    // Tex

    #[must_use]
    pub fn tex_dir(&self) -> PathBuf {
        self.home.join(TEX_FOLDER)
    }

    #[must_use]
    pub fn maclink_file(&self, ctype: &str) -> PathBuf {
        self.tex_dir().join(format!("{ctype}_macLink.tex"))
    }

    #[must_use]
    pub fn settings_file(&self, ctype: &str) -> PathBuf {
        self.tex_dir().join(format!("{ctype}_set.tex"))
    }

    #[must_use]
    pub fn extension_file(&self, ctype: &str) -> PathBuf {
        self.tex_dir().join(format!("{ctype}-ext.tex"))
    }

    #[must_use]
    pub fn group_tex_ext(&self, gid: &str) -> PathBuf {
        self.tex_dir().join(format!("{gid}-ext.tex"))
    }

    #[must_use]
    pub fn component_tex_ext(&self, gid: &str, cid: &str, switch: Switch) -> PathBuf {
        self.tex_dir().join(format!("{gid}-{cid}-{}-ext.tex", switch.label()))
    }

    #[must_use]
    pub fn hyphenation_tex(&self, gid: &str) -> PathBuf {
        self.tex_dir().join(format!("{gid}_hyphenation.tex"))
    }

    #[must_use]
    pub fn lccode_file(&self, ctype: &str) -> PathBuf {
        self.tex_dir().join(format!("{ctype}_lccode.tex"))
    }

    // Styles

    #[must_use]
    pub fn styles_dir(&self) -> PathBuf {
        self.home.join(STYLES_FOLDER)
    }

    #[must_use]
    pub fn default_style(&self, ctype: &str) -> PathBuf {
        self.styles_dir().join(format!("{ctype}.sty"))
    }

    #[must_use]
    pub fn default_style_ext(&self, ctype: &str) -> PathBuf {
        self.styles_dir().join(format!("{ctype}-ext.sty"))
    }

    #[must_use]
    pub fn group_style_ext(&self, gid: &str) -> PathBuf {
        self.styles_dir().join(format!("{gid}-ext.sty"))
    }

    #[must_use]
    pub fn component_style_ext(&self, gid: &str, cid: &str, switch: Switch) -> PathBuf {
        self.styles_dir().join(format!("{gid}-{cid}-{}-ext.sty", switch.label()))
    }

    // Everything else

    #[must_use]
    pub fn hyphenation_dir(&self) -> PathBuf {
        self.home.join(HYPHENATION_FOLDER)
    }

    /// Processed hyphenation word list for a component type.
    #[must_use]
    pub fn word_list(&self, ctype: &str) -> PathBuf {
        self.hyphenation_dir().join(format!("{ctype}_hyphenation.txt"))
    }

    #[must_use]
    pub fn illustrations_dir(&self) -> PathBuf {
        self.home.join(ILLUSTRATIONS_FOLDER)
    }

    #[must_use]
    pub fn background_pdf(&self) -> PathBuf {
        self.illustrations_dir().join(BACKGROUND_PDF)
    }

    #[must_use]
    pub fn deliverable_dir(&self) -> PathBuf {
        self.home.join(DELIVERABLE_FOLDER)
    }

    #[must_use]
    pub fn fonts_dir(&self) -> PathBuf {
        self.home.join(FONTS_FOLDER)
    }

    /// Top-level folders created by project initialisation.
    #[must_use]
    pub fn skeleton(&self) -> Vec<PathBuf> {
        vec![
            self.config_dir(),
            self.components_dir(),
            self.macros_dir(),
            self.tex_dir(),
            self.styles_dir(),
            self.hyphenation_dir(),
            self.illustrations_dir(),
            self.deliverable_dir(),
            self.fonts_dir(),
        ]
    }

    /// Colon-joined renderer search path for a group render.
    #[must_use]
    pub fn texinputs(&self, mac_pack: &str, gid: &str) -> String {
        [
            self.home.clone(),
            self.styles_dir(),
            self.tex_dir(),
            self.macpack_dir(mac_pack),
            self.macros_dir(),
            self.group_dir(gid),
            PathBuf::from("."),
        ]
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(":")
    }
}

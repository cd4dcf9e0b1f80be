//! The set of configuration stores that make up one project.
//!
//! | store                | file                        | holds                                        |
//! |----------------------|-----------------------------|----------------------------------------------|
//! | `project`            | `Config/project.toml`       | `ProjectInfo`, `Groups`, `CompTypes`, `Hyphenation`, `Backgrounds` |
//! | `layout`             | `Config/layout.toml`        | layout sections consumed by the settings file |
//! | `font`               | `Config/font.toml`          | `FontSettings`, `Fonts`                       |
//! | `illustration`       | `Config/illustration.toml`  | figure records per group                      |
//!
//! [`GroupEntry`] is a typed snapshot of one `[Groups.<gid>]` table. Writes go
//! through the store directly so unknown keys and comments are preserved.

use crate::config::store::ConfigStore;
use crate::core::RapumaError;
use crate::project::ProjectPaths;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use toml_edit::{Array, Item, Table, value};

pub const PROJECT_INFO: &str = "ProjectInfo";
pub const GROUPS: &str = "Groups";
pub const COMP_TYPES: &str = "CompTypes";
pub const HYPHENATION: &str = "Hyphenation";
pub const BACKGROUNDS: &str = "Backgrounds";

/// Group entry keys.
pub mod keys {
    pub const CTYPE: &str = "cType";
    pub const CID_LIST: &str = "cidList";
    pub const CSID: &str = "csid";
    pub const SOURCE_PATH: &str = "sourcePath";
    pub const IS_LOCKED: &str = "isLocked";
    pub const INSTALLING: &str = "installing";
    pub const USE_HYPHENATION: &str = "useHyphenation";
    pub const USE_ILLUSTRATIONS: &str = "useIllustrations";
    pub const USE_MANUAL_ADJUSTMENTS: &str = "useManualAdjustments";
    pub const VALIDATE_SOURCE_MARKUP: &str = "validateSourceMarkup";
    pub const USE_PREPROCESS_SCRIPT: &str = "usePreprocessScript";
    pub const PREPROCESS_SCRIPT: &str = "preprocessScript";
    pub const USE_GRP_TEX_OVERRIDE: &str = "useGrpTexOverride";
    pub const USE_GRP_STY_OVERRIDE: &str = "useGrpStyOverride";
    pub const COMP_TEX_OVERRIDE_LIST: &str = "compTexOverrideList";
    pub const COMP_STY_OVERRIDE_LIST: &str = "compStyOverrideList";
    pub const START_PAGE_NUMBER: &str = "startPageNumber";
    pub const BINDING_ORDER: &str = "bindingOrder";
}

/// All stores of one project, loaded once per operation.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub project: ConfigStore,
    pub layout: ConfigStore,
    pub font: ConfigStore,
    pub illustration: ConfigStore,
}

impl ProjectConfig {
    pub fn load(paths: &ProjectPaths) -> Result<Self> {
        Ok(Self {
            project: ConfigStore::load(paths.project_conf())?,
            layout: ConfigStore::load(paths.layout_conf())?,
            font: ConfigStore::load(paths.font_conf())?,
            illustration: ConfigStore::load(paths.illustration_conf())?,
        })
    }

    /// Project id from `ProjectInfo.projectID`, else the project folder name.
    #[must_use]
    pub fn project_id(&self, paths: &ProjectPaths) -> String {
        self.project.get_str(&[PROJECT_INFO], "projectID").unwrap_or_else(|| {
            paths
                .home()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        })
    }

    /// Configured group ids in document order.
    #[must_use]
    pub fn group_ids(&self) -> Vec<String> {
        self.project.keys(&[GROUPS])
    }

    #[must_use]
    pub fn has_group(&self, gid: &str) -> bool {
        self.project.has_section(&[GROUPS, gid])
    }

    /// Typed snapshot of a group entry.
    pub fn group(&self, gid: &str) -> Result<GroupEntry> {
        if !self.has_group(gid) {
            return Err(RapumaError::GroupNotFound {
                gid: gid.to_string(),
            }
            .into());
        }
        Ok(GroupEntry::read(&self.project, gid))
    }

    /// Groups other than `except` whose component list contains `cid`.
    #[must_use]
    pub fn groups_sharing(&self, cid: &str, except: &str) -> Vec<String> {
        self.group_ids()
            .into_iter()
            .filter(|gid| gid != except)
            .filter(|gid| {
                self.project.get_list_or_empty(&[GROUPS, gid.as_str()], keys::CID_LIST).iter().any(|c| c == cid)
            })
            .collect()
    }

    /// Macro package configured for a component type, if any.
    #[must_use]
    pub fn macro_package_for(&self, ctype: &str) -> Option<String> {
        self.project.get_str(&[COMP_TYPES, ctype], "macroPackage")
    }
}

/// Typed view of `[Groups.<gid>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntry {
    pub gid: String,
    pub ctype: String,
    pub cid_list: Vec<String>,
    pub csid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    pub is_locked: bool,
    pub installing: bool,
    pub use_hyphenation: bool,
    pub use_illustrations: bool,
    pub use_manual_adjustments: bool,
    pub validate_source_markup: bool,
    pub use_preprocess_script: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocess_script: Option<String>,
    pub use_grp_tex_override: bool,
    pub use_grp_sty_override: bool,
    pub comp_tex_override_list: Vec<String>,
    pub comp_sty_override_list: Vec<String>,
    pub start_page_number: i64,
    pub binding_order: i64,
}

impl GroupEntry {
    fn read(store: &ConfigStore, gid: &str) -> Self {
        let s = [GROUPS, gid];
        Self {
            gid: gid.to_string(),
            ctype: store.get_str_or(&s, keys::CTYPE, ""),
            cid_list: store.get_list_or_empty(&s, keys::CID_LIST),
            csid: store.get_str_or(&s, keys::CSID, ""),
            source_path: store.get_str(&s, keys::SOURCE_PATH).filter(|p| !p.is_empty()).map(PathBuf::from),
            is_locked: store.get_bool_or(&s, keys::IS_LOCKED, false),
            installing: store.get_bool_or(&s, keys::INSTALLING, false),
            use_hyphenation: store.get_bool_or(&s, keys::USE_HYPHENATION, false),
            use_illustrations: store.get_bool_or(&s, keys::USE_ILLUSTRATIONS, false),
            use_manual_adjustments: store.get_bool_or(&s, keys::USE_MANUAL_ADJUSTMENTS, false),
            validate_source_markup: store.get_bool_or(&s, keys::VALIDATE_SOURCE_MARKUP, true),
            use_preprocess_script: store.get_bool_or(&s, keys::USE_PREPROCESS_SCRIPT, false),
            preprocess_script: store.get_str(&s, keys::PREPROCESS_SCRIPT).filter(|p| !p.is_empty()),
            use_grp_tex_override: store.get_bool_or(&s, keys::USE_GRP_TEX_OVERRIDE, false),
            use_grp_sty_override: store.get_bool_or(&s, keys::USE_GRP_STY_OVERRIDE, true),
            comp_tex_override_list: store.get_list_or_empty(&s, keys::COMP_TEX_OVERRIDE_LIST),
            comp_sty_override_list: store.get_list_or_empty(&s, keys::COMP_STY_OVERRIDE_LIST),
            start_page_number: store.get_int_or(&s, keys::START_PAGE_NUMBER, 1),
            binding_order: store.get_int_or(&s, keys::BINDING_ORDER, 0),
        }
    }
}

/// Default values merged into every new group entry.
#[must_use]
pub fn group_defaults() -> Table {
    let mut t = Table::new();
    t.insert(keys::CTYPE, value(""));
    t.insert(keys::CID_LIST, Item::Value(Array::new().into()));
    t.insert(keys::CSID, value(""));
    t.insert(keys::IS_LOCKED, value(false));
    t.insert(keys::USE_HYPHENATION, value(false));
    t.insert(keys::USE_ILLUSTRATIONS, value(false));
    t.insert(keys::USE_MANUAL_ADJUSTMENTS, value(false));
    t.insert(keys::VALIDATE_SOURCE_MARKUP, value(true));
    t.insert(keys::USE_PREPROCESS_SCRIPT, value(false));
    t.insert(keys::PREPROCESS_SCRIPT, value(""));
    t.insert(keys::USE_GRP_TEX_OVERRIDE, value(false));
    t.insert(keys::USE_GRP_STY_OVERRIDE, value(true));
    t.insert(keys::COMP_TEX_OVERRIDE_LIST, Item::Value(Array::new().into()));
    t.insert(keys::COMP_STY_OVERRIDE_LIST, Item::Value(Array::new().into()));
    t.insert(keys::START_PAGE_NUMBER, value(1_i64));
    t.insert(keys::BINDING_ORDER, value(0_i64));
    t
}

//! Macro package registry.
//!
//! A component type is typeset by a macro package. Packages are registered
//! up front under their name; a group resolves its package from
//! `CompTypes.<cType>.macroPackage`, falling back to the type's default.

use crate::core::RapumaError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Built-in settings map for `usfmTex`.
pub const USFM_TEX_SETTINGS_MAP: &str = include_str!("../../resources/usfmTex.toml");

/// What Rapuma needs to know about a macro package.
pub trait MacroPackage: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Entry file `\input` by the macro-link file.
    fn entry_file(&self) -> &str;

    /// Optional marginal verses extension, linked when the layout asks for it.
    fn marginal_verses_file(&self) -> Option<&str>;

    /// Stylesheet shipped with the package, copied to `Styles/<cType>.sty`.
    fn default_style_file(&self) -> &str;

    /// Settings map used when the project has no `Config/<name>.toml`.
    fn builtin_settings_map(&self) -> &str;

    /// Directive that includes one component's working text.
    fn content_directive(&self, path: &str) -> String {
        format!("\\ptxfile{{{path}}}")
    }

    fn stylesheet_directive(&self, path: &str) -> String {
        format!("\\stylesheet{{{path}}}")
    }

    fn input_directive(&self, path: &str) -> String {
        format!("\\input \"{path}\"")
    }
}

/// The `usfmTex` family (`usfmTex`, `usfmTex-auto`).
#[derive(Debug, Clone)]
pub struct UsfmTex {
    name: String,
}

impl UsfmTex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }
}

impl MacroPackage for UsfmTex {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_file(&self) -> &str {
        "paratext2.tex"
    }

    fn marginal_verses_file(&self) -> Option<&str> {
        Some("ptxplus-marginalverses.tex")
    }

    fn default_style_file(&self) -> &str {
        "usfm.sty"
    }

    fn builtin_settings_map(&self) -> &str {
        USFM_TEX_SETTINGS_MAP
    }
}

#[derive(Debug, Clone)]
pub struct MacroRegistry {
    packages: HashMap<String, Arc<dyn MacroPackage>>,
    ctype_defaults: HashMap<String, String>,
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MacroRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            packages: HashMap::new(),
            ctype_defaults: HashMap::new(),
        }
    }

    /// Registry with every package Rapuma ships.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(UsfmTex::new("usfmTex")));
        registry.register(Arc::new(UsfmTex::new("usfmTex-auto")));
        registry.set_default("usfm", "usfmTex");
        registry
    }

    pub fn register(&mut self, package: Arc<dyn MacroPackage>) {
        self.packages.insert(package.name().to_string(), package);
    }

    pub fn set_default(&mut self, ctype: impl Into<String>, package: impl Into<String>) {
        self.ctype_defaults.insert(ctype.into(), package.into());
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn MacroPackage>, RapumaError> {
        self.packages.get(name).cloned().ok_or_else(|| RapumaError::UnknownMacroPackage {
            name: name.to_string(),
        })
    }

    /// Resolve the package for a component type. `configured` wins over the
    /// type default.
    pub fn for_ctype(
        &self,
        ctype: &str,
        configured: Option<&str>,
    ) -> Result<Arc<dyn MacroPackage>, RapumaError> {
        match configured.filter(|name| !name.is_empty()) {
            Some(name) => self.get(name),
            None => {
                let name = self.ctype_defaults.get(ctype).ok_or_else(|| {
                    RapumaError::UnknownComponentType {
                        ctype: ctype.to_string(),
                    }
                })?;
                self.get(name)
            }
        }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.packages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

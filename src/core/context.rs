//! Per-operation project context.
//!
//! A [`ProjectContext`] is built once at the start of a command and passed by
//! reference to every component that needs project state. It owns the paths,
//! the loaded configuration stores, the system settings, the resource roots
//! and the macro package registry. Nothing is cached across operations.

use crate::config::{ProjectConfig, SystemSettings, expand_path};
use crate::constants::{ENV_BASE_ROOT, ENV_USER_ROOT};
use crate::core::RapumaError;
use crate::project::ProjectPaths;
use crate::render::registry::MacroRegistry;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Installation-wide and per-user resource trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRoots {
    /// `RAPUMA_BASE`: holds `resource/macros/<macPack>` and `resource/illustrations`.
    pub base: Option<PathBuf>,
    /// `RAPUMA_USER`: holds `resources/macros` with user overrides.
    pub user: Option<PathBuf>,
    /// `userResources` from the system settings, preferred over `user`.
    pub user_resources: Option<PathBuf>,
}

impl ResourceRoots {
    /// Read the roots from the environment.
    #[must_use]
    pub fn from_env(settings: &SystemSettings) -> Self {
        let root = |var: &str| {
            std::env::var(var).ok().filter(|v| !v.is_empty()).map(|v| expand_path(Path::new(&v)))
        };
        Self {
            base: root(ENV_BASE_ROOT),
            user: root(ENV_USER_ROOT),
            user_resources: settings.user_resources.clone(),
        }
    }

    /// The packaged copy of a macro package.
    #[must_use]
    pub fn packaged_macros(&self, mac_pack: &str) -> Option<PathBuf> {
        self.base.as_ref().map(|b| b.join("resource").join("macros").join(mac_pack))
    }

    /// The folder holding the user's own macro files.
    #[must_use]
    pub fn user_macros(&self) -> Option<PathBuf> {
        self.user_resources
            .as_ref()
            .map(|r| r.join("macros"))
            .or_else(|| self.user.as_ref().map(|u| u.join("resources").join("macros")))
    }
}

#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub paths: ProjectPaths,
    pub config: ProjectConfig,
    pub settings: SystemSettings,
    pub resources: ResourceRoots,
    pub registry: MacroRegistry,
}

impl ProjectContext {
    /// Open the project at `home`, reading settings and roots from the environment.
    pub fn open(home: impl Into<PathBuf>) -> Result<Self> {
        let settings = SystemSettings::load()?;
        let resources = ResourceRoots::from_env(&settings);
        Self::open_with(home, settings, resources)
    }

    /// Open the project with explicit settings and resource roots.
    pub fn open_with(
        home: impl Into<PathBuf>,
        settings: SystemSettings,
        resources: ResourceRoots,
    ) -> Result<Self> {
        let paths = ProjectPaths::new(home);
        if !paths.project_conf().is_file() {
            return Err(RapumaError::ProjectNotFound {
                path: paths.home().display().to_string(),
            }
            .into());
        }
        let config = ProjectConfig::load(&paths)?;
        Ok(Self {
            paths,
            config,
            settings,
            resources,
            registry: MacroRegistry::builtin(),
        })
    }

    /// Re-read every store from disk.
    pub fn reload(&mut self) -> Result<()> {
        self.config = ProjectConfig::load(&self.paths)?;
        Ok(())
    }
}

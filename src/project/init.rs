//! Project initialisation.

use crate::config::ConfigStore;
use crate::config::project::PROJECT_INFO;
use crate::core::RapumaError;
use crate::project::ProjectPaths;
use crate::utils::fs::{ensure_dir, safe_write};
use anyhow::Result;
use tracing::info;

const PROJECT_TEMPLATE: &str = r#"# Rapuma project configuration

[ProjectInfo]
projectID = ""
projectCreateDate = ""

# Groups are added with `rapuma group add`
[Groups]

[CompTypes.usfm]
macroPackage = "usfmTex"

[Hyphenation]
nonWordFormingChars = []

[Backgrounds]
layers = []
centerOnSheet = false
sheetSize = ""
useWatermark = false
watermarkText = "DRAFT"
useDocInfo = false
"#;

const LAYOUT_TEMPLATE: &str = r#"# Layout settings for the settings file.
# Values left out here are filled in from the macro package defaults.

[GeneralSettings]
measurementUnit = "mm"
"#;

const FONT_TEMPLATE: &str = r#"# Font settings

[FontSettings]
primaryFont = ""
useMapping = ""
useRenderingSystem = ""
useLanguage = ""

[Fonts]
"#;

/// Create the folder skeleton and starter configuration for a project.
///
/// An existing `project.toml` is only replaced with `force`. The other stores
/// are created when missing and never overwritten.
pub fn init_project(paths: &ProjectPaths, project_id: Option<&str>, force: bool) -> Result<()> {
    let project_conf = paths.project_conf();
    if project_conf.exists() && !force {
        return Err(RapumaError::Other {
            message: format!(
                "Project already initialised at {}. Use --force to overwrite",
                paths.home().display()
            ),
        }
        .into());
    }

    for dir in paths.skeleton() {
        ensure_dir(&dir)?;
    }

    let pid = match project_id {
        Some(pid) => pid.to_string(),
        None => paths
            .home()
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string()),
    };

    let mut doc = ConfigStore::parse(&project_conf, PROJECT_TEMPLATE)?;
    doc.set(&[PROJECT_INFO], "projectID", pid.as_str())?;
    doc.set(
        &[PROJECT_INFO],
        "projectCreateDate",
        chrono::Local::now().format("%Y-%m-%d").to_string(),
    )?;
    doc.save()?;

    for (path, template) in [(paths.layout_conf(), LAYOUT_TEMPLATE), (paths.font_conf(), FONT_TEMPLATE)] {
        if !path.exists() {
            safe_write(&path, template)?;
        }
    }

    info!("Initialised project '{}' at {}", pid, paths.home().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_skeleton() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        init_project(&paths, Some("MYPROJ"), false).unwrap();

        for dir in paths.skeleton() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
        let config = ProjectConfig::load(&paths).unwrap();
        assert_eq!(config.project_id(&paths), "MYPROJ");
        assert_eq!(config.macro_package_for("usfm").as_deref(), Some("usfmTex"));
        assert!(paths.layout_conf().is_file());
    }

    #[test]
    fn test_init_refuses_existing_without_force() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp.path());
        init_project(&paths, Some("A"), false).unwrap();
        std::fs::write(paths.layout_conf(), "[PageLayout]\npageWidth = 100\n").unwrap();

        assert!(init_project(&paths, Some("B"), false).is_err());
        init_project(&paths, Some("B"), true).unwrap();

        let config = ProjectConfig::load(&paths).unwrap();
        assert_eq!(config.project_id(&paths), "B");
        assert_eq!(config.layout.get_int(&["PageLayout"], "pageWidth"), Some(100));
    }
}

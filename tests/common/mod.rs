//! Shared helpers for the Rapuma integration tests.
//!
//! The renderer and PDF tools are replaced by small shell scripts that log
//! their command line and write a placeholder PDF wherever the real tool
//! would have written its output.

// Not every test file uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use rapuma_cli::config::SystemSettings;
use rapuma_cli::core::ProjectContext;
use rapuma_cli::lifecycle::{AddGroupOptions, GroupSummary, add_group};
use rapuma_cli::test_utils::ProjectFixture;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder written by every fake tool.
pub const FAKE_PDF: &str = "%PDF-1.4 fake\n";

const TOOL_SCRIPT: &str = r#"#!/bin/sh
echo "$(basename "$0") $*" >> "@LOG@"
out=""
dir=""
prev=""
last=""
for a in "$@"; do
  case "$a" in
    -output-directory=*) dir="${a#-output-directory=}" ;;
    -sOutputFile=*) out="${a#-sOutputFile=}" ;;
  esac
  case "$prev" in
    output|-o) out="$a" ;;
  esac
  prev="$a"
  last="$a"
done
if [ -n "$dir" ]; then
  out="$dir/$(basename "$last" .tex).pdf"
fi
if [ "@WRITE@" = "yes" ] && [ -n "$out" ]; then
  printf '%%PDF-1.4 fake\n' > "$out"
fi
exit @EXIT@
"#;

/// Fake external tools living in one folder, sharing one call log.
pub struct FakeTools {
    dir: PathBuf,
}

impl FakeTools {
    /// Install well-behaved fakes for the renderer, `pdftk`, `gs` and the
    /// SVG converter under `root/tools`.
    pub fn install(root: &Path) -> Result<Self> {
        let tools = Self {
            dir: root.join("tools"),
        };
        fs::create_dir_all(&tools.dir)?;
        for name in ["xetex", "pdftk", "gs", "rsvg-convert"] {
            tools.write_tool(name, 0, true)?;
        }
        Ok(tools)
    }

    /// Replace one tool with a fake that exits with `code` and only writes
    /// output when `writes` is set.
    pub fn write_tool(&self, name: &str, code: i32, writes: bool) -> Result<()> {
        let script = TOOL_SCRIPT
            .replace("@LOG@", &self.log_path().display().to_string())
            .replace("@WRITE@", if writes { "yes" } else { "no" })
            .replace("@EXIT@", &code.to_string());
        let path = self.path(name);
        fs::write(&path, script)?;
        make_executable(&path)
    }

    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.dir.join("calls.log")
    }

    /// Every logged call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Logged calls to `name`.
    #[must_use]
    pub fn calls_to(&self, name: &str) -> Vec<String> {
        let prefix = format!("{name} ");
        self.calls().into_iter().filter(|c| c.starts_with(&prefix)).collect()
    }

    pub fn clear_log(&self) {
        let _ = fs::remove_file(self.log_path());
    }

    /// System settings pointing at the fakes.
    #[must_use]
    pub fn settings(&self) -> SystemSettings {
        let show = |name: &str| self.path(name).display().to_string();
        SystemSettings {
            renderer: show("xetex"),
            pdf_utility: show("pdftk"),
            center_tool: show("gs"),
            merge_tool: show("gs"),
            svg_converter: vec![
                show("rsvg-convert"),
                "-f".to_string(),
                "pdf".to_string(),
                "-o".to_string(),
                "{out}".to_string(),
                "{in}".to_string(),
            ],
            ..SystemSettings::default()
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to make {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// A fixture project with fake tools installed beside it.
pub struct TestProject {
    pub fixture: ProjectFixture,
    pub tools: FakeTools,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let fixture = ProjectFixture::new()?;
        let root = fixture.home().parent().map(Path::to_path_buf).context("fixture home has no parent")?;
        let tools = FakeTools::install(&root)?;
        Ok(Self {
            fixture,
            tools,
        })
    }

    /// Context using the fake tools.
    pub fn context(&self) -> Result<ProjectContext> {
        self.fixture.context_with(self.tools.settings())
    }

    /// Add `gid` through the lifecycle manager, installing `cids` from the
    /// fixture's source folder.
    pub fn add_group(&self, gid: &str, cids: &[&str]) -> Result<GroupSummary> {
        let mut ctx = self.context()?;
        let options = AddGroupOptions {
            ctype: "usfm".to_string(),
            source_dir: self.fixture.source_dir(),
            cids: cids.iter().map(|c| (*c).to_string()).collect(),
            force: false,
        };
        add_group(&mut ctx, gid, &options)
    }

    /// Write `rapuma.toml` into the fake user root so the binary picks up
    /// the fake tools.
    pub fn write_user_settings(&self) -> Result<()> {
        let user = self.fixture.user();
        fs::create_dir_all(&user)?;
        fs::write(user.join("rapuma.toml"), toml::to_string(&self.tools.settings())?)?;
        Ok(())
    }

    /// The `rapuma` binary set up for this project.
    pub fn command(&self) -> Result<assert_cmd::Command> {
        self.write_user_settings()?;
        let mut cmd = assert_cmd::Command::cargo_bin("rapuma")?;
        cmd.env("RAPUMA_BASE", self.fixture.base())
            .env("RAPUMA_USER", self.fixture.user())
            .env_remove("RAPUMA_PROJECT")
            .env_remove("RUST_LOG")
            .arg("-p")
            .arg(self.fixture.home());
        Ok(cmd)
    }
}

/// Content lines (`\...`) of a generated TeX file.
#[must_use]
pub fn directive_lines(content: &str) -> Vec<String> {
    content.lines().filter(|l| l.starts_with('\\')).map(str::to_string).collect()
}

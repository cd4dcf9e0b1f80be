//! Running the renderer on a control file.

use crate::constants::render_exit_message;
use crate::core::{ProjectContext, RapumaError};
use crate::generators::BuildRequest;
use crate::render::command::ExternalCommand;
use crate::utils::fs::remove_file_forced;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Result of one renderer run.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Exit code, `None` when the renderer was killed.
    pub code: Option<i32>,
    pub message: String,
    pub output: PathBuf,
}

pub struct RenderInvoker {
    program: String,
}

impl RenderInvoker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn from_context(ctx: &ProjectContext) -> Self {
        Self::new(ctx.settings.renderer.clone())
    }

    /// `<renderer> -output-directory=<gid folder> <control file>` with
    /// `TEXINPUTS` pointing into the project.
    #[must_use]
    pub fn command(&self, ctx: &ProjectContext, req: &BuildRequest) -> ExternalCommand {
        let group_dir = ctx.paths.group_dir(&req.gid);
        ExternalCommand::new(self.program.clone())
            .arg(format!("-output-directory={}", group_dir.display()))
            .arg(ctx.paths.control_file(&req.gid).display().to_string())
            .env("TEXINPUTS", ctx.paths.texinputs(req.mac_pack(), &req.gid))
            .current_dir(&group_dir)
            .with_context(format!("render {}", req.gid))
    }

    /// Render `req` into `target`.
    ///
    /// The exit status is only logged. The call fails when the renderer
    /// leaves no output file behind.
    pub fn invoke(&self, ctx: &ProjectContext, req: &BuildRequest, target: &Path) -> Result<RenderOutcome> {
        let generic = ctx.paths.group_pdf(&req.gid);
        // A subset render writes through the group's output name; keep the
        // full group PDF aside meanwhile.
        let kept = if generic != target && generic.exists() {
            let kept = tempfile::Builder::new()
                .prefix(".rapuma-")
                .suffix(".pdf")
                .tempfile_in(ctx.paths.group_dir(&req.gid))
                .context("Failed to create a temporary file")?
                .into_temp_path();
            fs::rename(&generic, &kept)
                .with_context(|| format!("Failed to set {} aside", generic.display()))?;
            Some(kept)
        } else {
            if generic.exists() {
                remove_file_forced(&generic)?;
            }
            None
        };

        let result = self.run_renderer(ctx, req, &generic, target);
        if let Some(kept) = kept {
            kept.persist(&generic).with_context(|| format!("Failed to restore {}", generic.display()))?;
        }
        result
    }

    fn run_renderer(
        &self,
        ctx: &ProjectContext,
        req: &BuildRequest,
        generic: &Path,
        target: &Path,
    ) -> Result<RenderOutcome> {
        let output = self.command(ctx, req).run()?;
        let message = match output.code {
            Some(code) => render_exit_message(code)
                .map_or_else(|| format!("Exit code {code} not understood."), str::to_string),
            None => "Renderer was terminated by a signal.".to_string(),
        };
        if output.success() {
            info!(target: "render", "{}: {}", req.gid, message);
        } else {
            warn!(target: "render", "{}: {}", req.gid, message);
        }

        if !generic.is_file() {
            error!(target: "render", "No output was produced for {}", req.gid);
            return Err(RapumaError::RenderOutputMissing {
                path: generic.display().to_string(),
            }
            .into());
        }
        if generic != target {
            fs::rename(generic, target).with_context(|| {
                format!("Failed to rename {} to {}", generic.display(), target.display())
            })?;
        }

        Ok(RenderOutcome {
            code: output.code,
            message,
            output: target.to_path_buf(),
        })
    }
}

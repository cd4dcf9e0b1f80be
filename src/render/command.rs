//! Builder for external tool invocations.
//!
//! Every external process Rapuma starts (renderer, PDF stamping, centering,
//! SVG conversion, merging) goes through [`ExternalCommand`], so lookup,
//! logging and error mapping are uniform. Calls block until the process exits;
//! there is no timeout.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::core::RapumaError;

pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    capture_output: bool,
    env_vars: Vec<(String, String)>,
    context: Option<String>,
}

/// Outcome of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            env_vars: Vec::new(),
            context: None,
        }
    }

    /// Build from an argument vector whose first element is the program.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, rest) = argv.split_first().ok_or_else(|| RapumaError::ConfigError {
            file: "rapuma.toml".to_string(),
            reason: "empty command line".to_string(),
        })?;
        Ok(Self::new(program.clone()).args(rest.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone()).chain(self.args.iter().cloned()).collect()
    }

    /// Run to completion and report the exit status, whatever it is.
    pub fn run(self) -> Result<CommandOutput> {
        let resolved = which::which(&self.program).map_err(|_| RapumaError::ExternalToolNotFound {
            tool: self.program.clone(),
        })?;
        let ctx = self.context.as_deref().unwrap_or(&self.program);
        let line = self.argv().join(" ");
        tracing::debug!(target: "command", "({}) Executing: {}", ctx, line);

        let mut cmd = Command::new(&resolved);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            tracing::trace!(target: "command", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }
        if self.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let start = Instant::now();
        let output = cmd.output().with_context(|| format!("Failed to execute {line}"))?;
        let elapsed = start.elapsed();
        tracing::info!(
            target: "command::perf",
            "({}) {} finished in {:.2}s",
            ctx,
            self.program,
            elapsed.as_secs_f64()
        );

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.stdout.trim().is_empty() {
            tracing::debug!(target: "command", "({}) {}", ctx, result.stdout.trim());
        }
        if !result.stderr.trim().is_empty() {
            tracing::debug!(target: "command", "({}) {}", ctx, result.stderr.trim());
        }
        Ok(result)
    }

    /// Run and fail with [`RapumaError::ExternalCommandFailed`] on a non-zero exit.
    pub fn execute_success(self) -> Result<CommandOutput> {
        let line = self.argv().join(" ");
        let output = self.run()?;
        if !output.success() {
            tracing::debug!(target: "command", "Command failed with exit code: {:?}", output.code);
            return Err(RapumaError::ExternalCommandFailed {
                command: line,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }
        Ok(output)
    }
}

//! Command-line interface for Rapuma.
//!
//! ```text
//! rapuma [-v|-q] [-p <project home>] <command>
//!
//!   project init     create a project skeleton
//!   group ...        add, update, uninstall, restore, remove, lock, unlock, list
//!   render <gid>     build a group's artifacts and render it when stale
//!   bind             concatenate rendered groups by binding order
//! ```
//!
//! Each command builds one [`ProjectContext`](crate::core::ProjectContext)
//! and passes it down. Errors are returned to `main`, which prints them and
//! exits with status 1.

mod bind;
mod group;
mod project;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for the subscriber. `None` defers to `RUST_LOG`,
    /// then `info`.
    pub log_level: Option<String>,
    pub project_home: PathBuf,
}

impl CliConfig {
    /// Install the global tracing subscriber. Safe to call more than once.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init();
    }
}

#[derive(Parser)]
#[command(
    name = "rapuma",
    about = "Rapuma - typesetting project manager",
    version,
    long_about = "Rapuma manages groups of text components and turns them into typeset PDF output, \
                  regenerating only what is out of date."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Project home folder
    #[arg(short = 'p', long, global = true, default_value = ".", env = "RAPUMA_PROJECT")]
    project_home: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Project setup
    Project(project::ProjectCommand),
    /// Manage groups and their components
    Group(group::GroupCommand),
    /// Render a group, or some of its components
    Render(render::RenderCommand),
    /// Bind rendered groups into one PDF
    Bind(bind::BindCommand),
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(&config)
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };
        CliConfig {
            log_level,
            project_home: self.project_home.clone(),
        }
    }

    pub fn execute_with_config(self, config: &CliConfig) -> Result<()> {
        let home = &config.project_home;
        match self.command {
            Commands::Project(cmd) => cmd.execute(home),
            Commands::Group(cmd) => cmd.execute(home),
            Commands::Render(cmd) => cmd.execute(home),
            Commands::Bind(cmd) => cmd.execute(home),
        }
    }
}

/// Split `gen,exo mat` style lists.
pub(crate) fn split_cids(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split([',', ' ']))
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

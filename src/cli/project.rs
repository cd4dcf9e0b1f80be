use crate::project::{ProjectPaths, init_project};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Subcommand)]
enum ProjectSubcommand {
    /// Create the folder skeleton and starter configuration
    Init {
        /// Project id; defaults to the folder name
        #[arg(long)]
        id: Option<String>,

        /// Replace an existing project.toml
        #[arg(short, long)]
        force: bool,
    },
}

impl ProjectCommand {
    pub fn execute(self, home: &Path) -> Result<()> {
        match self.command {
            ProjectSubcommand::Init {
                id,
                force,
            } => {
                let paths = ProjectPaths::new(home);
                init_project(&paths, id.as_deref(), force)?;
                println!("{} Initialised project at {}", "✓".green(), home.display());
                Ok(())
            }
        }
    }
}

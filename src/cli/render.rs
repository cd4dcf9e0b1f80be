use crate::cli::split_cids;
use crate::core::ProjectContext;
use crate::render::{RenderOptions, render_group};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct RenderCommand {
    gid: String,

    /// Render only these components, comma separated
    #[arg(long, num_args = 1..)]
    cids: Vec<String>,

    /// Render even when the output is current
    #[arg(short, long)]
    force: bool,

    /// Rebuild the page background
    #[arg(long)]
    force_background: bool,
}

impl RenderCommand {
    pub fn execute(self, home: &Path) -> Result<()> {
        let ctx = ProjectContext::open(home)?;
        let options = RenderOptions {
            cids: split_cids(&self.cids),
            force: self.force,
            force_background: self.force_background,
        };
        let report = render_group(&ctx, &self.gid, &options)?;

        if !report.assembly.regenerated.is_empty() {
            let names: Vec<&str> = report.assembly.regenerated.iter().map(|k| k.id()).collect();
            println!("  regenerated: {}", names.join(", "));
        }
        match &report.outcome {
            Some(outcome) => println!("{} {} ({})", "✓".green(), report.target.display(), outcome.message),
            None => println!("{} {} is up to date", "✓".green(), report.target.display()),
        }
        if let Some(view) = &report.postprocess.view {
            println!("  view: {}", view.display());
        }
        Ok(())
    }
}

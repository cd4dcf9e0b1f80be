use crate::bind::bind;
use crate::core::ProjectContext;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct BindCommand {
    /// Keep a dated copy in the Deliverable folder
    #[arg(long)]
    save: bool,
}

impl BindCommand {
    pub fn execute(self, home: &Path) -> Result<()> {
        let ctx = ProjectContext::open(home)?;
        let report = bind(&ctx, self.save)?;
        println!("{} Bound {} into {}", "✓".green(), report.groups.join(", "), report.output.display());
        if let Some(view) = &report.view {
            println!("  view: {}", view.display());
        }
        if let Some(saved) = &report.saved {
            println!("  saved: {}", saved.display());
        }
        Ok(())
    }
}

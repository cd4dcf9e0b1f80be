use crate::cli::split_cids;
use crate::core::{ProjectContext, find_rapuma_error};
use crate::lifecycle::{
    AddGroupOptions, UpdateOutcome, add_group, list_groups, lock_group, remove_group, restore_component,
    uninstall_component, unlock_group, update_group,
};
use crate::render::command::ExternalCommand;
use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct GroupCommand {
    #[command(subcommand)]
    command: GroupSubcommand,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ListFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum GroupSubcommand {
    /// Create a group and install its components
    Add {
        gid: String,
        /// Component type
        #[arg(long = "ctype", default_value = "usfm")]
        ctype: String,
        /// Folder holding the component sources
        #[arg(long)]
        source: PathBuf,
        /// Component ids, comma separated
        #[arg(long, required = true, num_args = 1..)]
        cids: Vec<String>,
        /// Replace an existing group
        #[arg(short, long)]
        force: bool,
    },
    /// Reinstall components whose source has changed
    Update {
        gid: String,
        /// Only this component
        #[arg(long)]
        cid: Option<String>,
        /// Reinstall even when unchanged, and override the lock
        #[arg(short, long)]
        force: bool,
        /// Show the differences to the previous working text
        #[arg(long)]
        diff: bool,
    },
    /// Remove one component, keeping a backup of its text
    Uninstall {
        gid: String,
        cid: String,
        #[arg(short, long)]
        force: bool,
    },
    /// Put a component's backup back in place
    Restore {
        gid: String,
        cid: String,
        #[arg(short, long)]
        force: bool,
    },
    /// Uninstall every component and delete the group
    Remove {
        gid: String,
        #[arg(short, long)]
        force: bool,
    },
    /// Protect a group from changes
    Lock { gid: String },
    /// Allow changes to a group
    Unlock { gid: String },
    /// Show configured groups
    List {
        #[arg(long, value_enum, default_value_t)]
        format: ListFormat,
    },
}

impl GroupCommand {
    pub fn execute(self, home: &Path) -> Result<()> {
        let mut ctx = ProjectContext::open(home)?;
        match self.command {
            GroupSubcommand::Add {
                gid,
                ctype,
                source,
                cids,
                force,
            } => {
                let options = AddGroupOptions {
                    ctype,
                    source_dir: source,
                    cids: split_cids(&cids),
                    force,
                };
                let summary = add_group(&mut ctx, &gid, &options)?;
                println!("{} Added group {} ({})", "✓".green(), gid.bold(), summary.cids.join(", "));
            }
            GroupSubcommand::Update {
                gid,
                cid,
                force,
                diff,
            } => {
                let outcomes = update_group(&mut ctx, &gid, cid.as_deref(), force)?;
                for (cid, outcome) in outcomes {
                    match outcome {
                        UpdateOutcome::Unchanged => println!("  {} {} unchanged", "-".dimmed(), cid),
                        UpdateOutcome::Updated {
                            working,
                            backup,
                        } => {
                            println!("{} Updated {}", "✓".green(), cid);
                            if let (true, Some(backup)) = (diff, backup) {
                                show_diff(&ctx, &backup, &working)?;
                            }
                        }
                    }
                }
            }
            GroupSubcommand::Uninstall {
                gid,
                cid,
                force,
            } => match uninstall_component(&mut ctx, &gid, &cid, force) {
                Ok(()) => println!("{} Uninstalled {} from {}", "✓".green(), cid, gid),
                Err(err) => {
                    // Refusing a shared component is reported, not failed.
                    if let Some(shared) = find_rapuma_error(&err).filter(|e| e.is_shared_conflict()) {
                        eprintln!("{}: {}", "warning".yellow().bold(), shared);
                    } else {
                        return Err(err);
                    }
                }
            },
            GroupSubcommand::Restore {
                gid,
                cid,
                force,
            } => {
                restore_component(&mut ctx, &gid, &cid, force)?;
                println!("{} Restored {} from its backup", "✓".green(), cid);
            }
            GroupSubcommand::Remove {
                gid,
                force,
            } => {
                let outcome = remove_group(&mut ctx, &gid, force)?;
                if outcome.removed {
                    println!("{} Removed group {}", "✓".green(), gid);
                } else {
                    eprintln!(
                        "{}: group {} kept for shared component(s) {}",
                        "warning".yellow().bold(),
                        gid,
                        outcome.kept.join(", ")
                    );
                }
            }
            GroupSubcommand::Lock {
                gid,
            } => {
                lock_group(&mut ctx, &gid)?;
                println!("{} {} is locked", "✓".green(), gid);
            }
            GroupSubcommand::Unlock {
                gid,
            } => {
                unlock_group(&mut ctx, &gid)?;
                println!("{} {} is unlocked", "✓".green(), gid);
            }
            GroupSubcommand::List {
                format,
            } => {
                let groups = list_groups(&ctx)?;
                match format {
                    ListFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
                    ListFormat::Text if groups.is_empty() => println!("No groups configured"),
                    ListFormat::Text => {
                        for group in groups {
                            println!(
                                "{:<10} {:<8} {:<10} {}",
                                group.gid.bold(),
                                group.ctype,
                                group.state.to_string(),
                                group.cids.join(" ")
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Run the configured diff viewer, or print both paths when there is none.
fn show_diff(ctx: &ProjectContext, old: &Path, new: &Path) -> Result<()> {
    if ctx.settings.diff_command.is_empty() {
        println!("  previous: {}\n  current:  {}", old.display(), new.display());
        return Ok(());
    }
    ExternalCommand::from_argv(&ctx.settings.diff_command)?
        .arg(old.display().to_string())
        .arg(new.display().to_string())
        .inherit_stdio()
        .with_context("diff")
        .run()?;
    Ok(())
}

//! Rapuma CLI entry point
//!
//! Parses arguments, runs the command and prints failures with a suggestion
//! before exiting with status 1.

use anyhow::Result;
use clap::Parser;
use rapuma_cli::cli;
use rapuma_cli::core::error::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}

//! File system utilities
//!
//! Atomic writes, directory helpers and metadata queries used by the
//! configuration store, the artifact generators and the lifecycle manager.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rapuma_cli::utils::fs::{ensure_dir, safe_write, calculate_checksum};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("project/Tex"))?;
//! safe_write(Path::new("project/Tex/usfm-ext.tex"), "% user macros\n")?;
//! let checksum = calculate_checksum(Path::new("project/Tex/usfm-ext.tex"))?;
//! println!("{checksum}");
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod metadata;

pub use atomic::{atomic_write, safe_write, write_if_changed};
pub use dirs::{copy_missing_files, ensure_dir, ensure_parent_dir, remove_dir_all};
pub use metadata::{
    calculate_checksum, copy_read_only, files_identical, modified_time, remove_file_forced, set_read_only,
};

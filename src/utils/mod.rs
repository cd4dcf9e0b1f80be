//! Cross-cutting utilities.

pub mod fs;

pub use fs::{ensure_dir, safe_write};

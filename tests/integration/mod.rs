//! Integration test suite for Rapuma
//!
//! End-to-end tests driving the library and the `rapuma` binary against
//! temporary projects. External tools are replaced by logging shell scripts
//! (see `common`), so the tests that render are Unix only.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **scenario**: control file contents across component list changes
//! - **staleness**: idempotent renders and targeted regeneration
//! - **lifecycle**: locking, backups and shared components
//! - **postprocess**: background, centering and view copies
//! - **bind**: binding rendered groups
//! - **cli**: the command line surface

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod bind;
mod cli;
mod lifecycle;
mod postprocess;
mod scenario;
mod staleness;

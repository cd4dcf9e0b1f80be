//! Test utilities for Rapuma
//!
//! Helpers shared by unit tests and the integration suite: logging setup and
//! on-disk project fixtures.
//!
//! # Example
//!
//! ```rust,no_run
//! use rapuma_cli::test_utils::{ProjectFixture, init_test_logging};
//!
//! # fn example() -> anyhow::Result<()> {
//! init_test_logging(None);
//! let fixture = ProjectFixture::new()?;
//! fixture.add_group_config("g1", &["gen", "exo"])?;
//! let ctx = fixture.context()?;
//! assert!(ctx.config.has_group("g1"));
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::{ProjectFixture, backdate_tree, set_mtime, usfm_text};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, else `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=rapuma_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

//! Configuration for Rapuma projects.
//!
//! Two layers:
//!
//! - **Project stores** (`Config/*.toml` under the project home), edited by
//!   Rapuma and by hand. Wrapped by [`ConfigStore`] so formatting and comments
//!   survive writes; grouped per project in [`ProjectConfig`].
//! - **System settings** (`rapuma.toml` in the user root), describing the
//!   machine: external tools and resource locations. Deserialised with serde
//!   into [`SystemSettings`].

pub mod project;
pub mod settings;
pub mod store;

pub use project::{GroupEntry, ProjectConfig, group_defaults};
pub use settings::{SystemSettings, expand_path};
pub use store::{ConfigStore, parse_flag};

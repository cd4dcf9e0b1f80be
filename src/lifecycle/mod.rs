//! Group and component lifecycle.
//!
//! A group moves through `Absent -> Installing -> Locked`, and between
//! `Locked` and `Unlocked` on request. Every operation that changes installed
//! texts checks the lock first and refuses a locked group unless forced,
//! before touching the file system. A forced operation leaves the group
//! locked again when it succeeds.
//!
//! Working texts are never destroyed without a `cv1` backup being taken
//! first, and components listed by more than one group are never
//! uninstalled.
//!
//! - [`group`]: add, update, remove, list
//! - [`component`]: install, update, uninstall, restore
//! - [`lock`]: [`GroupState`] and the lock rules
//! - [`backup`]: `cv1` snapshots
//! - [`sources`]: finding a component's source file
//! - [`figures`]: `\fig` extraction, piclists and endnote removal
//! - [`validate`]: the markup check run after install

pub mod backup;
pub mod component;
pub mod figures;
pub mod group;
pub mod lock;
pub mod sources;
pub mod validate;

pub use backup::ComponentBackup;
pub use component::{UpdateOutcome, install_component, restore_component, uninstall_component, update_component};
pub use group::{AddGroupOptions, GroupSummary, RemoveOutcome, add_group, list_groups, remove_group, update_group};
pub use lock::{GroupState, lock_group, unlock_group, with_unlocked};

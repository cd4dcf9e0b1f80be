//! Core types for Rapuma
//!
//! ## Error Management
//! - [`RapumaError`]: every failure mode, grouped into fatal, optional,
//!   external-process and shared-resource categories
//! - [`ErrorContext`] and [`user_friendly_error`]: the user-facing form
//!   printed by the binary
//!
//! ## Operation Context
//! [`ProjectContext`] is constructed once per command and handed to every
//! component by reference. It replaces any notion of global, lazily created
//! managers: two commands never share state except through the filesystem.

pub mod context;
pub mod error;

pub use context::{ProjectContext, ResourceRoots};
pub use error::{ErrorContext, RapumaError, find_rapuma_error, user_friendly_error};

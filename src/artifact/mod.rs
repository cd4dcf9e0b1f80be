//! Generated artifacts: what they are, when they are stale, and in which
//! order they are produced.

pub mod catalog;
pub mod graph;
pub mod staleness;

pub use catalog::{ArtifactKind, ArtifactSpec, CATALOG, Generation};
pub use graph::ArtifactGraph;
pub use staleness::{StaleReason, is_stale, stale_reason};

//! Running external tools and the renderer.
//!
//! - [`command`]: builder for every external process
//! - [`registry`]: macro packages by name and component type
//! - [`invoker`]: one renderer run on a control file
//! - [`pipeline`]: assemble, render when stale, post-process

pub mod command;
pub mod invoker;
pub mod pipeline;
pub mod registry;

pub use command::{CommandOutput, ExternalCommand};
pub use invoker::{RenderInvoker, RenderOutcome};
pub use pipeline::{RenderOptions, RenderReport, render_group};
pub use registry::{MacroPackage, MacroRegistry, UsfmTex};

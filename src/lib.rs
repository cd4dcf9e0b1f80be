//! Rapuma - typesetting project manager
//!
//! A project holds named *groups* of text components (for example the books
//! `gen exo lev` of a scripture publication). Rapuma installs components from
//! a source folder into a working area, keeps backups of the texts it
//! replaces, generates the macro settings, style sheets and control file the
//! TeX renderer needs, renders each group to PDF only when something it
//! depends on has changed, and binds finished groups into one deliverable.
//!
//! # Layout of a project
//!
//! ```text
//! <home>/
//!   Config/         project.toml layout.toml font.toml illustration.toml
//!   Components/     <gid>/ control file and PDFs, <cid>/ working text, .source, .cv1
//!   Macros/         copied macro package
//!   Tex/ Styles/    generated settings, extensions and stylesheets
//!   Hyphenation/ Illustrations/ Deliverable/
//! ```
//!
//! # Modules
//!
//! - [`config`] - TOML-backed configuration stores and typed views over them
//! - [`core`] - project context and the [`core::RapumaError`] taxonomy
//! - [`project`] - path layout, id validation, project initialisation
//! - [`lifecycle`] - group and component install, update, restore, removal, locking
//! - [`artifact`] - catalog of generated files, dependency graph, staleness
//! - [`generators`] - writers for each generated artifact
//! - [`assembler`] - ordered regeneration and the group control file
//! - [`render`] - external command plumbing, macro packages, render pipeline
//! - [`postprocess`] - background, centering and view copies of rendered PDFs
//! - [`bind`] - concatenation of rendered groups
//! - [`cli`] - the `rapuma` command line
//!
//! # Command-line usage
//!
//! ```bash
//! rapuma project init --id MYBK
//! rapuma group add GOSP --source ~/texts --cids mat,mrk,luk,jhn
//! rapuma render GOSP
//! rapuma render GOSP --cids jhn
//! rapuma group update GOSP --force --diff
//! rapuma bind --save
//! ```

pub mod artifact;
pub mod assembler;
pub mod bind;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod generators;
pub mod lifecycle;
pub mod postprocess;
pub mod project;
pub mod render;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

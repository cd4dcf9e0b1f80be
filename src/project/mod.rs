//! Project layout, component identifiers and initialisation.

pub mod ids;
pub mod init;
pub mod paths;

pub use ids::{CANONICAL_IDS, canonical_number, is_canonical, validate_cids};
pub use init::init_project;
pub use paths::{ProjectPaths, Switch};

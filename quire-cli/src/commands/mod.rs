//! CLI command implementations.

pub mod build;
pub mod omit;

pub use build::{build_site, BuildOverrides};
pub use omit::omit_files;

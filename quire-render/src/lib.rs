//! # quire-render
//!
//! Page rendering library for quire.
//!
//! This crate renders notes and folder listings with Askama templates and
//! post-processes the markup so it works when served as plain files.

pub mod home;
pub mod renderer;
pub mod rewrite;
pub mod templates;

pub use home::{home_fragment, search_widget, splice_before_listing};
pub use renderer::{NavTree, PageRenderer, RenderError, RenderMode, Viewer};
pub use rewrite::rewrite_folder_links;

//! Omit command implementation.

use anyhow::{Context, Result};
use quire_core::frontmatter::{self, FrontmatterError};
use quire_core::{Config, Vault};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OmitError {
    #[error("not a markdown note")]
    NotMarkdown,

    #[error("not inside the data directory {0:?}")]
    OutsideDataDir(PathBuf),

    #[error("{0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Mark `files` as omitted (or included again with `reverse`), one file at a time.
///
/// Returns the number of files updated; failures are reported and skipped.
pub fn omit_files(config_path: &Path, files: &[PathBuf], reverse: bool) -> Result<usize> {
    let config = Config::load_or_default(config_path).context("Failed to load configuration")?;
    let vault = Vault::new(config.data_dir());

    let mut updated = 0;
    for file in files {
        match set_omit(&vault, file, !reverse) {
            Ok(()) => updated += 1,
            Err(err) => {
                tracing::debug!("Skipping {:?}: {:?}", file, err);
                eprintln!("Preferences for {} could not be saved: {}", file.display(), err);
            }
        }
    }

    if reverse {
        println!("Specified files will no longer be ignored.");
    } else {
        println!("Specified files will now be ignored during build.");
    }
    Ok(updated)
}

fn set_omit(vault: &Vault, file: &Path, omit: bool) -> Result<(), OmitError> {
    if file.extension().map(|ext| ext != "md").unwrap_or(true) {
        return Err(OmitError::NotMarkdown);
    }
    if !vault.contains(file) {
        return Err(OmitError::OutsideDataDir(vault.root().to_path_buf()));
    }
    frontmatter::set_flag(file, "omit", omit)?;
    tracing::info!("Set omit={} on {:?}", omit, file);
    Ok(())
}

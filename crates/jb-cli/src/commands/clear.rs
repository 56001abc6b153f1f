//! Clear command implementation

use anyhow::Result;
use jb_jinja::CacheTarget;
use std::fs;
use std::io;
use std::path::Path;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_renderer, ExitCode};

/// Outcome of clearing the template cache
#[derive(Debug)]
pub(crate) enum ClearOutcome {
    /// The cache is disabled or a custom backend
    NotADirectory,
    Failed(io::Error),
    Cleaned,
}

/// Execute the template:clear command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let renderer = load_renderer(global)?;

    match clear_cache(renderer.engine().cache()) {
        ClearOutcome::NotADirectory => {
            eprintln!(
                "Template cache option is not defined as a directory path, so it can't be cleaned."
            );
            Err(ExitCode(1).into())
        }
        ClearOutcome::Failed(err) => {
            log::debug!("Cache removal failed: {err}");
            eprintln!("Template cache failed to be cleaned.");
            Err(ExitCode(1).into())
        }
        ClearOutcome::Cleaned => {
            println!("Template cache cleaned.");
            Ok(())
        }
    }
}

/// Delete everything below the cache directory, keeping the directory.
///
/// A missing directory is a failure.
pub(crate) fn clear_cache(cache: &CacheTarget) -> ClearOutcome {
    let Some(dir) = cache.directory() else {
        return ClearOutcome::NotADirectory;
    };
    match empty_directory(dir) {
        Ok(()) => ClearOutcome::Cleaned,
        Err(err) => ClearOutcome::Failed(err),
    }
}

fn empty_directory(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("cache directory {} does not exist", dir.display()),
        ));
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "clear_test.rs"]
mod tests;

//! Publish command implementation

use anyhow::{Context, Result};
use jb_core::{CONFIG_FILE_NAME, DEFAULT_CONFIG_YAML};
use std::fs;
use std::path::Path;

use crate::cli::{GlobalArgs, PublishArgs};

/// Result of publishing the configuration file
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Published {
    Created,
    Overwritten,
    Skipped,
}

/// Execute the template:publish command
pub(crate) fn execute(args: &PublishArgs, global: &GlobalArgs) -> Result<()> {
    let target = Path::new(&global.project_dir).join(CONFIG_FILE_NAME);
    match publish_config(&target, args.force)? {
        Published::Created => println!("Created {}", target.display()),
        Published::Overwritten => println!("Overwrote {}", target.display()),
        Published::Skipped => println!(
            "{} already exists, use --force to overwrite it.",
            target.display()
        ),
    }
    Ok(())
}

/// Write the default configuration to `target`
pub(crate) fn publish_config(target: &Path, force: bool) -> Result<Published> {
    let existed = target.exists();
    if existed && !force {
        return Ok(Published::Skipped);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(target, DEFAULT_CONFIG_YAML)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    Ok(if existed {
        Published::Overwritten
    } else {
        Published::Created
    })
}

#[cfg(test)]
#[path = "publish_test.rs"]
mod tests;

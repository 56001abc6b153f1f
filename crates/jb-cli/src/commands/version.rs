//! Version command implementation

use anyhow::Result;
use jb_jinja::ENGINE_VERSION;

/// Execute the template:version command
pub(crate) fn execute() -> Result<()> {
    println!("{}", version_line());
    Ok(())
}

pub(crate) fn version_line() -> String {
    format!("MiniJinja version [ {ENGINE_VERSION} ]")
}

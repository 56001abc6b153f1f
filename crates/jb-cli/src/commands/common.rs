//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use jb_core::{EngineConfig, PathConfig};
use jb_jinja::provider::register_services;
use jb_jinja::{Container, EngineFactory, JinjaRenderer};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the command already reported the failure.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the engine configuration for the project.
///
/// `--config` wins over `<project>/templates.yml`; relative template and
/// cache paths resolve against the project directory, and `--path`
/// entries are appended after the configured ones.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<EngineConfig> {
    let root = Path::new(&global.project_dir);
    let mut config = match &global.config {
        Some(path) => EngineConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {path}"))?,
        None => EngineConfig::load_from_dir(root).context("Failed to load configuration")?,
    };
    config.resolve_paths(root);

    for arg in &global.paths {
        let (namespace, dir) = parse_path_arg(arg);
        let dir = PathBuf::from(dir);
        config.paths.push(PathConfig {
            path: if dir.is_relative() { root.join(dir) } else { dir },
            namespace: namespace.map(str::to_string),
        });
    }
    Ok(config)
}

/// Build the engine and renderer for the project
pub(crate) fn load_renderer(global: &GlobalArgs) -> Result<Arc<JinjaRenderer>> {
    let config = load_config(global)?;
    let factory = EngineFactory::new(Arc::new(Container::new()));
    register_services(&factory, &config).context("Failed to build template engine")
}

/// Split a `--path` value into its namespace and directory.
///
/// `admin=views/admin` is namespaced; a value without `=` belongs to the
/// main namespace.
pub(crate) fn parse_path_arg(arg: &str) -> (Option<&str>, &str) {
    match arg.split_once('=') {
        Some((namespace, dir)) if !namespace.is_empty() => (Some(namespace), dir),
        _ => (None, arg),
    }
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
///
/// For each column, returns the maximum width across the header and all
/// row values so that data aligns when printed with left-padding.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Write a formatted table.
///
/// Prints a left-aligned header row, a separator line of dashes, and each
/// data row. Columns are separated by two spaces; trailing padding is
/// trimmed.
///
/// ```text
/// Namespace  Path(s)
/// ---------  --------------
/// (None)     /app/templates/
/// ```
pub(crate) fn write_table(
    out: &mut impl Write,
    headers: &[&str],
    rows: &[Vec<String>],
) -> io::Result<()> {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<String>| {
        let parts: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        parts.join("  ").trim_end().to_string()
    };

    writeln!(out, "{}", line(headers.iter().map(|h| h.to_string()).collect()))?;
    writeln!(out, "{}", line(widths.iter().map(|&w| "-".repeat(w)).collect()))?;
    for row in rows {
        writeln!(out, "{}", line(row.clone()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;

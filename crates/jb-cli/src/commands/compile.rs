//! Compile command implementation
//!
//! Walks every loader directory, compiles each template file without
//! rendering it, and reports syntax errors with the surrounding source.

use anyhow::{Context, Result};
use jb_jinja::{qualified_name, JinjaRenderer};
use minijinja::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::PoisonError;
use walkdir::WalkDir;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_renderer, ExitCode};

/// Source lines shown on each side of a failing line
const CONTEXT_LINES: usize = 3;

/// Compilation result for one template file
#[derive(Debug)]
pub(crate) struct TemplateCheck {
    pub name: String,
    pub path: PathBuf,
    pub source: String,
    pub error: Option<Error>,
}

/// Execute the template:compile command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let renderer = load_renderer(global)?;
    let checks = check_templates(&renderer)?;

    let mut out = io::stdout().lock();
    let errors = report(&checks, global.verbose, &mut out)?;
    if errors > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Template files below every registered directory, as `(name, path)`.
///
/// Only files ending in `.<extension>` are considered; names use the
/// `@namespace/relative/path` form outside the main namespace.
pub(crate) fn find_templates(renderer: &JinjaRenderer) -> Vec<(String, PathBuf)> {
    let suffix = format!(".{}", renderer.extension());
    let loader = renderer
        .engine()
        .loader()
        .read()
        .unwrap_or_else(PoisonError::into_inner);

    let mut found = Vec::new();
    for namespace in loader.namespaces() {
        for dir in loader.paths(namespace) {
            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::warn!("Skipping unreadable entry below {}: {err}", dir.display());
                        continue;
                    }
                };
                if !entry.file_type().is_file()
                    || !entry.file_name().to_string_lossy().ends_with(&suffix)
                {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(dir) else {
                    continue;
                };
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                found.push((qualified_name(namespace, &relative), entry.into_path()));
            }
        }
    }
    found
}

/// Compile every template file the renderer can see
pub(crate) fn check_templates(renderer: &JinjaRenderer) -> Result<Vec<TemplateCheck>> {
    find_templates(renderer)
        .into_iter()
        .map(|(name, path)| -> Result<TemplateCheck> {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            let error = renderer.engine().compile(&name, &source).err();
            Ok(TemplateCheck {
                name,
                path,
                source,
                error,
            })
        })
        .collect()
}

/// Print failures (and successes when verbose) followed by a summary.
///
/// Returns the number of invalid templates.
pub(crate) fn report(
    checks: &[TemplateCheck],
    verbose: bool,
    out: &mut impl Write,
) -> io::Result<usize> {
    let mut errors = 0;
    for check in checks {
        match &check.error {
            Some(err) => {
                errors += 1;
                write_error(out, check, err)?;
            }
            None if verbose => writeln!(out, "OK in {}", check.path.display())?,
            None => {}
        }
    }

    let total = checks.len();
    if total == 0 {
        writeln!(out, "No template files found in the loader paths.")?;
    } else if errors == 0 {
        writeln!(out, "All {total} template files contain valid syntax.")?;
    } else {
        writeln!(
            out,
            "{} template files have valid syntax and {errors} contain errors.",
            total - errors
        )?;
    }
    Ok(errors)
}

fn write_error(out: &mut impl Write, check: &TemplateCheck, err: &Error) -> io::Result<()> {
    log::debug!("Template {} failed to compile: {err}", check.name);
    let message = raw_message(err);
    let Some(line) = err.line() else {
        writeln!(out, "ERROR in {}", check.path.display())?;
        return writeln!(out, " >> {message}");
    };

    writeln!(out, "ERROR in {} (line {line})", check.path.display())?;
    for (number, code) in context_lines(&check.source, line, CONTEXT_LINES) {
        let marker = if number == line { " >> " } else { "    " };
        writeln!(out, "{marker} {number:<6} {code}")?;
        if number == line {
            writeln!(out, " >> {message}")?;
        }
    }
    Ok(())
}

/// Error text without the template location
fn raw_message(err: &Error) -> String {
    match err.detail() {
        Some(detail) => format!("{}: {detail}", err.kind()),
        None => err.kind().to_string(),
    }
}

/// 1-based `(number, line)` pairs within `context` lines of `line`
pub(crate) fn context_lines(source: &str, line: usize, context: usize) -> Vec<(usize, &str)> {
    let lines: Vec<&str> = source.lines().collect();
    let first = line.saturating_sub(context).max(1);
    let last = (line + context).min(lines.len());
    (first..=last)
        .filter_map(|number| lines.get(number - 1).map(|code| (number, *code)))
        .collect()
}

#[cfg(test)]
#[path = "compile_test.rs"]
mod tests;

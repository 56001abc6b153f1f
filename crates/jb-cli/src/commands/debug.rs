//! Debug command implementation
//!
//! Lists the functions, filters, tests and globals registered on the
//! engine, then the template directories of every namespace.

use anyhow::Result;
use jb_core::TemplatePath;
use jb_jinja::{describe_value, CallableKind, JinjaRenderer, Param, TemplateRenderer};
use minijinja::value::ValueKind;
use minijinja::Value;
use std::io::{self, Write};
use std::path::MAIN_SEPARATOR;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_renderer, write_table};

/// Longest JSON rendering shown for a global
const GLOBAL_PREVIEW_CHARS: usize = 50;

/// Execute the template:debug command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let renderer = load_renderer(global)?;
    let mut out = io::stdout().lock();
    write_debug(&renderer, &mut out)?;
    Ok(())
}

pub(crate) fn write_debug(renderer: &JinjaRenderer, out: &mut impl Write) -> io::Result<()> {
    let engine = renderer.engine();

    let functions: Vec<String> = engine
        .functions()
        .iter()
        .map(|(name, f)| {
            let params = f.options.visible_params(CallableKind::Function);
            format!("{name}({})", join_params(params))
        })
        .collect();
    write_section(out, "Functions", &functions)?;

    let filters: Vec<String> = engine
        .filters()
        .iter()
        .map(|(name, f)| {
            let params = f.options.visible_params(CallableKind::Filter);
            if params.is_empty() {
                name.clone()
            } else {
                format!("{name}({})", join_params(params))
            }
        })
        .collect();
    write_section(out, "Filters", &filters)?;

    let tests: Vec<String> = engine.tests().keys().cloned().collect();
    write_section(out, "Tests", &tests)?;

    let globals: Vec<String> = engine
        .globals()
        .iter()
        .map(|(name, value)| format!("{name} = {}", global_preview(value)))
        .collect();
    write_section(out, "Globals", &globals)?;

    writeln!(out)?;
    writeln!(out, "Loader Paths")?;
    writeln!(out, "------------")?;
    let rows = path_rows(&renderer.paths());
    if rows.is_empty() {
        writeln!(out, "No template paths configured for your application.")
    } else {
        write_table(out, &["Namespace", "Path(s)"], &rows)
    }
}

fn write_section(out: &mut impl Write, title: &str, items: &[String]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))?;
    for item in items {
        writeln!(out, " * {item}")?;
    }
    Ok(())
}

fn join_params(params: &[Param]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `object(...)` for opaque objects, otherwise truncated JSON
fn global_preview(value: &Value) -> String {
    let description = describe_value(value);
    if value.kind() == ValueKind::Plain {
        description
    } else {
        description.chars().take(GLOBAL_PREVIEW_CHARS).collect()
    }
}

/// Table rows grouped by namespace.
///
/// Only the first row of a namespace carries its label; namespaces with
/// several directories are set apart by an empty row.
pub(crate) fn path_rows(paths: &[TemplatePath]) -> Vec<Vec<String>> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for entry in paths {
        let label = match entry.namespace() {
            Some(namespace) => format!("@{namespace}"),
            None => "(None)".to_string(),
        };
        let dir = format!("{}{}", entry.path().display(), MAIN_SEPARATOR);
        match groups.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, dirs)) => dirs.push(dir),
            None => groups.push((label, vec![dir])),
        }
    }

    let mut rows = Vec::new();
    let mut previous_separated = false;
    for (index, (label, dirs)) in groups.into_iter().enumerate() {
        let multiple = dirs.len() > 1;
        if index > 0 && !previous_separated && multiple {
            rows.push(vec![String::new(), String::new()]);
        }
        for (position, dir) in dirs.into_iter().enumerate() {
            let label = if position == 0 { label.clone() } else { String::new() };
            rows.push(vec![label, dir]);
        }
        if multiple {
            rows.push(vec![String::new(), String::new()]);
        }
        previous_separated = multiple;
    }
    if previous_separated {
        rows.pop();
    }
    rows
}

#[cfg(test)]
#[path = "debug_test.rs"]
mod tests;

use super::*;
use jb_core::EngineOptions;
use jb_jinja::{CacheTarget, Engine, TemplateRenderer};
use std::path::Path;
use std::sync::Arc;

fn renderer() -> JinjaRenderer {
    JinjaRenderer::new(Arc::new(Engine::new(
        EngineOptions::default(),
        CacheTarget::Disabled,
    )))
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn output(checks: &[TemplateCheck], verbose: bool) -> (String, usize) {
    let mut out = Vec::new();
    let errors = report(checks, verbose, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), errors)
}

#[test]
fn test_find_templates_across_namespaces() {
    let main = tempfile::tempdir().unwrap();
    let admin = tempfile::tempdir().unwrap();
    write(main.path(), "home.html.jinja", "home");
    write(main.path(), "layouts/base.html.jinja", "base");
    write(main.path(), "notes.txt", "not a template");
    write(admin.path(), "users/list.html.jinja", "users");

    let renderer = renderer();
    renderer.add_path(main.path(), None).unwrap();
    renderer.add_path(admin.path(), Some("admin")).unwrap();

    let names: Vec<String> = find_templates(&renderer)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        names,
        vec!["home.html.jinja", "layouts/base.html.jinja", "@admin/users/list.html.jinja"]
    );
}

#[test]
fn test_find_templates_honors_extension() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "page.tpl", "page");
    write(dir.path(), "page.html.jinja", "page");

    let renderer = renderer().with_extension("tpl");
    renderer.add_path(dir.path(), None).unwrap();

    let found = find_templates(&renderer);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "page.tpl");
    assert_eq!(found[0].1, dir.path().join("page.tpl"));
}

#[test]
fn test_check_templates_flags_syntax_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.html.jinja", "{{ title }}");
    write(dir.path(), "bad.html.jinja", "line one\n{% if %}\nline three\n");

    let renderer = renderer();
    renderer.add_path(dir.path(), None).unwrap();
    let checks = check_templates(&renderer).unwrap();

    assert_eq!(checks.len(), 2);
    let bad = checks.iter().find(|c| c.name == "bad.html.jinja").unwrap();
    assert_eq!(bad.error.as_ref().and_then(Error::line), Some(2));
    let good = checks.iter().find(|c| c.name == "good.html.jinja").unwrap();
    assert!(good.error.is_none());
}

#[test]
fn test_report_all_valid() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.html.jinja", "a");
    write(dir.path(), "b.html.jinja", "b");
    let renderer = renderer();
    renderer.add_path(dir.path(), None).unwrap();
    let checks = check_templates(&renderer).unwrap();

    let (quiet, errors) = output(&checks, false);
    assert_eq!(errors, 0);
    assert_eq!(quiet, "All 2 template files contain valid syntax.\n");

    let (verbose, _) = output(&checks, true);
    assert!(verbose.contains(&format!("OK in {}", dir.path().join("a.html.jinja").display())));
}

#[test]
fn test_report_no_templates() {
    let (out, errors) = output(&[], false);
    assert_eq!(errors, 0);
    assert_eq!(out, "No template files found in the loader paths.\n");
}

#[test]
fn test_report_error_with_context() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ok.html.jinja", "fine");
    write(
        dir.path(),
        "broken.html.jinja",
        "one\ntwo\nthree\n{% for %}\nfive\nsix\nseven\neight\n",
    );
    let renderer = renderer();
    renderer.add_path(dir.path(), None).unwrap();
    let checks = check_templates(&renderer).unwrap();

    let (out, errors) = output(&checks, false);
    assert_eq!(errors, 1);

    let path = dir.path().join("broken.html.jinja");
    assert!(out.contains(&format!("ERROR in {} (line 4)", path.display())));
    assert!(out.contains("     1      one\n"));
    assert!(out.contains(" >>  4      {% for %}\n"));
    assert!(out.contains("     7      seven\n"));
    assert!(!out.contains("eight"));
    assert!(out.contains(" >> syntax error"));
    assert!(out.ends_with("1 template files have valid syntax and 1 contain errors.\n"));
}

#[test]
fn test_context_lines_at_edges() {
    let source = "a\nb\nc\nd\ne";
    assert_eq!(context_lines(source, 1, 3), vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    assert_eq!(context_lines(source, 5, 3), vec![(2, "b"), (3, "c"), (4, "d"), (5, "e")]);
    assert_eq!(context_lines(source, 3, 1), vec![(2, "b"), (3, "c"), (4, "d")]);
    assert!(context_lines("", 1, 3).is_empty());
}

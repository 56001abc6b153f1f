use super::*;
use crate::cache::CacheTarget;
use jb_core::EngineOptions;
use std::fs;
use std::path::PathBuf;

fn renderer() -> JinjaRenderer {
    JinjaRenderer::new(Arc::new(Engine::new(
        EngineOptions::default(),
        CacheTarget::Disabled,
    )))
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_normalize_template() {
    let renderer = renderer();
    assert_eq!(renderer.normalize_template("home"), "home.html.jinja");
    assert_eq!(renderer.normalize_template("home.html"), "home.html");
    assert_eq!(renderer.normalize_template("home.HTML"), "home.HTML");
    assert_eq!(
        renderer.normalize_template("admin::users/list"),
        "@admin/users/list.html.jinja"
    );
    assert_eq!(
        renderer.normalize_template("admin::users/list.txt"),
        "@admin/users/list.txt"
    );
    assert_eq!(renderer.normalize_template("@admin/page"), "@admin/page.html.jinja");
}

#[test]
fn test_custom_extension() {
    let renderer = renderer().with_extension("tpl");
    assert_eq!(renderer.normalize_template("home"), "home.tpl");
    assert_eq!(renderer.extension(), "tpl");
}

#[test]
fn test_render_merges_attributes() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "greet.html.jinja", "{{ greeting }}, {{ name }}!");

    let renderer = renderer()
        .with_attribute("greeting", Value::from("Hello"))
        .with_attribute("name", Value::from("nobody"));
    renderer.add_path(dir.path(), None).unwrap();

    let mut params = Params::new();
    params.insert("name".to_string(), Value::from("Ann"));
    assert_eq!(renderer.render("greet", params).unwrap(), "Hello, Ann!");
    assert_eq!(renderer.attributes().len(), 2);
}

#[test]
fn test_render_propagates_engine_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.html.jinja", "{% if %}");
    let renderer = renderer();
    renderer.add_path(dir.path(), None).unwrap();

    let err = renderer.render("broken", Params::new()).unwrap_err();
    assert!(matches!(err, crate::error::JinjaError::RenderError(_)));
}

#[test]
fn test_namespace_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "mail/welcome.html.jinja", "Welcome");

    let renderer = renderer();
    renderer.add_path(dir.path(), Some("ns")).unwrap();

    assert!(renderer.exists("ns::mail/welcome"));
    assert!(renderer.exists("@ns/mail/welcome.html.jinja"));
    assert!(!renderer.exists("mail/welcome"));
    assert_eq!(
        renderer.render("ns::mail/welcome", Params::new()).unwrap(),
        "Welcome"
    );
}

#[test]
fn test_add_missing_directory_fails() {
    let err = renderer()
        .add_path(Path::new("/definitely/not/here"), None)
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_paths_omit_main_namespace_label() {
    let main = tempfile::tempdir().unwrap();
    let admin_a = tempfile::tempdir().unwrap();
    let admin_b = tempfile::tempdir().unwrap();

    let renderer = renderer();
    renderer.add_path(main.path(), None).unwrap();
    renderer.add_path(admin_a.path(), Some("admin")).unwrap();
    renderer.add_path(admin_b.path(), Some("admin")).unwrap();

    let paths = renderer.paths();
    assert_eq!(
        paths,
        vec![
            TemplatePath::new(main.path(), None),
            TemplatePath::new(admin_a.path(), Some("admin".to_string())),
            TemplatePath::new(admin_b.path(), Some("admin".to_string())),
        ]
    );
}

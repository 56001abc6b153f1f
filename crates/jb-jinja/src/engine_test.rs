use super::*;
use crate::cache::TemplateCache;
use crate::callable::CallableOptions;
use minijinja::context;
use std::fs;
use std::path::Path;

fn engine_with_templates(
    options: EngineOptions,
    files: &[(&str, &str)],
) -> (Engine, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    let engine = Engine::new(options, CacheTarget::Disabled);
    engine
        .loader()
        .write()
        .unwrap()
        .add_path(dir.path(), jb_core::MAIN_NAMESPACE)
        .unwrap();
    (engine, dir)
}

fn shout(_: &State, args: &[Value]) -> Result<Value, Error> {
    let text = args.first().map(ToString::to_string).unwrap_or_default();
    Ok(Value::from(format!("<em>{}</em>", text.to_uppercase())))
}

#[test]
fn test_render_from_loader() {
    let (engine, _dir) = engine_with_templates(
        EngineOptions::default(),
        &[("hello.html.jinja", "Hello {{ name }}!")],
    );
    let out = engine
        .render("hello.html.jinja", context! { name => "World" })
        .unwrap();
    assert_eq!(out, "Hello World!");
    assert!(engine.exists("hello.html.jinja"));
    assert!(!engine.exists("missing.html.jinja"));
}

#[test]
fn test_render_missing_template_fails() {
    let engine = Engine::new(EngineOptions::default(), CacheTarget::Disabled);
    let err = engine.render("nope.html.jinja", context! {}).unwrap_err();
    assert!(err.to_string().starts_with("[J001]"));
}

#[test]
fn test_html_autoescape_by_default() {
    let (engine, _dir) =
        engine_with_templates(EngineOptions::default(), &[("page.txt", "{{ value }}")]);
    let out = engine.render("page.txt", context! { value => "<b>" }).unwrap();
    assert_eq!(out, "&lt;b&gt;");
}

#[test]
fn test_autoescape_disabled() {
    let options = EngineOptions {
        autoescape: AutoescapeStrategy::None,
        ..EngineOptions::default()
    };
    let (engine, _dir) = engine_with_templates(options, &[("page.html", "{{ value }}")]);
    let out = engine.render("page.html", context! { value => "<b>" }).unwrap();
    assert_eq!(out, "<b>");
}

#[test]
fn test_autoescape_by_name() {
    let options = EngineOptions {
        autoescape: AutoescapeStrategy::Name,
        ..EngineOptions::default()
    };
    let (engine, _dir) = engine_with_templates(
        options,
        &[("page.html.jinja", "{{ value }}"), ("page.txt", "{{ value }}")],
    );
    let ctx = || context! { value => "<b>" };
    assert_eq!(engine.render("page.html.jinja", ctx()).unwrap(), "&lt;b&gt;");
    assert_eq!(engine.render("page.txt", ctx()).unwrap(), "<b>");
}

#[test]
fn test_strict_variables() {
    let strict = EngineOptions {
        strict_variables: true,
        ..EngineOptions::default()
    };
    let (engine, _dir) = engine_with_templates(strict, &[("page.txt", "{{ missing }}")]);
    assert!(engine.render("page.txt", context! {}).is_err());

    let (lenient, _dir) =
        engine_with_templates(EngineOptions::default(), &[("page.txt", "[{{ missing }}]")]);
    assert_eq!(lenient.render("page.txt", context! {}).unwrap(), "[]");
}

#[test]
fn test_safe_function_is_not_escaped() {
    let (mut engine, _dir) = engine_with_templates(
        EngineOptions::default(),
        &[("page.txt", "{{ shout('a') }}|{{ loud('b') }}")],
    );
    engine.add_function(
        TemplateFunction::new("shout", shout).with_options(CallableOptions::safe()),
    );
    engine.add_function(TemplateFunction::new("loud", shout));

    let out = engine.render("page.txt", context! {}).unwrap();
    assert_eq!(out, "<em>A</em>|&lt;em&gt;B&lt;&#x2f;em&gt;");
    assert!(engine.functions().contains_key("shout"));
}

#[test]
fn test_filters_tests_and_globals() {
    let (mut engine, _dir) = engine_with_templates(
        EngineOptions {
            autoescape: AutoescapeStrategy::None,
            ..EngineOptions::default()
        },
        &[(
            "page.txt",
            "{{ site|shout }} {% if 4 is even_number %}even{% endif %}",
        )],
    );
    engine.add_filter(TemplateFilter::new("shout", shout));
    engine.add_test(TemplateTest::new("even_number", |_: &State, args: &[Value]| {
        Ok(args.first().and_then(|v| i64::try_from(v.clone()).ok()).is_some_and(|n| n % 2 == 0))
    }));
    engine.add_global("site", Value::from("demo"));

    let out = engine.render("page.txt", context! {}).unwrap();
    assert_eq!(out, "<em>DEMO</em> even");
    assert_eq!(engine.globals().len(), 1);
    assert!(engine.tests().contains_key("even_number"));
}

#[test]
fn test_core_extension_registered() {
    let engine = Engine::new(EngineOptions::default(), CacheTarget::Disabled);
    assert!(engine.has_extension("core"));
    for filter in ["date", "interval", "number_format"] {
        assert!(engine.filters().contains_key(filter), "missing {filter}");
    }
}

#[test]
fn test_duplicate_extension_is_skipped() {
    let mut engine = Engine::new(EngineOptions::default(), CacheTarget::Disabled);
    let core = CoreExtension::new(SharedFormats::default());
    engine.add_extension(&core);
    assert_eq!(engine.extensions(), ["core".to_string()]);
}

#[test]
fn test_format_settings() {
    let mut engine = Engine::new(EngineOptions::default(), CacheTarget::Disabled);
    engine.set_number_format(2, ",", ".");
    engine.set_date_format(Some("%d/%m/%Y"), None);
    engine.set_timezone("Europe/Paris").unwrap();

    assert_eq!(
        engine.number_format(),
        NumberFormat {
            decimals: 2,
            decimal_point: ",".to_string(),
            thousands_separator: ".".to_string(),
        }
    );
    let date = engine.date_settings();
    assert_eq!(date.format, "%d/%m/%Y");
    assert_eq!(date.interval_format, "%d days");
    assert_eq!(engine.timezone(), Tz::Europe__Paris);

    let out = engine
        .environment()
        .render_str("{{ 1234.5|number_format }} {{ 0|date }}", ())
        .unwrap();
    assert_eq!(out, "1.234,50 01/01/1970");
}

#[test]
fn test_invalid_timezone_keeps_previous() {
    let mut engine = Engine::new(EngineOptions::default(), CacheTarget::Disabled);
    let before = engine.timezone();
    assert!(engine.set_timezone("Not/AZone").is_err());
    assert_eq!(engine.timezone(), before);
}

#[test]
fn test_custom_lexer() {
    let (mut engine, _dir) =
        engine_with_templates(EngineOptions::default(), &[("page.txt", "Hi <$ name $>")]);
    let tokens: BTreeMap<String, serde_yaml::Value> =
        serde_yaml::from_str("tag_variable: ['<$', '$>']").unwrap();
    engine.set_lexer(LexerSyntax::from_tokens(&tokens).unwrap()).unwrap();
    assert!(!engine.lexer().is_empty());

    let out = engine.render("page.txt", context! { name => "Ann" }).unwrap();
    assert_eq!(out, "Hi Ann");
}

#[test]
fn test_compile_reports_syntax_errors() {
    let engine = Engine::new(EngineOptions::default(), CacheTarget::Disabled);
    assert!(engine.compile("ok.html.jinja", "{{ value }}").is_ok());

    let err = engine
        .compile("bad.html.jinja", "line one\n{% if %}\n")
        .unwrap_err();
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_directory_cache_is_populated() {
    let views = tempfile::tempdir().unwrap();
    let cache_dir = tempfile::tempdir().unwrap();
    fs::write(views.path().join("page.txt"), "cached {{ 1 + 1 }}").unwrap();

    let engine = Engine::new(
        EngineOptions::default(),
        CacheTarget::Directory(cache_dir.path().to_path_buf()),
    );
    engine
        .loader()
        .write()
        .unwrap()
        .add_path(views.path(), jb_core::MAIN_NAMESPACE)
        .unwrap();

    assert_eq!(engine.render("page.txt", context! {}).unwrap(), "cached 2");

    let backend = engine.cache().backend().unwrap();
    let key = backend.generate_key("page.txt", &views.path().join("page.txt"));
    assert!(Path::new(&key).starts_with(cache_dir.path()));
    assert_eq!(backend.load(&key).as_deref(), Some("cached {{ 1 + 1 }}"));
}

#[test]
fn test_engine_version_comes_from_lock_file() {
    let parts: Vec<&str> = ENGINE_VERSION.split('.').collect();
    assert_eq!(parts.len(), 3, "unexpected version {ENGINE_VERSION}");
    assert_eq!(parts[0], "2");
    assert!(parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())));
}

//! Registers the engine and renderer in the service container.

use crate::container::Container;
use crate::engine::Engine;
use crate::error::JinjaResult;
use crate::extensions::{
    ContainerExtension, DebugExtension, RequestContext, RoutingExtension, UrlGenerator,
};
use crate::factory::EngineFactory;
use crate::renderer::{JinjaRenderer, TemplateRenderer};
use jb_core::EngineConfig;
use std::sync::Arc;

/// `Arc<Engine>`
pub const ENGINE_SERVICE: &str = "template.engine";

/// `Arc<dyn TemplateRenderer>`
pub const RENDERER_SERVICE: &str = "template.renderer";

/// `Arc<dyn UrlGenerator>`, provided by the application
pub const URL_GENERATOR_SERVICE: &str = "url_generator";

/// `Arc<dyn RequestContext>`, provided by the application
pub const REQUEST_CONTEXT_SERVICE: &str = "request_context";

/// Build the engine, boot the framework extensions, register the configured
/// template paths, and bind engine and renderer as container singletons.
pub fn register_services(
    factory: &EngineFactory,
    config: &EngineConfig,
) -> JinjaResult<Arc<JinjaRenderer>> {
    let container = factory.container();
    let mut engine = factory.build(config)?;
    boot_extensions(&mut engine, container)?;

    let engine = Arc::new(engine);
    container.singleton(ENGINE_SERVICE, Arc::clone(&engine));

    let renderer = JinjaRenderer::new(engine).with_extension(config.extension.clone());
    for entry in &config.paths {
        renderer.add_path(&entry.path, entry.namespace.as_deref())?;
    }

    let renderer = Arc::new(renderer);
    let shared: Arc<dyn TemplateRenderer> = renderer.clone();
    container.singleton(RENDERER_SERVICE, shared);
    Ok(renderer)
}

/// Add the extensions backed by framework services.
///
/// The container extension is always added; `dump` only in debug mode;
/// the routing helpers only when both routing services are bound.
pub fn boot_extensions(engine: &mut Engine, container: &Arc<Container>) -> JinjaResult<()> {
    engine.add_extension(&ContainerExtension::new(Arc::clone(container)));

    if engine.options().debug {
        engine.add_extension(&DebugExtension);
    }

    if container.has(URL_GENERATOR_SERVICE) && container.has(REQUEST_CONTEXT_SERVICE) {
        let generator = container.get::<Arc<dyn UrlGenerator>>(URL_GENERATOR_SERVICE)?;
        let context = container.get::<Arc<dyn RequestContext>>(REQUEST_CONTEXT_SERVICE)?;
        engine.add_extension(&RoutingExtension::new(generator, context));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{UrlError, UrlParams};
    use minijinja::Value;

    struct Paths;

    impl UrlGenerator for Paths {
        fn relative_url_for(
            &self,
            route: &str,
            _: &UrlParams,
            _: &UrlParams,
        ) -> Result<String, UrlError> {
            Ok(format!("/{route}"))
        }

        fn absolute_url_for(
            &self,
            base: &str,
            route: &str,
            _: &UrlParams,
            _: &UrlParams,
        ) -> Result<String, UrlError> {
            Ok(format!("{base}{route}"))
        }
    }

    struct Ctx;

    impl RequestContext for Ctx {
        fn uri(&self) -> String {
            "http://localhost/".to_string()
        }
    }

    fn factory() -> EngineFactory {
        EngineFactory::new(Arc::new(Container::new()))
    }

    #[test]
    fn test_register_services_binds_singletons() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.html.jinja"), "home").unwrap();
        let yaml = format!("paths:\n  - path: {}\n", dir.path().display());
        let config = EngineConfig::from_yaml_str(&yaml).unwrap();

        let factory = factory();
        let renderer = register_services(&factory, &config).unwrap();
        assert!(renderer.exists("home"));

        let container = factory.container();
        let engine = container.get::<Arc<Engine>>(ENGINE_SERVICE).unwrap();
        assert!(engine.has_extension("container"));
        assert!(!engine.has_extension("debug"));
        assert!(!engine.has_extension("routing"));

        let shared = container
            .get::<Arc<dyn TemplateRenderer>>(RENDERER_SERVICE)
            .unwrap();
        assert_eq!(shared.render("home", Default::default()).unwrap(), "home");
    }

    #[test]
    fn test_debug_extension_only_in_debug_mode() {
        let config = EngineConfig::from_yaml_str("options:\n  debug: true\n").unwrap();
        let factory = factory();
        let renderer = register_services(&factory, &config).unwrap();
        assert!(renderer.engine().has_extension("debug"));
        assert!(renderer.engine().functions().contains_key("dump"));
    }

    #[test]
    fn test_routing_extension_requires_both_services() {
        let factory = factory();
        let generator: Arc<dyn UrlGenerator> = Arc::new(Paths);
        factory.container().singleton(URL_GENERATOR_SERVICE, generator);

        let renderer = register_services(&factory, &EngineConfig::default()).unwrap();
        assert!(!renderer.engine().has_extension("routing"));

        let context: Arc<dyn RequestContext> = Arc::new(Ctx);
        factory.container().singleton(REQUEST_CONTEXT_SERVICE, context);
        let renderer = register_services(&factory, &EngineConfig::default()).unwrap();
        assert!(renderer.engine().has_extension("routing"));

        let out = renderer
            .engine()
            .environment()
            .render_str("{{ absolute_url_for('home')|safe }}", ())
            .unwrap();
        assert_eq!(out, "http://localhost/home");
    }

    #[test]
    fn test_container_extension_reads_services() {
        let factory = factory();
        factory
            .container()
            .singleton("app.title", Value::from("Dashboard"));
        let renderer = register_services(&factory, &EngineConfig::default()).unwrap();
        let out = renderer
            .engine()
            .environment()
            .render_str("{{ get('app.title') }}", ())
            .unwrap();
        assert_eq!(out, "Dashboard");
    }
}

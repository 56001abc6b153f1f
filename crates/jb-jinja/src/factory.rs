//! Builds a configured [`Engine`] from an [`EngineConfig`].
//!
//! The factory holds what the configuration file can only refer to by
//! name: the service container (extensions), the callable registry
//! (functions and filters), the class registry (facades), and an optional
//! custom cache backend. `build` is stateless per call and can be invoked
//! repeatedly.

use crate::cache::{CacheTarget, TemplateCache};
use crate::callable::{CallableRegistry, CallableSpec, Normalized};
use crate::container::{Container, ContainerError};
use crate::engine::Engine;
use crate::error::{CallableKind, JinjaError, JinjaResult};
use crate::extension::{Extension, EXTENSION_TRAIT};
use crate::facade::{ClassRegistry, FacadeProxy};
use crate::lexer::LexerSyntax;
use crate::values::yaml_to_value;
use jb_core::EngineConfig;
use minijinja::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Engine factory
#[derive(Clone)]
pub struct EngineFactory {
    container: Arc<Container>,
    callables: CallableRegistry,
    classes: ClassRegistry,
    functions: BTreeMap<String, CallableSpec>,
    filters: BTreeMap<String, CallableSpec>,
    extensions: Vec<Arc<dyn Extension>>,
    cache: Option<Arc<dyn TemplateCache>>,
}

impl fmt::Debug for EngineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extensions: Vec<&str> = self.extensions.iter().map(|ext| ext.name()).collect();
        f.debug_struct("EngineFactory")
            .field("container", &self.container)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("extensions", &extensions)
            .finish_non_exhaustive()
    }
}

impl EngineFactory {
    pub fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            callables: CallableRegistry::new(),
            classes: ClassRegistry::new(),
            functions: BTreeMap::new(),
            filters: BTreeMap::new(),
            extensions: Vec::new(),
            cache: None,
        }
    }

    /// Callables that `functions:` and `filters:` entries can name
    pub fn with_callables(mut self, callables: CallableRegistry) -> Self {
        self.callables = callables;
        self
    }

    /// Static classes that `facades:` entries can name
    pub fn with_classes(mut self, classes: ClassRegistry) -> Self {
        self.classes = classes;
        self
    }

    /// Add a function declared in code, on top of the configured ones
    pub fn with_function(mut self, name: impl Into<String>, spec: CallableSpec) -> Self {
        self.functions.insert(name.into(), spec);
        self
    }

    /// Add a filter declared in code, on top of the configured ones
    pub fn with_filter(mut self, name: impl Into<String>, spec: CallableSpec) -> Self {
        self.filters.insert(name.into(), spec);
        self
    }

    /// Add an extension instance, before the ones listed under `extensions:`
    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Use a custom cache backend instead of the configured cache option
    pub fn with_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Build an engine from `config`
    pub fn build(&self, config: &EngineConfig) -> JinjaResult<Engine> {
        config.validate()?;

        let cache = match &self.cache {
            Some(cache) => CacheTarget::Custom(Arc::clone(cache)),
            None => CacheTarget::from(&config.options.cache),
        };
        log::debug!("Building template engine (cache: {cache:?})");
        let mut engine = Engine::new(config.options.clone(), cache);

        let number = &config.number_format;
        engine.set_number_format(
            number.decimals,
            number.decimal_point.clone(),
            number.thousands_separator.clone(),
        );
        engine.set_date_format(
            Some(config.date.format.as_str()),
            Some(config.date.interval_format.as_str()),
        );
        // Unset keeps the process default picked by `Engine::new`.
        if let Some(timezone) = &config.date.timezone {
            engine.set_timezone(timezone)?;
        }

        if !config.lexer.is_empty() {
            engine.set_lexer(LexerSyntax::from_tokens(&config.lexer)?)?;
        }

        self.add_facades(&mut engine, config);

        for (name, value) in &config.globals {
            engine.add_global(name.clone(), yaml_to_value(value));
        }

        for extension in &self.extensions {
            engine.add_extension(extension.as_ref());
        }
        for id in &config.extensions {
            let extension = self.load_extension(id)?;
            engine.add_extension(extension.as_ref());
        }

        self.add_custom(&mut engine, CallableKind::Function, &config.functions, &self.functions)?;
        self.add_custom(&mut engine, CallableKind::Filter, &config.filters, &self.filters)?;

        Ok(engine)
    }

    fn add_facades(&self, engine: &mut Engine, config: &EngineConfig) {
        for (name, settings) in &config.facades {
            let class = self.classes.get(&settings.class).cloned();
            if class.is_none() {
                log::warn!(
                    "Facade '{}' refers to unknown class '{}'; \
                     its methods will be reported as missing",
                    name,
                    settings.class
                );
            }
            let charset = settings
                .charset
                .clone()
                .unwrap_or_else(|| config.options.charset.clone());
            let proxy = FacadeProxy::new(
                settings.class.clone(),
                class,
                settings.is_safe.clone(),
                charset,
                config.options.strict_variables,
            );
            engine.add_global(name.clone(), Value::from_object(proxy));
        }
    }

    /// Resolve an extension identifier through the container
    fn load_extension(&self, id: &str) -> JinjaResult<Arc<dyn Extension>> {
        self.container
            .get::<Arc<dyn Extension>>(id)
            .map_err(|err| match err {
                ContainerError::NotFound { id } => JinjaError::UnknownExtension { id },
                ContainerError::TypeMismatch { id, actual, .. } => JinjaError::InvalidExtension {
                    id,
                    expected: EXTENSION_TRAIT,
                    given: actual.to_string(),
                },
            })
    }

    fn add_custom(
        &self,
        engine: &mut Engine,
        kind: CallableKind,
        configured: &BTreeMap<String, serde_yaml::Value>,
        declared: &BTreeMap<String, CallableSpec>,
    ) -> JinjaResult<()> {
        let mut specs: Vec<(&String, CallableSpec)> = Vec::new();
        for (name, raw) in configured {
            let spec = self
                .callables
                .spec_from_yaml(raw)
                .ok_or_else(|| JinjaError::InvalidCallable {
                    kind,
                    name: name.clone(),
                })?;
            specs.push((name, spec));
        }
        specs.extend(declared.iter().map(|(name, spec)| (name, spec.clone())));

        for (name, spec) in specs {
            match spec.normalize(kind, name)? {
                Normalized::Function(function) => engine.add_function(function),
                Normalized::Filter(filter) => engine.add_filter(filter),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod tests;

//! The configured template engine.
//!
//! [`Engine`] owns the MiniJinja environment together with the registries
//! the environment cannot report back: functions, filters, tests, globals
//! and extensions. `template:debug` lists those registries.

use crate::cache::CacheTarget;
use crate::callable::{mark_safe, TemplateFilter, TemplateFunction, TemplateTest};
use crate::error::JinjaResult;
use crate::extension::Extension;
use crate::extensions::CoreExtension;
use crate::format::{parse_timezone, DateSettings, FormatSettings, NumberFormat, SharedFormats};
use crate::lexer::LexerSyntax;
use crate::loader::{CachingLoader, NamespacedLoader, SharedLoader};
use chrono_tz::Tz;
use jb_core::{AutoescapeStrategy, EngineOptions};
use minijinja::value::{Rest, Value};
use minijinja::{AutoEscape, Environment, Error, State, UndefinedBehavior};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Version of the embedded MiniJinja library
pub const ENGINE_VERSION: &str = env!("JB_MINIJINJA_VERSION");

/// Template engine with its loader, cache target and registries
pub struct Engine {
    env: Environment<'static>,
    loader: SharedLoader,
    cache: CacheTarget,
    options: EngineOptions,
    formats: SharedFormats,
    lexer: LexerSyntax,
    functions: BTreeMap<String, TemplateFunction>,
    filters: BTreeMap<String, TemplateFilter>,
    tests: BTreeMap<String, TemplateTest>,
    globals: BTreeMap<String, Value>,
    extensions: Vec<String>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine with an empty loader and the core extension
    pub fn new(options: EngineOptions, cache: CacheTarget) -> Self {
        let loader: SharedLoader = Arc::new(RwLock::new(NamespacedLoader::new()));

        let mut env = Environment::new();
        env.set_debug(options.debug);
        env.set_undefined_behavior(if options.strict_variables {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        match options.autoescape {
            AutoescapeStrategy::Html => env.set_auto_escape_callback(|_| AutoEscape::Html),
            AutoescapeStrategy::Json => env.set_auto_escape_callback(|_| AutoEscape::Json),
            AutoescapeStrategy::Name => {
                env.set_auto_escape_callback(minijinja::default_auto_escape_callback)
            }
            AutoescapeStrategy::None => env.set_auto_escape_callback(|_| AutoEscape::None),
        }

        let caching = CachingLoader {
            loader: Arc::clone(&loader),
            cache: cache.backend(),
            auto_reload: options.auto_reload(),
        };
        env.set_loader(move |name| caching.load(name));

        let mut engine = Self {
            env,
            loader,
            cache,
            options,
            formats: SharedFormats::default(),
            lexer: LexerSyntax::default(),
            functions: BTreeMap::new(),
            filters: BTreeMap::new(),
            tests: BTreeMap::new(),
            globals: BTreeMap::new(),
            extensions: Vec::new(),
        };
        let core = CoreExtension::new(Arc::clone(&engine.formats));
        engine.add_extension(&core);
        engine
    }

    pub fn add_function(&mut self, function: TemplateFunction) {
        let callable = Arc::clone(&function.callable);
        let is_safe = function.options.is_safe;
        self.env.add_function(
            function.name.clone(),
            move |state: &State, args: Rest<Value>| -> Result<Value, Error> {
                callable(state, &args).map(|value| mark_safe(value, is_safe))
            },
        );
        log::debug!("Registered template function '{}'", function.name);
        self.functions.insert(function.name.clone(), function);
    }

    pub fn add_filter(&mut self, filter: TemplateFilter) {
        let callable = Arc::clone(&filter.callable);
        let is_safe = filter.options.is_safe;
        self.env.add_filter(
            filter.name.clone(),
            move |state: &State, args: Rest<Value>| -> Result<Value, Error> {
                callable(state, &args).map(|value| mark_safe(value, is_safe))
            },
        );
        log::debug!("Registered template filter '{}'", filter.name);
        self.filters.insert(filter.name.clone(), filter);
    }

    pub fn add_test(&mut self, test: TemplateTest) {
        let callable = Arc::clone(&test.callable);
        self.env.add_test(
            test.name.clone(),
            move |state: &State, args: Rest<Value>| -> Result<bool, Error> {
                callable(state, &args)
            },
        );
        log::debug!("Registered template test '{}'", test.name);
        self.tests.insert(test.name.clone(), test);
    }

    pub fn add_global(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.env.add_global(name.clone(), value.clone());
        self.globals.insert(name, value);
    }

    /// Register everything `extension` contributes.
    ///
    /// An extension whose name is already registered is skipped.
    pub fn add_extension(&mut self, extension: &dyn Extension) {
        let name = extension.name().to_string();
        if self.extensions.contains(&name) {
            log::warn!("Template extension '{name}' is already registered, skipping");
            return;
        }
        for function in extension.functions() {
            self.add_function(function);
        }
        for filter in extension.filters() {
            self.add_filter(filter);
        }
        for test in extension.tests() {
            self.add_test(test);
        }
        for (global, value) in extension.globals() {
            self.add_global(global, value);
        }
        log::debug!("Registered template extension '{name}'");
        self.extensions.push(name);
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }

    /// Defaults of the `number_format` filter
    pub fn set_number_format(
        &mut self,
        decimals: u32,
        decimal_point: impl Into<String>,
        thousands_separator: impl Into<String>,
    ) {
        self.write_formats().number = NumberFormat {
            decimals,
            decimal_point: decimal_point.into(),
            thousands_separator: thousands_separator.into(),
        };
    }

    /// Defaults of the `date` and `interval` filters. `None` keeps the
    /// current value.
    pub fn set_date_format(&mut self, format: Option<&str>, interval_format: Option<&str>) {
        let mut formats = self.write_formats();
        if let Some(format) = format {
            formats.date.format = format.to_string();
        }
        if let Some(interval_format) = interval_format {
            formats.date.interval_format = interval_format.to_string();
        }
    }

    pub fn set_timezone(&mut self, timezone: &str) -> JinjaResult<()> {
        let tz = parse_timezone(timezone)?;
        self.write_formats().date.timezone = tz;
        Ok(())
    }

    pub fn number_format(&self) -> NumberFormat {
        self.read_formats().number.clone()
    }

    pub fn date_settings(&self) -> DateSettings {
        self.read_formats().date.clone()
    }

    pub fn timezone(&self) -> Tz {
        self.read_formats().date.timezone
    }

    /// Replace the template delimiters
    pub fn set_lexer(&mut self, syntax: LexerSyntax) -> JinjaResult<()> {
        let config = syntax.to_syntax_config()?;
        self.env.set_syntax(config);
        self.lexer = syntax;
        Ok(())
    }

    pub fn lexer(&self) -> &LexerSyntax {
        &self.lexer
    }

    /// Render the template `name` with `context`
    pub fn render(&self, name: &str, context: Value) -> JinjaResult<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }

    /// Whether the loader resolves `name`
    pub fn exists(&self, name: &str) -> bool {
        self.loader
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .exists(name)
    }

    /// Compile `source` as template `name` without rendering it
    pub fn compile(&self, name: &str, source: &str) -> Result<(), Error> {
        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), source.to_string())
    }

    pub fn loader(&self) -> &SharedLoader {
        &self.loader
    }

    pub fn cache(&self) -> &CacheTarget {
        &self.cache
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn charset(&self) -> &str {
        &self.options.charset
    }

    pub fn functions(&self) -> &BTreeMap<String, TemplateFunction> {
        &self.functions
    }

    pub fn filters(&self) -> &BTreeMap<String, TemplateFilter> {
        &self.filters
    }

    pub fn tests(&self) -> &BTreeMap<String, TemplateTest> {
        &self.tests
    }

    pub fn globals(&self) -> &BTreeMap<String, Value> {
        &self.globals
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// The underlying MiniJinja environment
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    fn read_formats(&self) -> std::sync::RwLockReadGuard<'_, FormatSettings> {
        self.formats.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_formats(&self) -> std::sync::RwLockWriteGuard<'_, FormatSettings> {
        self.formats.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

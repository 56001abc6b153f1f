//! Renderer abstraction consumed by the rest of the application.

use crate::engine::Engine;
use crate::error::JinjaResult;
use jb_core::{TemplatePath, DEFAULT_TEMPLATE_EXTENSION, MAIN_NAMESPACE};
use minijinja::Value;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError};

/// Template parameters
pub type Params = BTreeMap<String, Value>;

/// Renders named templates
pub trait TemplateRenderer: Send + Sync {
    /// Render `name` with `params` merged over the renderer's attributes
    fn render(&self, name: &str, params: Params) -> JinjaResult<String>;

    /// Whether `name` resolves to a template, without rendering it
    fn exists(&self, name: &str) -> bool;

    /// Register a search directory under `namespace` (main namespace when `None`)
    fn add_path(&self, path: &Path, namespace: Option<&str>) -> JinjaResult<()>;

    /// Registered search directories
    fn paths(&self) -> Vec<TemplatePath>;
}

static NAMESPACE_SHORTHAND: OnceLock<Regex> = OnceLock::new();
static HAS_EXTENSION: OnceLock<Regex> = OnceLock::new();

/// [`TemplateRenderer`] backed by an [`Engine`]
#[derive(Debug, Clone)]
pub struct JinjaRenderer {
    engine: Arc<Engine>,
    attributes: Params,
    extension: String,
}

impl JinjaRenderer {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            attributes: Params::new(),
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
        }
    }

    /// File extension appended to names that carry none
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Default parameter available to every render
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attributes(&self) -> &Params {
        &self.attributes
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Normalize a template name.
    ///
    /// `ns::path` becomes `@ns/path`, and the default extension is appended
    /// when the name does not end with one.
    pub fn normalize_template(&self, name: &str) -> String {
        let shorthand = NAMESPACE_SHORTHAND
            .get_or_init(|| Regex::new(r"^([^:]+)::(.*)$").expect("valid regex"));
        let has_extension =
            HAS_EXTENSION.get_or_init(|| Regex::new(r"(?i)\.[a-z]+$").expect("valid regex"));

        let name = shorthand.replace(name, "@${1}/${2}");
        if has_extension.is_match(&name) {
            name.into_owned()
        } else {
            format!("{}.{}", name, self.extension)
        }
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, name: &str, params: Params) -> JinjaResult<String> {
        let mut context = self.attributes.clone();
        context.extend(params);
        let name = self.normalize_template(name);
        self.engine.render(&name, Value::from_iter(context))
    }

    fn exists(&self, name: &str) -> bool {
        self.engine.exists(&self.normalize_template(name))
    }

    fn add_path(&self, path: &Path, namespace: Option<&str>) -> JinjaResult<()> {
        let namespace = namespace.unwrap_or(MAIN_NAMESPACE);
        log::debug!(
            "Adding template path {} to namespace '{}'",
            path.display(),
            namespace
        );
        self.engine
            .loader()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_path(path, namespace)
    }

    fn paths(&self) -> Vec<TemplatePath> {
        let loader = self
            .engine
            .loader()
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let paths = loader
            .namespaces()
            .into_iter()
            .flat_map(|namespace| {
                let label = (namespace != MAIN_NAMESPACE).then(|| namespace.to_string());
                loader
                    .paths(namespace)
                    .iter()
                    .map(move |path| TemplatePath::new(path.clone(), label.clone()))
            })
            .collect();
        paths
    }
}

#[cfg(test)]
#[path = "renderer_test.rs"]
mod tests;

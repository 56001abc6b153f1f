//! Extension capability: a bundle of functions, filters, tests and globals
//! added to an engine in one step.

use crate::callable::{TemplateFilter, TemplateFunction, TemplateTest};
use minijinja::Value;

/// Plugin unit contributing callables and globals to an [`crate::Engine`].
///
/// Extensions listed in `templates.yml` are resolved from the container as
/// `Arc<dyn Extension>`.
pub trait Extension: Send + Sync {
    /// Name reported by `template:debug` and used to detect duplicates
    fn name(&self) -> &str;

    fn functions(&self) -> Vec<TemplateFunction> {
        Vec::new()
    }

    fn filters(&self) -> Vec<TemplateFilter> {
        Vec::new()
    }

    fn tests(&self) -> Vec<TemplateTest> {
        Vec::new()
    }

    fn globals(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
}

/// Type name used in extension errors
pub(crate) const EXTENSION_TRAIT: &str = "jb_jinja::Extension";

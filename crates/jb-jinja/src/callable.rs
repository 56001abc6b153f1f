//! Template functions, filters and tests, and the callable specifications
//! accepted by the engine factory.
//!
//! A function or filter can be declared three ways:
//!
//! 1. a plain callable ([`CallableSpec::Callable`]), in YAML the name of a
//!    callable registered with the factory: `rot13: str_rot13`
//! 2. a callable plus options ([`CallableSpec::WithOptions`]), in YAML a
//!    two-item list: `shout: [upper, { is_safe: true }]`
//! 3. a pre-built [`TemplateFunction`] / [`TemplateFilter`]
//!
//! Every callable receives the render [`State`] and its positional
//! arguments. Filters get the filtered value as the first argument.

use crate::error::{CallableKind, JinjaError, JinjaResult};
use minijinja::value::{Value, ValueKind};
use minijinja::{Error, State};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Callable backing a function or a filter
pub type Callable = Arc<dyn Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync>;

/// Callable backing a test
pub type TestCallable = Arc<dyn Fn(&State, &[Value]) -> Result<bool, Error> + Send + Sync>;

/// Declared parameter of a callable, shown by `template:debug`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<serde_json::Value>,
    pub variadic: bool,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            variadic: false,
        }
    }

    pub fn with_default(name: impl Into<String>, default: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
            variadic: false,
        }
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            variadic: true,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            return write!(f, "*{}", self.name);
        }
        match &self.default {
            Some(default) => write!(f, "{} = {}", self.name, default),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Options attached to a callable
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallableOptions {
    /// String results are not escaped again
    #[serde(default)]
    pub is_safe: bool,

    /// The implementation takes the environment as leading parameter
    #[serde(default)]
    pub needs_environment: bool,

    /// The implementation takes the render context as leading parameter
    #[serde(default)]
    pub needs_context: bool,

    /// Parameters as declared by the implementation
    #[serde(skip)]
    pub params: Vec<Param>,
}

impl CallableOptions {
    pub fn safe() -> Self {
        Self {
            is_safe: true,
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    /// Parameters a template author passes explicitly.
    ///
    /// Drops the injected environment/context parameters and, for filters,
    /// the filtered value.
    pub fn visible_params(&self, kind: CallableKind) -> &[Param] {
        let mut skip = usize::from(self.needs_environment) + usize::from(self.needs_context);
        if kind == CallableKind::Filter {
            skip += 1;
        }
        self.params.get(skip..).unwrap_or(&[])
    }
}

/// Function registered on the engine
#[derive(Clone)]
pub struct TemplateFunction {
    pub name: String,
    pub callable: Callable,
    pub options: CallableOptions,
}

impl TemplateFunction {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Arc::new(f),
            options: CallableOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CallableOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for TemplateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFunction")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Filter registered on the engine
#[derive(Clone)]
pub struct TemplateFilter {
    pub name: String,
    pub callable: Callable,
    pub options: CallableOptions,
}

impl TemplateFilter {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Arc::new(f),
            options: CallableOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CallableOptions) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Debug for TemplateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFilter")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Test registered on the engine
#[derive(Clone)]
pub struct TemplateTest {
    pub name: String,
    pub callable: TestCallable,
}

impl TemplateTest {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&State, &[Value]) -> Result<bool, Error> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Arc::new(f),
        }
    }
}

impl fmt::Debug for TemplateTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateTest")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One of the accepted shapes of a function/filter declaration
#[derive(Clone)]
pub enum CallableSpec {
    Callable(Callable),
    WithOptions(Callable, CallableOptions),
    Function(TemplateFunction),
    Filter(TemplateFilter),
}

impl fmt::Debug for CallableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallableSpec::Callable(_) => write!(f, "Callable"),
            CallableSpec::WithOptions(_, options) => {
                f.debug_tuple("WithOptions").field(options).finish()
            }
            CallableSpec::Function(function) => f.debug_tuple("Function").field(function).finish(),
            CallableSpec::Filter(filter) => f.debug_tuple("Filter").field(filter).finish(),
        }
    }
}

/// Result of normalizing a [`CallableSpec`]
#[derive(Debug, Clone)]
pub enum Normalized {
    Function(TemplateFunction),
    Filter(TemplateFilter),
}

impl CallableSpec {
    /// Normalize into the engine's function/filter object for `kind`.
    ///
    /// A pre-built object of the other kind is rejected.
    pub fn normalize(self, kind: CallableKind, name: &str) -> JinjaResult<Normalized> {
        let (callable, options) = match self {
            CallableSpec::Callable(callable) => (callable, CallableOptions::default()),
            CallableSpec::WithOptions(callable, options) => (callable, options),
            CallableSpec::Function(function) if kind == CallableKind::Function => {
                return Ok(Normalized::Function(function));
            }
            CallableSpec::Filter(filter) if kind == CallableKind::Filter => {
                return Ok(Normalized::Filter(filter));
            }
            CallableSpec::Function(_) | CallableSpec::Filter(_) => {
                return Err(JinjaError::InvalidCallable {
                    kind,
                    name: name.to_string(),
                });
            }
        };
        Ok(match kind {
            CallableKind::Function => Normalized::Function(TemplateFunction {
                name: name.to_string(),
                callable,
                options,
            }),
            CallableKind::Filter => Normalized::Filter(TemplateFilter {
                name: name.to_string(),
                callable,
                options,
            }),
        })
    }
}

/// Named callables that configuration files can refer to
#[derive(Clone, Default)]
pub struct CallableRegistry {
    entries: BTreeMap<String, (Callable, Vec<Param>)>,
}

impl fmt::Debug for CallableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl CallableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name` with its declared parameters
    pub fn register<F>(&mut self, name: impl Into<String>, params: Vec<Param>, f: F)
    where
        F: Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), (Arc::new(f), params));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Interpret a YAML declaration as a [`CallableSpec`].
    ///
    /// `None` when the value matches no accepted shape or names an
    /// unregistered callable.
    pub fn spec_from_yaml(&self, value: &serde_yaml::Value) -> Option<CallableSpec> {
        match value {
            serde_yaml::Value::String(name) => {
                let (callable, params) = self.entries.get(name)?;
                Some(CallableSpec::WithOptions(
                    Arc::clone(callable),
                    CallableOptions::default().with_params(params.clone()),
                ))
            }
            serde_yaml::Value::Sequence(items) if matches!(items.len(), 1 | 2) => {
                let (callable, params) = self.entries.get(items[0].as_str()?)?;
                let options = match items.get(1) {
                    None | Some(serde_yaml::Value::Null) => CallableOptions::default(),
                    Some(raw @ serde_yaml::Value::Mapping(_)) => {
                        serde_yaml::from_value::<CallableOptions>(raw.clone()).ok()?
                    }
                    Some(_) => return None,
                };
                Some(CallableSpec::WithOptions(
                    Arc::clone(callable),
                    options.with_params(params.clone()),
                ))
            }
            _ => None,
        }
    }
}

/// Mark string-like results as safe when the callable is declared safe.
///
/// Plain objects count as string-like and are replaced by their rendering.
pub(crate) fn mark_safe(value: Value, is_safe: bool) -> Value {
    if !is_safe || value.is_safe() {
        return value;
    }
    match value.kind() {
        ValueKind::String => match value.as_str() {
            Some(s) => Value::from_safe_string(s.to_string()),
            None => value,
        },
        ValueKind::Plain => Value::from_safe_string(value.to_string()),
        _ => value,
    }
}

#[cfg(test)]
#[path = "callable_test.rs"]
mod tests;

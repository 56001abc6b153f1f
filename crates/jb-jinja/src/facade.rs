//! Static classes exposed to templates as global objects.
//!
//! A [`StaticClass`] is a named set of free functions. The factory wraps
//! each class listed under `facades:` in a [`FacadeProxy`] and registers it
//! as a global, so `{{ Html.link('Home', '/') }}` forwards to the `link`
//! method of the `Html` class.

use crate::callable::mark_safe;
use jb_core::IsSafe;
use minijinja::value::{Object, ObjectRepr, Value};
use minijinja::{Error, ErrorKind, State};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Method of a static class
pub type StaticMethod = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// Named collection of methods callable without an instance
#[derive(Clone)]
pub struct StaticClass {
    name: String,
    methods: BTreeMap<String, StaticMethod>,
}

impl fmt::Debug for StaticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticClass")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StaticClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: BTreeMap::new(),
        }
    }

    /// Add a method, replacing any previous one with the same name
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Invoke `method`. `None` when the class has no such method.
    pub fn call(&self, method: &str, args: &[Value]) -> Option<Result<Value, Error>> {
        self.methods.get(method).map(|f| f(args))
    }
}

/// Static classes that `facades:` entries can name
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, StaticClass>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: StaticClass) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&StaticClass> {
        self.classes.get(name)
    }
}

/// Template-side proxy forwarding method calls to a [`StaticClass`].
///
/// String results of methods covered by `is_safe` are marked safe and
/// therefore not escaped again. Calling a missing method fails with
/// `UnknownMethod`, unless the engine is lenient about undefined values,
/// in which case the call yields undefined.
#[derive(Debug)]
pub struct FacadeProxy {
    class_name: String,
    class: Option<StaticClass>,
    is_safe: IsSafe,
    charset: String,
    strict: bool,
}

impl FacadeProxy {
    pub fn new(
        class_name: impl Into<String>,
        class: Option<StaticClass>,
        is_safe: IsSafe,
        charset: impl Into<String>,
        strict: bool,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            class,
            is_safe,
            charset: charset.into(),
            strict,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Charset of safe results
    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn is_method_safe(&self, method: &str) -> bool {
        self.is_safe.covers(method)
    }
}

impl Object for FacadeProxy {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let result = self.class.as_ref().and_then(|class| class.call(method, args));
        match result {
            Some(value) => Ok(mark_safe(value?, self.is_method_safe(method))),
            None if self.strict => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!(
                    "The method \"{}::{}\" does not exist.",
                    self.class_name, method
                ),
            )),
            None => Ok(Value::UNDEFINED),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        Self: Sized + 'static,
    {
        write!(f, "{}", self.class_name)
    }
}

#[cfg(test)]
#[path = "facade_test.rs"]
mod tests;

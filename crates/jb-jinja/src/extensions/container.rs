//! `get(id)` template function backed by the service container.

use crate::callable::{CallableOptions, Param, TemplateFunction};
use crate::container::Container;
use crate::extension::Extension;
use minijinja::value::Value;
use minijinja::{Error, ErrorKind, State};
use std::sync::Arc;

/// Exposes container services to templates.
///
/// Services stored as [`Value`] are returned as-is, `String` services as
/// strings. Anything else is reported as not template-visible.
#[derive(Debug, Clone)]
pub struct ContainerExtension {
    container: Arc<Container>,
}

impl ContainerExtension {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }
}

impl Extension for ContainerExtension {
    fn name(&self) -> &str {
        "container"
    }

    fn functions(&self) -> Vec<TemplateFunction> {
        vec![TemplateFunction::new("get", make_get_fn(self.container.clone()))
            .with_options(CallableOptions::default().with_params(vec![Param::new("id")]))]
    }
}

pub(crate) fn make_get_fn(
    container: Arc<Container>,
) -> impl Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |_state: &State, args: &[Value]| -> Result<Value, Error> {
        let id = args.first().and_then(Value::as_str).ok_or_else(|| {
            Error::new(
                ErrorKind::MissingArgument,
                "get() requires a service identifier",
            )
        })?;

        if let Ok(value) = container.get::<Value>(id) {
            return Ok(value);
        }
        if let Ok(text) = container.get::<String>(id) {
            return Ok(Value::from(text));
        }
        let message = match container.type_name_of(id) {
            Some(actual) => format!("service '{id}' ({actual}) cannot be used in templates"),
            None => format!("service '{id}' is not registered"),
        };
        Err(Error::new(ErrorKind::InvalidOperation, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::value::Rest;
    use minijinja::Environment;

    fn env_for(container: Arc<Container>) -> Environment<'static> {
        let mut env = Environment::new();
        for function in ContainerExtension::new(container).functions() {
            let callable = function.callable.clone();
            env.add_function(function.name, move |state: &State, args: Rest<Value>| {
                callable(state, &args)
            });
        }
        env
    }

    #[test]
    fn test_get_returns_stored_value() {
        let container = Arc::new(Container::new());
        container.singleton("greeting", Value::from("Hello world"));
        let env = env_for(container);
        assert_eq!(
            env.render_str("{{ get('greeting') }}", ()).unwrap(),
            "Hello world"
        );
    }

    #[test]
    fn test_get_returns_string_service() {
        let container = Arc::new(Container::new());
        container.singleton("app.name", "Demo".to_string());
        let env = env_for(container);
        assert_eq!(env.render_str("{{ get('app.name') }}", ()).unwrap(), "Demo");
    }

    #[test]
    fn test_get_unknown_service_fails() {
        let env = env_for(Arc::new(Container::new()));
        let err = env.render_str("{{ get('missing') }}", ()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_get_opaque_service_fails() {
        let container = Arc::new(Container::new());
        container.singleton("counter", 3_u64);
        let env = env_for(container);
        let err = env.render_str("{{ get('counter') }}", ()).unwrap_err();
        assert!(err.to_string().contains("cannot be used in templates"));
    }
}

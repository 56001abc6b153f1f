//! URL generation helpers: `absolute_url_for` and `relative_url_for`.

use crate::callable::{CallableOptions, Param, TemplateFunction};
use crate::extension::Extension;
use minijinja::value::{Value, ValueKind};
use minijinja::{Error, ErrorKind, State};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Route placeholder values or query parameters
pub type UrlParams = BTreeMap<String, String>;

/// URL generation failures reported by a [`UrlGenerator`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Route '{route}' is not defined")]
    UnknownRoute { route: String },

    #[error("Route '{route}' requires the '{parameter}' substitution")]
    MissingSubstitution { route: String, parameter: String },
}

/// Builds URLs from named routes
pub trait UrlGenerator: Send + Sync {
    /// Path for `route`, e.g. `/blog/42`
    fn relative_url_for(
        &self,
        route: &str,
        substitutions: &UrlParams,
        query: &UrlParams,
    ) -> Result<String, UrlError>;

    /// Full URL for `route`, using scheme and authority from `base_uri`
    fn absolute_url_for(
        &self,
        base_uri: &str,
        route: &str,
        substitutions: &UrlParams,
        query: &UrlParams,
    ) -> Result<String, UrlError>;
}

/// Access to the request being served
pub trait RequestContext: Send + Sync {
    /// URI of the current request
    fn uri(&self) -> String;
}

/// Template functions over the application's URL generator
#[derive(Clone)]
pub struct RoutingExtension {
    generator: Arc<dyn UrlGenerator>,
    context: Arc<dyn RequestContext>,
}

impl std::fmt::Debug for RoutingExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingExtension").finish_non_exhaustive()
    }
}

impl RoutingExtension {
    pub fn new(generator: Arc<dyn UrlGenerator>, context: Arc<dyn RequestContext>) -> Self {
        Self { generator, context }
    }
}

impl Extension for RoutingExtension {
    fn name(&self) -> &str {
        "routing"
    }

    fn functions(&self) -> Vec<TemplateFunction> {
        let params = || {
            CallableOptions::default().with_params(vec![
                Param::new("route"),
                Param::with_default("substitutions", serde_json::json!({})),
                Param::with_default("query", serde_json::json!({})),
            ])
        };

        let generator = Arc::clone(&self.generator);
        let context = Arc::clone(&self.context);
        let absolute = TemplateFunction::new("absolute_url_for", move |_: &State, args: &[Value]| {
            let (route, substitutions, query) = route_args(args)?;
            generator
                .absolute_url_for(&context.uri(), route, &substitutions, &query)
                .map(Value::from)
                .map_err(url_error)
        })
        .with_options(params());

        let generator = Arc::clone(&self.generator);
        let relative = TemplateFunction::new("relative_url_for", move |_: &State, args: &[Value]| {
            let (route, substitutions, query) = route_args(args)?;
            generator
                .relative_url_for(route, &substitutions, &query)
                .map(Value::from)
                .map_err(url_error)
        })
        .with_options(params());

        vec![absolute, relative]
    }
}

fn route_args(args: &[Value]) -> Result<(&str, UrlParams, UrlParams), Error> {
    let route = args.first().and_then(Value::as_str).ok_or_else(|| {
        Error::new(ErrorKind::MissingArgument, "a route name is required")
    })?;
    let substitutions = to_params(args.get(1), "substitutions")?;
    let query = to_params(args.get(2), "query")?;
    Ok((route, substitutions, query))
}

fn to_params(value: Option<&Value>, name: &str) -> Result<UrlParams, Error> {
    let Some(value) = value else {
        return Ok(UrlParams::new());
    };
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(UrlParams::new()),
        ValueKind::Map => {
            let mut params = UrlParams::new();
            for key in value.try_iter()? {
                let item = value.get_item(&key)?;
                params.insert(key.to_string(), item.to_string());
            }
            Ok(params)
        }
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("{name} must be a mapping, got {other}"),
        )),
    }
}

fn url_error(err: UrlError) -> Error {
    Error::new(ErrorKind::InvalidOperation, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::value::Rest;
    use minijinja::Environment;

    struct Router;

    impl Router {
        fn path(
            route: &str,
            substitutions: &UrlParams,
            query: &UrlParams,
        ) -> Result<String, UrlError> {
            let mut path = match route {
                "route_name" => "/my/target/path/".to_string(),
                "post" => {
                    let id = substitutions.get("id").ok_or_else(|| UrlError::MissingSubstitution {
                        route: route.to_string(),
                        parameter: "id".to_string(),
                    })?;
                    format!("/posts/{id}")
                }
                _ => {
                    return Err(UrlError::UnknownRoute {
                        route: route.to_string(),
                    })
                }
            };
            if !query.is_empty() {
                let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
                path.push('?');
                path.push_str(&pairs.join("&"));
            }
            Ok(path)
        }
    }

    impl UrlGenerator for Router {
        fn relative_url_for(
            &self,
            route: &str,
            s: &UrlParams,
            q: &UrlParams,
        ) -> Result<String, UrlError> {
            Self::path(route, s, q)
        }

        fn absolute_url_for(
            &self,
            base_uri: &str,
            route: &str,
            s: &UrlParams,
            q: &UrlParams,
        ) -> Result<String, UrlError> {
            Ok(format!("{}{}", base_uri.trim_end_matches('/'), Self::path(route, s, q)?))
        }
    }

    struct Request;

    impl RequestContext for Request {
        fn uri(&self) -> String {
            "https://www.foo.bar/".to_string()
        }
    }

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        let extension = RoutingExtension::new(Arc::new(Router), Arc::new(Request));
        for function in extension.functions() {
            let callable = function.callable.clone();
            env.add_function(function.name, move |state: &State, args: Rest<Value>| {
                callable(state, &args)
            });
        }
        env
    }

    #[test]
    fn test_absolute_url_for() {
        let out = env()
            .render_str("{{ absolute_url_for('route_name') }}", ())
            .unwrap();
        assert_eq!(out, "https://www.foo.bar/my/target/path/");
    }

    #[test]
    fn test_relative_url_for() {
        let out = env()
            .render_str("{{ relative_url_for('route_name') }}", ())
            .unwrap();
        assert_eq!(out, "/my/target/path/");
    }

    #[test]
    fn test_substitutions_and_query() {
        let out = env()
            .render_str("{{ relative_url_for('post', {'id': 42}, {'page': 2}) }}", ())
            .unwrap();
        assert_eq!(out, "/posts/42?page=2");
    }

    #[test]
    fn test_generator_errors_surface() {
        let err = env()
            .render_str("{{ relative_url_for('post') }}", ())
            .unwrap_err();
        assert!(err.to_string().contains("requires the 'id' substitution"));

        let err = env()
            .render_str("{{ relative_url_for('nope') }}", ())
            .unwrap_err();
        assert!(err.to_string().contains("Route 'nope' is not defined"));
    }

    #[test]
    fn test_rejects_non_mapping_substitutions() {
        assert!(env()
            .render_str("{{ relative_url_for('post', [1]) }}", ())
            .is_err());
    }
}

//! `dump()` helper, registered when the engine runs in debug mode.

use crate::callable::{CallableOptions, Param, TemplateFunction};
use crate::extension::Extension;
use minijinja::value::Value;
use minijinja::{Error, HtmlEscape, State};

#[derive(Debug, Clone, Copy, Default)]
pub struct DebugExtension;

impl Extension for DebugExtension {
    fn name(&self) -> &str {
        "debug"
    }

    fn functions(&self) -> Vec<TemplateFunction> {
        vec![TemplateFunction::new("dump", dump).with_options(
            CallableOptions::safe().with_params(vec![Param::variadic("values")]),
        )]
    }
}

/// Pretty-print each argument inside an escaped `<pre>` block
fn dump(_state: &State, args: &[Value]) -> Result<Value, Error> {
    let mut out = String::new();
    for value in args {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"));
        out.push_str("<pre>");
        out.push_str(&HtmlEscape(&text).to_string());
        out.push_str("</pre>");
    }
    Ok(Value::from_safe_string(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::value::Rest;
    use minijinja::{context, Environment};

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        for function in DebugExtension.functions() {
            let callable = function.callable.clone();
            env.add_function(function.name, move |state: &State, args: Rest<Value>| {
                callable(state, &args)
            });
        }
        env
    }

    #[test]
    fn test_dump_escapes_markup() {
        let out = env()
            .render_str("{{ dump(user) }}", context! { user => "<b>Ann</b>" })
            .unwrap();
        assert!(out.starts_with("<pre>&quot;&lt;b&gt;Ann"));
        assert!(out.ends_with("</pre>"));
        assert!(!out.contains("<b>"));
    }

    #[test]
    fn test_dump_multiple_values() {
        let out = env().render_str("{{ dump(1, 2) }}", ()).unwrap();
        assert_eq!(out, "<pre>1</pre><pre>2</pre>");
    }

    #[test]
    fn test_dump_declares_variadic_param() {
        let functions = DebugExtension.functions();
        assert_eq!(functions[0].options.params[0].to_string(), "*values");
        assert!(functions[0].options.is_safe);
    }
}

//! Conversions between configuration values and template values.

use minijinja::value::{Value, ValueKind};
use std::collections::BTreeMap;

/// Convert a YAML configuration value into a template value
pub fn yaml_to_value(yaml: &serde_yaml::Value) -> Value {
    json_to_value(&yaml_to_json(yaml))
}

/// Convert serde_json::Value to minijinja::Value
pub(crate) fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::from(()),
        serde_json::Value::Bool(b) => Value::from(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(f) = n.as_f64() {
                Value::from(f)
            } else {
                Value::from(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(arr) => {
            Value::from(arr.iter().map(json_to_value).collect::<Vec<_>>())
        }
        serde_json::Value::Object(obj) => {
            let map: BTreeMap<String, Value> = obj
                .iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect();
            Value::from_iter(map)
        }
    }
}

/// Convert serde_yaml::Value to serde_json::Value.
///
/// Non-string mapping keys are dropped; tags are unwrapped.
pub(crate) fn yaml_to_json(yaml: &serde_yaml::Value) -> serde_json::Value {
    match yaml {
        serde_yaml::Value::Null => serde_json::Value::Null,
        serde_yaml::Value::Bool(b) => serde_json::Value::Bool(*b),
        serde_yaml::Value::Number(n) => convert_yaml_number(n),
        serde_yaml::Value::String(s) => serde_json::Value::String(s.clone()),
        serde_yaml::Value::Sequence(seq) => {
            serde_json::Value::Array(seq.iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let obj: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .filter_map(|(k, v)| k.as_str().map(|key| (key.to_string(), yaml_to_json(v))))
                .collect();
            serde_json::Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// Convert a YAML number to a JSON value, handling NaN/Infinity gracefully.
fn convert_yaml_number(n: &serde_yaml::Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        return serde_json::Value::Number(serde_json::Number::from(i));
    }
    if let Some(f) = n.as_f64() {
        return match serde_json::Number::from_f64(f) {
            Some(num) => serde_json::Value::Number(num),
            None => {
                log::warn!("YAML number {} is NaN or Infinity; converting to null", f);
                serde_json::Value::Null
            }
        };
    }
    serde_json::Value::Null
}

/// Short JSON-ish rendering of a template value, used by `template:debug`
pub fn describe_value(value: &Value) -> String {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => "null".to_string(),
        ValueKind::Plain => format!("object({})", object_type_name(value)),
        _ => serde_json::to_string(value).unwrap_or_else(|_| value.to_string()),
    }
}

fn object_type_name(value: &Value) -> String {
    if let Some(facade) = value.downcast_object_ref::<crate::facade::FacadeProxy>() {
        return format!("FacadeProxy<{}>", facade.class_name());
    }
    "object".to_string()
}

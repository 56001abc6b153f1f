//! `date`, `interval` and `number_format` filters.
//!
//! The filters read the engine's [`SharedFormats`] on every call, so
//! changing the date or number settings on the engine takes effect without
//! re-registering them.

use crate::callable::{CallableOptions, Param, TemplateFilter};
use crate::extension::Extension;
use crate::format::{format_date, format_interval, format_number, parse_timezone, SharedFormats};
use minijinja::value::{Value, ValueKind};
use minijinja::{Error, ErrorKind, State};
use std::sync::PoisonError;

/// Formatting filters driven by the engine's date and number settings
#[derive(Debug, Clone)]
pub struct CoreExtension {
    formats: SharedFormats,
}

impl CoreExtension {
    pub fn new(formats: SharedFormats) -> Self {
        Self { formats }
    }
}

impl Extension for CoreExtension {
    fn name(&self) -> &str {
        "core"
    }

    fn filters(&self) -> Vec<TemplateFilter> {
        vec![
            TemplateFilter::new("date", make_date_fn(self.formats.clone())).with_options(
                CallableOptions::default().with_params(vec![
                    Param::new("value"),
                    Param::with_default("format", serde_json::Value::Null),
                    Param::with_default("timezone", serde_json::Value::Null),
                ]),
            ),
            TemplateFilter::new("interval", make_interval_fn(self.formats.clone())).with_options(
                CallableOptions::default().with_params(vec![
                    Param::new("seconds"),
                    Param::with_default("format", serde_json::Value::Null),
                ]),
            ),
            TemplateFilter::new("number_format", make_number_format_fn(self.formats.clone()))
                .with_options(CallableOptions::default().with_params(vec![
                    Param::new("number"),
                    Param::with_default("decimals", serde_json::Value::Null),
                    Param::with_default("decimal_point", serde_json::Value::Null),
                    Param::with_default("thousands_separator", serde_json::Value::Null),
                ])),
        ]
    }
}

/// Create the date filter
///
/// Usage in templates:
/// ```jinja
/// {{ post.published_at|date }}
/// {{ "2024-06-01T12:00:00Z"|date("%d/%m/%Y", "Europe/Paris") }}
/// ```
pub(crate) fn make_date_fn(
    formats: SharedFormats,
) -> impl Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |_state: &State, args: &[Value]| -> Result<Value, Error> {
        let settings = formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .date
            .clone();
        let value = args.first().cloned().unwrap_or_default();
        let format = optional_str(args.get(1), "format")?.unwrap_or(&settings.format);
        let timezone = match optional_str(args.get(2), "timezone")? {
            Some(name) => parse_timezone(name)
                .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?,
            None => settings.timezone,
        };
        format_date(&value, format, timezone).map(Value::from)
    }
}

/// Create the interval filter, formatting a number of seconds
///
/// Usage in templates:
/// ```jinja
/// {{ 93784|interval("%d d %h h") }}
/// ```
pub(crate) fn make_interval_fn(
    formats: SharedFormats,
) -> impl Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |_state: &State, args: &[Value]| -> Result<Value, Error> {
        let default_format = formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .date
            .interval_format
            .clone();
        let seconds = args.first().map(number_arg).transpose()?.unwrap_or(0.0);
        let format = optional_str(args.get(1), "format")?.unwrap_or(&default_format);
        Ok(Value::from(format_interval(seconds.trunc() as i64, format)))
    }
}

/// Create the number_format filter
///
/// Usage in templates:
/// ```jinja
/// {{ 1234.5|number_format(2, ",", " ") }}
/// ```
pub(crate) fn make_number_format_fn(
    formats: SharedFormats,
) -> impl Fn(&State, &[Value]) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |_state: &State, args: &[Value]| -> Result<Value, Error> {
        let settings = formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .number
            .clone();
        let number = args.first().map(number_arg).transpose()?.unwrap_or(0.0);
        let decimals = match args.get(1) {
            Some(v) if !is_missing(v) => u32::try_from(v.clone())?,
            _ => settings.decimals,
        };
        let point = optional_str(args.get(2), "decimal_point")?
            .unwrap_or(&settings.decimal_point);
        let thousands = optional_str(args.get(3), "thousands_separator")?
            .unwrap_or(&settings.thousands_separator);
        Ok(Value::from(format_number(number, decimals, point, thousands)))
    }
}

fn is_missing(value: &Value) -> bool {
    matches!(value.kind(), ValueKind::Undefined | ValueKind::None)
}

fn optional_str<'a>(value: Option<&'a Value>, name: &str) -> Result<Option<&'a str>, Error> {
    match value {
        None => Ok(None),
        Some(v) if is_missing(v) => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("{name} must be a string, got {}", v.kind()),
            )
        }),
    }
}

fn number_arg(value: &Value) -> Result<f64, Error> {
    if is_missing(value) {
        return Ok(0.0);
    }
    if let Some(text) = value.as_str() {
        return text.trim().parse::<f64>().map_err(|_| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("'{text}' is not a number"),
            )
        });
    }
    f64::try_from(value.clone())
}

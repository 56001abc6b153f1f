//! Date, interval and number formatting used by the core filters.

use crate::error::{JinjaError, JinjaResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use minijinja::value::{Value, ValueKind};
use minijinja::{Error, ErrorKind};
use std::fmt::Write;
use std::sync::{Arc, RwLock};

/// Date settings active on an engine
#[derive(Debug, Clone, PartialEq)]
pub struct DateSettings {
    pub format: String,
    pub interval_format: String,
    pub timezone: Tz,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            format: "%B %-d, %Y %H:%M".to_string(),
            interval_format: "%d days".to_string(),
            timezone: default_timezone(),
        }
    }
}

/// Number settings active on an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimals: u32,
    pub decimal_point: String,
    pub thousands_separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: 0,
            decimal_point: ".".to_string(),
            thousands_separator: ",".to_string(),
        }
    }
}

/// Date and number settings read by the core filters at render time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatSettings {
    pub date: DateSettings,
    pub number: NumberFormat,
}

/// Settings shared between an engine and its core extension
pub type SharedFormats = Arc<RwLock<FormatSettings>>;

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> JinjaResult<Tz> {
    name.parse::<Tz>().map_err(|_| JinjaError::InvalidTimezone {
        timezone: name.to_string(),
    })
}

/// Process default timezone: `TZ` when it names a known zone, else UTC
pub fn default_timezone() -> Tz {
    std::env::var("TZ")
        .ok()
        .and_then(|tz| tz.trim_start_matches(':').parse::<Tz>().ok())
        .unwrap_or(Tz::UTC)
}

/// Format `value` as a date in `timezone`.
///
/// Accepts unix timestamps, `now`, RFC 3339 strings, and naive
/// `YYYY-MM-DD[ HH:MM[:SS]]` strings interpreted in `timezone`. An
/// undefined or none value means now.
pub fn format_date(value: &Value, format: &str, timezone: Tz) -> Result<String, Error> {
    let instant = to_datetime(value, timezone)?;
    let local = instant.with_timezone(&timezone);
    let mut out = String::new();
    write!(out, "{}", local.format(format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format '{format}'"),
        )
    })?;
    Ok(out)
}

fn to_datetime(value: &Value, timezone: Tz) -> Result<DateTime<Utc>, Error> {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(Utc::now()),
        ValueKind::Number => {
            let seconds = i64::try_from(value.clone()).or_else(|_| {
                f64::try_from(value.clone()).map(|f| f.trunc() as i64)
            })?;
            Utc.timestamp_opt(seconds, 0)
                .single()
                .ok_or_else(|| invalid_date(&value.to_string()))
        }
        ValueKind::String => {
            let text = value.as_str().unwrap_or_default().trim();
            parse_date_string(text, timezone).ok_or_else(|| invalid_date(text))
        }
        _ => Err(invalid_date(&value.to_string())),
    }
}

fn parse_date_string(text: &str, timezone: Tz) -> Option<DateTime<Utc>> {
    if text.eq_ignore_ascii_case("now") {
        return Some(Utc::now());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn invalid_date(text: &str) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("cannot interpret '{text}' as a date"),
    )
}

/// Format a duration given in seconds.
///
/// Placeholders: `%a`/`%d` days, `%h` hours, `%i` minutes, `%s` seconds,
/// `%R` sign (`+`/`-`), `%r` sign only when negative, `%%` literal percent.
pub fn format_interval(seconds: i64, format: &str) -> String {
    let total = seconds.unsigned_abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('a') | Some('d') => out.push_str(&days.to_string()),
            Some('h') => out.push_str(&hours.to_string()),
            Some('i') => out.push_str(&minutes.to_string()),
            Some('s') => out.push_str(&secs.to_string()),
            Some('R') => out.push(if seconds < 0 { '-' } else { '+' }),
            Some('r') => {
                if seconds < 0 {
                    out.push('-');
                }
            }
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Most fraction digits `format_number` emits
pub const MAX_DECIMALS: u32 = 20;

/// Format `number` with grouped thousands.
///
/// `decimals` is capped at [`MAX_DECIMALS`].
pub fn format_number(number: f64, decimals: u32, decimal_point: &str, thousands: &str) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    let factor = 10f64.powi(decimals as i32);
    let scaled = (number.abs() * factor).round() / factor;
    let rounded = if scaled.is_finite() { scaled } else { number.abs() };
    let fixed = format!("{:.*}", decimals as usize, rounded);
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push_str(thousands);
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if number < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(fraction) = fraction {
        out.push_str(decimal_point);
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;

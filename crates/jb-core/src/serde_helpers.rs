//! Shared serde default functions for the configuration sections.

use crate::config::{CacheSetting, DEFAULT_TEMPLATE_EXTENSION};

pub(crate) fn default_charset() -> String {
    "UTF-8".to_string()
}

pub(crate) fn default_cache() -> CacheSetting {
    CacheSetting::Disabled
}

pub(crate) fn default_optimizations() -> i64 {
    -1
}

pub(crate) fn default_date_format() -> String {
    "%B %-d, %Y %H:%M".to_string()
}

pub(crate) fn default_interval_format() -> String {
    "%d days".to_string()
}

pub(crate) fn default_decimal_point() -> String {
    ".".to_string()
}

pub(crate) fn default_thousands_separator() -> String {
    ",".to_string()
}

pub(crate) fn default_extension() -> String {
    DEFAULT_TEMPLATE_EXTENSION.to_string()
}

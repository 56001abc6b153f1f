//! jb-core - Core library for jinja-bridge
//!
//! This crate provides the typed engine configuration read from
//! `templates.yml`, its validation rules, and the small value types
//! shared by the engine bridge and the `jb` console tool.

pub mod config;
pub mod error;
pub(crate) mod serde_helpers;
pub mod template_path;

pub use config::{
    AutoescapeStrategy, CacheSetting, DateConfig, EngineConfig, EngineOptions, FacadeConfig,
    IsSafe, NumberFormatConfig, PathConfig, CONFIG_FILE_NAME, DEFAULT_CONFIG_YAML,
    DEFAULT_TEMPLATE_EXTENSION,
};
pub use error::{CoreError, CoreResult};
pub use template_path::{TemplatePath, MAIN_NAMESPACE};

//! Configuration types and parsing for templates.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::{
    default_cache, default_charset, default_date_format, default_decimal_point,
    default_extension, default_interval_format, default_optimizations,
    default_thousands_separator,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "templates.yml";

/// File extension appended to template names that carry none.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "html.jinja";

/// Distribution configuration written by `jb template:publish`.
pub const DEFAULT_CONFIG_YAML: &str = r#"# jinja-bridge engine configuration
options:
  debug: false
  charset: UTF-8
  strict_variables: false
  autoescape: html
  # false, or a directory path for the template cache
  cache: false
  # defaults to the value of `debug` when left empty
  auto_reload: ~
  optimizations: -1

date:
  timezone: ~
  format: "%B %-d, %Y %H:%M"
  interval_format: "%d days"

number_format:
  decimals: 0
  decimal_point: "."
  thousands_separator: ","

paths: []
globals: {}
functions: {}
filters: {}
extensions: []
facades: {}
lexer: {}
"#;

/// Validated engine configuration.
///
/// Built once at bootstrap and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// General engine options
    #[serde(default)]
    pub options: EngineOptions,

    /// Date formatting settings used by the `date` and `interval` filters
    #[serde(default)]
    pub date: DateConfig,

    /// Number formatting settings used by the `number_format` filter
    #[serde(default)]
    pub number_format: NumberFormatConfig,

    /// Template search directories registered at boot
    #[serde(default)]
    pub paths: Vec<PathConfig>,

    /// Global variables available in every template
    #[serde(default)]
    pub globals: BTreeMap<String, serde_yaml::Value>,

    /// Custom functions: name → callable specification
    #[serde(default)]
    pub functions: BTreeMap<String, serde_yaml::Value>,

    /// Custom filters: name → callable specification
    #[serde(default)]
    pub filters: BTreeMap<String, serde_yaml::Value>,

    /// Extension service identifiers resolved through the container
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Static classes exposed as template globals
    #[serde(default)]
    pub facades: BTreeMap<String, FacadeConfig>,

    /// Raw lexer token overrides
    #[serde(default)]
    pub lexer: BTreeMap<String, serde_yaml::Value>,

    /// Default template file extension
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// General engine options (`options:` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineOptions {
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_charset")]
    pub charset: String,

    /// Fail on undefined variables instead of rendering them empty
    #[serde(default)]
    pub strict_variables: bool,

    #[serde(default)]
    pub autoescape: AutoescapeStrategy,

    #[serde(default = "default_cache")]
    pub cache: CacheSetting,

    /// Re-validate cached templates against their sources.
    /// Falls back to `debug` when unset.
    #[serde(default)]
    pub auto_reload: Option<bool>,

    #[serde(default = "default_optimizations")]
    pub optimizations: i64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debug: false,
            charset: default_charset(),
            strict_variables: false,
            autoescape: AutoescapeStrategy::default(),
            cache: default_cache(),
            auto_reload: None,
            optimizations: default_optimizations(),
        }
    }
}

impl EngineOptions {
    /// Effective auto-reload flag
    pub fn auto_reload(&self) -> bool {
        self.auto_reload.unwrap_or(self.debug)
    }
}

/// Escaping strategy applied to rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "serde_yaml::Value", into = "serde_yaml::Value")]
pub enum AutoescapeStrategy {
    #[default]
    Html,
    Json,
    /// Pick the strategy from the template file extension
    Name,
    None,
}

impl TryFrom<serde_yaml::Value> for AutoescapeStrategy {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        match &value {
            serde_yaml::Value::Bool(false) | serde_yaml::Value::Null => Ok(Self::None),
            serde_yaml::Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "html" => Ok(Self::Html),
                "json" => Ok(Self::Json),
                "name" => Ok(Self::Name),
                "none" | "false" => Ok(Self::None),
                other => Err(format!(
                    "unknown autoescape strategy '{other}'. Valid values: html, json, name, false"
                )),
            },
            other => Err(format!(
                "autoescape must be a strategy name or false, got {}",
                describe_yaml(other)
            )),
        }
    }
}

impl From<AutoescapeStrategy> for serde_yaml::Value {
    fn from(strategy: AutoescapeStrategy) -> Self {
        match strategy {
            AutoescapeStrategy::Html => serde_yaml::Value::from("html"),
            AutoescapeStrategy::Json => serde_yaml::Value::from("json"),
            AutoescapeStrategy::Name => serde_yaml::Value::from("name"),
            AutoescapeStrategy::None => serde_yaml::Value::Bool(false),
        }
    }
}

/// Cache option as it can be written in the configuration file.
///
/// A custom cache handle is the third accepted state; it is supplied in
/// code when building the engine, never from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_yaml::Value", into = "serde_yaml::Value")]
pub enum CacheSetting {
    Disabled,
    Directory(PathBuf),
}

impl TryFrom<serde_yaml::Value> for CacheSetting {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        match value {
            serde_yaml::Value::Bool(false) | serde_yaml::Value::Null => Ok(Self::Disabled),
            serde_yaml::Value::String(path) if !path.trim().is_empty() => {
                Ok(Self::Directory(PathBuf::from(path)))
            }
            other => Err(format!(
                "cache must be false or a directory path, got {}",
                describe_yaml(&other)
            )),
        }
    }
}

impl From<CacheSetting> for serde_yaml::Value {
    fn from(setting: CacheSetting) -> Self {
        match setting {
            CacheSetting::Disabled => serde_yaml::Value::Bool(false),
            CacheSetting::Directory(path) => {
                serde_yaml::Value::String(path.to_string_lossy().into_owned())
            }
        }
    }
}

/// Date settings (`date:` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateConfig {
    /// IANA timezone name. `None` selects the process default.
    #[serde(default)]
    pub timezone: Option<String>,

    /// strftime-style format used by the `date` filter
    #[serde(default = "default_date_format")]
    pub format: String,

    /// Format used by the `interval` filter
    #[serde(default = "default_interval_format")]
    pub interval_format: String,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            format: default_date_format(),
            interval_format: default_interval_format(),
        }
    }
}

/// Number settings (`number_format:` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumberFormatConfig {
    #[serde(default)]
    pub decimals: u32,

    #[serde(default = "default_decimal_point")]
    pub decimal_point: String,

    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: String,
}

impl Default for NumberFormatConfig {
    fn default() -> Self {
        Self {
            decimals: 0,
            decimal_point: default_decimal_point(),
            thousands_separator: default_thousands_separator(),
        }
    }
}

/// A search directory with an optional namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    pub path: PathBuf,

    #[serde(default)]
    pub namespace: Option<String>,
}

/// A static class exposed as a template global
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacadeConfig {
    /// Registered static class name
    pub class: String,

    /// Methods whose string results skip escaping
    #[serde(default)]
    pub is_safe: IsSafe,

    /// Output charset of safe results. Defaults to `options.charset`.
    #[serde(default)]
    pub charset: Option<String>,
}

/// Safe-marking setting of a facade: every method, or a named subset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IsSafe {
    All(bool),
    Methods(Vec<String>),
}

impl Default for IsSafe {
    fn default() -> Self {
        IsSafe::All(false)
    }
}

impl IsSafe {
    /// Whether results of `method` are marked safe
    pub fn covers(&self, method: &str) -> bool {
        match self {
            IsSafe::All(all) => *all,
            IsSafe::Methods(methods) => methods.iter().any(|m| m == method),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            options: EngineOptions::default(),
            date: DateConfig::default(),
            number_format: NumberFormatConfig::default(),
            paths: Vec::new(),
            globals: BTreeMap::new(),
            functions: BTreeMap::new(),
            filters: BTreeMap::new(),
            extensions: Vec::new(),
            facades: BTreeMap::new(),
            lexer: BTreeMap::new(),
            extension: default_extension(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load `templates.yml` from a project directory.
    ///
    /// A missing file yields the default configuration.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!(
                "No {} in {}, using default configuration",
                CONFIG_FILE_NAME,
                dir.display()
            );
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let config: EngineConfig = if content.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate values the schema alone cannot express
    pub fn validate(&self) -> CoreResult<()> {
        if !is_utf8_label(&self.options.charset) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "Unsupported charset '{}'. Templates are always rendered as UTF-8",
                    self.options.charset
                ),
            });
        }

        if !matches!(self.options.optimizations, -1 | 0) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "optimizations must be -1 (all) or 0 (none), got {}",
                    self.options.optimizations
                ),
            });
        }

        if self.extension.trim().is_empty() || self.extension.starts_with('.') {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "Template extension '{}' must be non-empty and written without a leading dot",
                    self.extension
                ),
            });
        }

        for (name, facade) in &self.facades {
            if facade.class.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Facade '{name}' must name a class"),
                });
            }
            if let Some(charset) = &facade.charset {
                if !is_utf8_label(charset) {
                    return Err(CoreError::ConfigInvalid {
                        message: format!("Facade '{name}' uses unsupported charset '{charset}'"),
                    });
                }
            }
        }

        for path in &self.paths {
            if path.namespace.as_deref().is_some_and(str::is_empty) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "Empty namespace for template path '{}'",
                        path.path.display()
                    ),
                });
            }
        }

        Ok(())
    }

    /// Resolve relative template paths and the cache directory against `root`
    pub fn resolve_paths(&mut self, root: &Path) {
        for entry in &mut self.paths {
            if entry.path.is_relative() {
                entry.path = root.join(&entry.path);
            }
        }
        if let CacheSetting::Directory(dir) = &mut self.options.cache {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
    }
}

fn is_utf8_label(charset: &str) -> bool {
    matches!(charset.to_ascii_lowercase().as_str(), "utf-8" | "utf8")
}

/// Short human-readable description of a YAML value's type
fn describe_yaml(value: &serde_yaml::Value) -> DescribeYaml<'_> {
    DescribeYaml(value)
}

struct DescribeYaml<'a>(&'a serde_yaml::Value);

impl fmt::Display for DescribeYaml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            serde_yaml::Value::Null => write!(f, "null"),
            serde_yaml::Value::Bool(b) => write!(f, "{b}"),
            serde_yaml::Value::Number(n) => write!(f, "number {n}"),
            serde_yaml::Value::String(s) => write!(f, "string '{s}'"),
            serde_yaml::Value::Sequence(_) => write!(f, "a list"),
            serde_yaml::Value::Mapping(_) => write!(f, "a mapping"),
            serde_yaml::Value::Tagged(tagged) => write!(f, "tagged value {}", tagged.tag),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

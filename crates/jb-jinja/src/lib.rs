//! jb-jinja - MiniJinja bridge for jinja-bridge
//!
//! This crate turns an [`jb_core::EngineConfig`] into a configured MiniJinja
//! environment ([`Engine`]) and exposes it to the application through a
//! service [`Container`] and the [`TemplateRenderer`] abstraction.
//!
//! - [`EngineFactory`] maps configuration onto the engine: options, date
//!   and number formats, lexer syntax, facades, globals, extensions, and
//!   custom functions/filters.
//! - [`JinjaRenderer`] normalizes template names (`ns::page` →
//!   `@ns/page.html.jinja`) and renders them with default attributes.
//! - [`provider::register_services`] binds both into the container and
//!   boots the container, routing and debug extensions.

pub mod cache;
pub mod callable;
pub mod container;
pub mod engine;
pub mod error;
pub mod extension;
pub mod extensions;
pub mod facade;
pub mod factory;
pub mod format;
pub mod lexer;
pub mod loader;
pub mod provider;
pub mod renderer;
pub mod values;

pub use cache::{CacheTarget, FilesystemCache, TemplateCache};
pub use callable::{
    CallableOptions, CallableRegistry, CallableSpec, Param, TemplateFilter, TemplateFunction,
    TemplateTest,
};
pub use container::{Container, ContainerError};
pub use engine::{Engine, ENGINE_VERSION};
pub use error::{CallableKind, JinjaError, JinjaResult};
pub use extension::Extension;
pub use facade::{ClassRegistry, FacadeProxy, StaticClass};
pub use factory::EngineFactory;
pub use format::{DateSettings, NumberFormat};
pub use lexer::LexerSyntax;
pub use loader::{qualified_name, NamespacedLoader, SharedLoader, TemplateSource};
pub use renderer::{JinjaRenderer, Params, TemplateRenderer};
pub use values::{describe_value, yaml_to_value};

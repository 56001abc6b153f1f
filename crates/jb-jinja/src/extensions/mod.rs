//! Built-in extensions

pub mod container;
pub mod core;
pub mod debug;
pub mod routing;

pub use self::container::ContainerExtension;
pub use self::core::CoreExtension;
pub use self::debug::DebugExtension;
pub use self::routing::{RequestContext, RoutingExtension, UrlError, UrlGenerator, UrlParams};

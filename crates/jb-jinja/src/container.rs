//! Minimal service container shared by the engine factory and extensions.
//!
//! Services are stored under string identifiers as type-erased singletons.
//! Lookups downcast to the requested type and report the stored type name
//! on mismatch so that configuration errors can name what was found.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Container lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("Service '{id}' is not registered")]
    NotFound { id: String },

    #[error("Service '{id}' is a {actual}, expected {expected}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },
}

struct Entry {
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync>,
}

/// Singleton registry keyed by service identifier
#[derive(Default)]
pub struct Container {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map()
            .entries(entries.iter().map(|(id, entry)| (id, entry.type_name)))
            .finish()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `id`, replacing any previous binding
    pub fn singleton<T: Any + Send + Sync>(&self, id: impl Into<String>, service: T) {
        let id = id.into();
        log::debug!("Container: binding '{}' to {}", id, type_name::<T>());
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Entry {
                    type_name: type_name::<T>(),
                    instance: Arc::new(service),
                },
            );
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Fetch a clone of the service bound to `id`
    pub fn get<T: Any + Send + Sync + Clone>(&self, id: &str) -> Result<T, ContainerError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(id).ok_or_else(|| ContainerError::NotFound {
            id: id.to_string(),
        })?;
        entry
            .instance
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ContainerError::TypeMismatch {
                id: id.to_string(),
                expected: type_name::<T>(),
                actual: entry.type_name,
            })
    }

    /// Type name of the service bound to `id`
    pub fn type_name_of(&self, id: &str) -> Option<&'static str> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|entry| entry.type_name)
    }

    /// Registered identifiers in sorted order
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

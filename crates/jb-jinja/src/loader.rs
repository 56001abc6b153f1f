//! Namespaced filesystem loader.
//!
//! Template names take two forms: `path/to/page.html.jinja` in the main
//! namespace, and `@admin/path/to/page.html.jinja` in the `admin`
//! namespace. Each namespace holds an ordered list of directories; the
//! first directory containing the file wins.

use crate::cache::TemplateCache;
use crate::error::{JinjaError, JinjaResult};
use jb_core::MAIN_NAMESPACE;
use minijinja::{Error, ErrorKind};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Loader shared between the engine and the renderer
pub type SharedLoader = Arc<RwLock<NamespacedLoader>>;

/// A template's source text and origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub name: String,
    pub code: String,
    pub path: PathBuf,
}

/// Namespace → directories registry
#[derive(Debug, Default, Clone)]
pub struct NamespacedLoader {
    namespaces: Vec<(String, Vec<PathBuf>)>,
}

impl NamespacedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the directories of `namespace`
    pub fn add_path(&mut self, path: impl AsRef<Path>, namespace: &str) -> JinjaResult<()> {
        let path = checked_dir(path.as_ref())?;
        validate_namespace(namespace)?;
        self.entry(namespace).push(path);
        Ok(())
    }

    /// Insert `path` before the existing directories of `namespace`
    pub fn prepend_path(&mut self, path: impl AsRef<Path>, namespace: &str) -> JinjaResult<()> {
        let path = checked_dir(path.as_ref())?;
        validate_namespace(namespace)?;
        self.entry(namespace).insert(0, path);
        Ok(())
    }

    /// Namespaces in registration order
    pub fn namespaces(&self) -> Vec<&str> {
        self.namespaces.iter().map(|(ns, _)| ns.as_str()).collect()
    }

    /// Directories registered for `namespace`
    pub fn paths(&self, namespace: &str) -> &[PathBuf] {
        self.namespaces
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve `name` to an existing file
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let (namespace, relative) = split_name(name)?;
        if !is_contained(relative) {
            log::debug!("Rejecting template name escaping its namespace: {name}");
            return None;
        }
        self.paths(namespace)
            .iter()
            .map(|dir| dir.join(relative))
            .find(|candidate| candidate.is_file())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Read the source of `name`. `Ok(None)` when it cannot be resolved.
    pub fn source(&self, name: &str) -> JinjaResult<Option<TemplateSource>> {
        let Some(path) = self.find(name) else {
            return Ok(None);
        };
        let code = fs::read_to_string(&path).map_err(|e| JinjaError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(TemplateSource {
            name: name.to_string(),
            code,
            path,
        }))
    }

    fn entry(&mut self, namespace: &str) -> &mut Vec<PathBuf> {
        let index = match self.namespaces.iter().position(|(ns, _)| ns == namespace) {
            Some(index) => index,
            None => {
                self.namespaces.push((namespace.to_string(), Vec::new()));
                self.namespaces.len() - 1
            }
        };
        &mut self.namespaces[index].1
    }
}

/// Template name for `relative` inside `namespace`
pub fn qualified_name(namespace: &str, relative: &str) -> String {
    if namespace == MAIN_NAMESPACE {
        relative.to_string()
    } else {
        format!("@{namespace}/{relative}")
    }
}

fn checked_dir(path: &Path) -> JinjaResult<PathBuf> {
    if !path.is_dir() {
        return Err(JinjaError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(path.to_path_buf())
}

fn validate_namespace(namespace: &str) -> JinjaResult<()> {
    if namespace.is_empty() || namespace.contains(['/', '\\', '@']) {
        return Err(JinjaError::InvalidNamespace {
            namespace: namespace.to_string(),
        });
    }
    Ok(())
}

/// Split `@ns/rest` into (`ns`, `rest`); plain names go to the main namespace
fn split_name(name: &str) -> Option<(&str, &str)> {
    let name = name.trim_start_matches('/');
    match name.strip_prefix('@') {
        Some(rest) => {
            let (namespace, relative) = rest.split_once('/')?;
            if namespace.is_empty() || relative.is_empty() {
                return None;
            }
            Some((namespace, relative))
        }
        None if name.is_empty() => None,
        None => Some((MAIN_NAMESPACE, name)),
    }
}

/// Whether `relative` stays inside its base directory
fn is_contained(relative: &str) -> bool {
    let mut depth: usize = 0;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

/// Loader installed on the MiniJinja environment.
///
/// Resolves names through the shared [`NamespacedLoader`] and keeps the
/// template cache in sync with the sources it reads.
#[derive(Clone)]
pub(crate) struct CachingLoader {
    pub(crate) loader: SharedLoader,
    pub(crate) cache: Option<Arc<dyn TemplateCache>>,
    pub(crate) auto_reload: bool,
}

impl CachingLoader {
    pub(crate) fn load(&self, name: &str) -> Result<Option<String>, Error> {
        let path = {
            let loader = self.loader.read().unwrap_or_else(PoisonError::into_inner);
            loader.find(name)
        };
        let Some(path) = path else {
            return Ok(None);
        };

        let key = self
            .cache
            .as_ref()
            .map(|cache| cache.generate_key(name, &path));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(cached_at) = cache.timestamp(key) {
                let fresh = !self.auto_reload
                    || fs::metadata(&path)
                        .and_then(|m| m.modified())
                        .map_or(true, |modified| cached_at >= modified);
                if fresh {
                    if let Some(code) = cache.load(key) {
                        return Ok(Some(code));
                    }
                }
            }
        }

        let code = fs::read_to_string(&path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template '{}': {}", path.display(), e),
            )
            .with_source(e)
        })?;

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Err(e) = cache.write(key, &code) {
                log::warn!("Failed to write template cache entry for '{name}': {e}");
            }
        }

        Ok(Some(code))
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;

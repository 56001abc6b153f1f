//! Template source cache consulted by the loader.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Storage backend for loaded template sources.
///
/// Keys come from [`TemplateCache::generate_key`]; the loader compares
/// [`TemplateCache::timestamp`] with the source file's modification time
/// when auto-reload is enabled.
pub trait TemplateCache: Send + Sync + fmt::Debug {
    /// Cache key for the template `name` loaded from `source_path`
    fn generate_key(&self, name: &str, source_path: &Path) -> String;

    /// Cached content for `key`, if any
    fn load(&self, key: &str) -> Option<String>;

    /// Store `content` under `key`
    fn write(&self, key: &str, content: &str) -> io::Result<()>;

    /// Time the entry for `key` was last written
    fn timestamp(&self, key: &str) -> Option<SystemTime>;
}

/// Cache entries stored as files under a directory.
///
/// Layout: `<directory>/<first two hex digits>/<sha256>.cache`
#[derive(Debug, Clone)]
pub struct FilesystemCache {
    directory: PathBuf,
}

impl FilesystemCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl TemplateCache for FilesystemCache {
    fn generate_key(&self, name: &str, source_path: &Path) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(source_path.to_string_lossy().as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        self.directory
            .join(&hash[..2])
            .join(format!("{hash}.cache"))
            .to_string_lossy()
            .into_owned()
    }

    fn load(&self, key: &str) -> Option<String> {
        fs::read_to_string(key).ok()
    }

    fn write(&self, key: &str, content: &str) -> io::Result<()> {
        let path = Path::new(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write then rename so readers never observe a partial entry.
        let tmp = path.with_extension(format!("tmp{}", std::process::id()));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)
    }

    fn timestamp(&self, key: &str) -> Option<SystemTime> {
        fs::metadata(key).and_then(|m| m.modified()).ok()
    }
}

/// Cache target of an engine: disabled, a directory, or a custom backend
#[derive(Clone, Default)]
pub enum CacheTarget {
    #[default]
    Disabled,
    Directory(PathBuf),
    Custom(Arc<dyn TemplateCache>),
}

impl CacheTarget {
    /// Directory path when the cache is path-based
    pub fn directory(&self) -> Option<&Path> {
        match self {
            CacheTarget::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    /// Backend used by the loader, `None` when disabled
    pub fn backend(&self) -> Option<Arc<dyn TemplateCache>> {
        match self {
            CacheTarget::Disabled => None,
            CacheTarget::Directory(dir) => Some(Arc::new(FilesystemCache::new(dir.clone()))),
            CacheTarget::Custom(cache) => Some(Arc::clone(cache)),
        }
    }
}

impl fmt::Debug for CacheTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTarget::Disabled => write!(f, "Disabled"),
            CacheTarget::Directory(dir) => f.debug_tuple("Directory").field(dir).finish(),
            CacheTarget::Custom(cache) => f.debug_tuple("Custom").field(cache).finish(),
        }
    }
}

impl From<&jb_core::CacheSetting> for CacheTarget {
    fn from(setting: &jb_core::CacheSetting) -> Self {
        match setting {
            jb_core::CacheSetting::Disabled => CacheTarget::Disabled,
            jb_core::CacheSetting::Directory(dir) => CacheTarget::Directory(dir.clone()),
        }
    }
}

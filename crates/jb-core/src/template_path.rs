//! Search directory value object returned when enumerating loader paths.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the namespace used when a path is added without one.
pub const MAIN_NAMESPACE: &str = "__main__";

/// A template search directory paired with an optional namespace label.
///
/// The main namespace is never reported: paths registered without a
/// namespace carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatePath {
    path: PathBuf,
    namespace: Option<String>,
}

impl TemplatePath {
    pub fn new(path: impl Into<PathBuf>, namespace: Option<String>) -> Self {
        Self {
            path: path.into(),
            namespace,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_path_accessors() {
        let path = TemplatePath::new("/views/admin", Some("admin".to_string()));
        assert_eq!(path.path(), Path::new("/views/admin"));
        assert_eq!(path.namespace(), Some("admin"));
        assert_eq!(path.to_string(), "/views/admin");
    }

    #[test]
    fn test_template_path_without_namespace() {
        let path = TemplatePath::new("/views", None);
        assert_eq!(path.namespace(), None);
    }
}

//! Error types for jb-jinja

use thiserror::Error;

/// Engine construction and rendering errors
#[derive(Error, Debug)]
pub enum JinjaError {
    /// Template render or compile error (J001)
    #[error("[J001] Jinja render error: {0}")]
    RenderError(#[from] minijinja::Error),

    /// Configuration rejected at engine construction (J002)
    #[error("[J002] {0}")]
    Config(#[from] jb_core::CoreError),

    /// Unknown timezone name (J003)
    #[error("[J003] Invalid timezone '{timezone}'. Use an IANA name such as 'Europe/Paris'")]
    InvalidTimezone { timezone: String },

    /// Extension identifier not registered in the container (J004)
    #[error("[J004] Template extension '{id}' is not registered in the container")]
    UnknownExtension { id: String },

    /// Container entry does not provide the extension capability (J005)
    #[error("[J005] Template extension must implement {expected}; \"{given}\" given for '{id}'")]
    InvalidExtension {
        id: String,
        expected: &'static str,
        given: String,
    },

    /// Function or filter entry matches none of the accepted shapes (J006)
    #[error("[J006] Incorrect options for {kind} \"{name}\"")]
    InvalidCallable { kind: CallableKind, name: String },

    /// Lexer override rejected (J007)
    #[error("[J007] Invalid lexer option: {message}")]
    InvalidLexer { message: String },

    /// Template directory does not exist (J008)
    #[error("[J008] The \"{path}\" directory does not exist")]
    DirectoryNotFound { path: String },

    /// Invalid namespace name (J009)
    #[error("[J009] Invalid template namespace '{namespace}'")]
    InvalidNamespace { namespace: String },

    /// Container lookup failure (J010)
    #[error("[J010] {0}")]
    Container(#[from] crate::container::ContainerError),

    /// IO error with path context
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;

/// Kind of callable being registered, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Filter,
}

impl std::fmt::Display for CallableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallableKind::Function => write!(f, "Function"),
            CallableKind::Filter => write!(f, "Filter"),
        }
    }
}

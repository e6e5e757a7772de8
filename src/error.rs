//! Error types for graph construction and queries
//!
//! `KustomError` covers everything the library can report to a caller.
//! `ReferenceError` is the classified failure of a single reference entry;
//! it never escapes the resolver, it is only logged at its severity.

use std::fmt;
use std::path::{Path, PathBuf};

/// How loudly a failed reference entry is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Suspicious but expected in real trees (missing optional field, ambiguous directory)
    Warning,
    /// A referenced file genuinely cannot be used (missing file, self reference)
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single malformed or unresolvable reference entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ReferenceError {
    pub message: String,
    pub path: PathBuf,
    pub severity: Severity,
}

impl ReferenceError {
    /// Warning-level reference problem
    pub fn warning(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            severity: Severity::Warning,
        }
    }

    /// Error-level reference problem
    pub fn error(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            severity: Severity::Error,
        }
    }

    /// Reference problem with no file context (non-string or multiline values)
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::warning(message, "invalid")
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// File name of the offending path, used in diagnostics
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Errors surfaced by the library
#[derive(Debug, thiserror::Error)]
pub enum KustomError {
    #[error("Path {} does not resolve to a valid Kustomization", .0.display())]
    NotAnApp(PathBuf),

    #[error("File with path {} is not referenced by any app", .0.display())]
    UnreferencedFile(PathBuf),

    #[error("File {} has invalid Kustomize content", .0.display())]
    InvalidContent(PathBuf),

    #[error("File not found or is not a regular file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Apps directory not found or is not a directory: {}", .0.display())]
    InvalidAppsDir(PathBuf),

    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KustomError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        KustomError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path the error refers to
    pub fn path(&self) -> &Path {
        match self {
            KustomError::NotAnApp(path)
            | KustomError::UnreferencedFile(path)
            | KustomError::InvalidContent(path)
            | KustomError::FileNotFound(path)
            | KustomError::InvalidAppsDir(path) => path,
            KustomError::InvalidReference(err) => &err.path,
            KustomError::Io { path, .. } => path,
        }
    }
}

/// Result type for library operations
pub type KustomResult<T> = Result<T, KustomError>;

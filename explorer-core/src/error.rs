//! src/error.rs
//! ============================================================================
//! # `ExplorerError`: Unified Error Type for the View-Sync Core
//!
//! Every navigation and tree operation returns `CoreResult<T>`. None of these
//! failures is fatal: the caller keeps its last-known-good state and may retry
//! by navigating again.

use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use thiserror::Error;

/// Convenient alias carrying the unified error type
pub type CoreResult<T> = Result<T, ExplorerError>;

/// Unified error type for fork navigation and view synchronization.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Navigated path no longer exists on disk.
    #[error("File or directory not found: {0:?}")]
    NotFound(PathBuf),

    /// Directory listing was denied by the OS.
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// Directory listing failed for any other reason.
    #[error("Failed to enumerate {path:?}: {source}")]
    EnumerationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A fork reference outlived the tree it was issued from.
    #[error("Stale fork reference {path:?} (generation {generation})")]
    StaleReference { path: PathBuf, generation: u64 },

    /// Expansion requested on something that cannot hold children.
    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    /// A request was posted after the dispatch loop stopped.
    #[error("Dispatcher is no longer running")]
    DispatcherClosed,
}

impl ExplorerError {
    /// Classify an I/O failure raised while resolving a path.
    pub fn from_resolve<P: Into<PathBuf>>(path: P, err: &io::Error) -> Self {
        let path = path.into();

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(path),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            kind => Self::EnumerationFailed {
                path,
                source: io::Error::new(kind, err.to_string()),
            },
        }
    }

    /// Classify an I/O failure raised while listing a directory.
    pub fn from_enumeration<P: Into<PathBuf>>(path: P, err: io::Error) -> Self {
        let path = path.into();

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(path),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::EnumerationFailed { path, source: err },
        }
    }

    /// Create a stale reference error
    pub fn stale<P: Into<PathBuf>>(path: P, generation: u64) -> Self {
        Self::StaleReference {
            path: path.into(),
            generation,
        }
    }

    /// True for failures that happen while reading a directory's contents.
    #[must_use]
    pub const fn is_enumeration_failure(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::EnumerationFailed { .. }
        )
    }
}

// Manual Clone implementation to handle the io::Error source
impl Clone for ExplorerError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound(path) => Self::NotFound(path.clone()),
            Self::PermissionDenied(path) => Self::PermissionDenied(path.clone()),
            Self::EnumerationFailed { path, source } => Self::EnumerationFailed {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::StaleReference { path, generation } => Self::StaleReference {
                path: path.clone(),
                generation: *generation,
            },
            Self::NotADirectory(path) => Self::NotADirectory(path.clone()),
            Self::DispatcherClosed => Self::DispatcherClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kinds_are_classified() {
        let missing = io::Error::new(ErrorKind::NotFound, "gone");
        assert!(matches!(
            ExplorerError::from_enumeration("/a", missing),
            ExplorerError::NotFound(_)
        ));

        let denied = io::Error::new(ErrorKind::PermissionDenied, "nope");
        let err = ExplorerError::from_enumeration("/a", denied);
        assert!(err.is_enumeration_failure());

        let other = io::Error::other("boom");
        let err = ExplorerError::from_resolve("/a", &other);
        assert!(matches!(err, ExplorerError::EnumerationFailed { .. }));
        assert!(matches!(err.clone(), ExplorerError::EnumerationFailed { .. }));
    }
}

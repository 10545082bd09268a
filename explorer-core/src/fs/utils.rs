//! src/fs/utils.rs
//! ============================================================================
//! # Path normalization shared by the fork tree and the cell cache
//!
//! Both sides must agree on one key per listed entry, otherwise a symlinked
//! or differently-cased path desynchronizes model and cells. Symlinks are
//! never resolved: a link and its target are two rows with two keys.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Purely lexical cleanup: drops `.` and folds `..` without touching disk.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Absolute, lexically normalized form of a path that must exist.
///
/// Symlinks are not resolved so that a fork reached through a link keeps
/// the path it is listed under in its parent.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let resolved = lexical_normalize(&std::path::absolute(path)?);
    std::fs::symlink_metadata(&resolved)?;
    Ok(resolved)
}

/// Key under which a path is indexed by in-memory maps.
///
/// Same normalization as [`resolve_path`] minus the existence check, so
/// entries for vanished paths can still be evicted.
#[must_use]
pub fn cache_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    fold_case(lexical_normalize(&absolute))
}

#[cfg(any(windows, target_os = "macos"))]
fn fold_case(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(any(windows, target_os = "macos")))]
const fn fold_case(path: PathBuf) -> PathBuf {
    path
}

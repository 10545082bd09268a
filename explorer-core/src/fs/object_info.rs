//! src/fs/object_info.rs
//! ============================================================
//! Lightweight filesystem descriptors for fork payloads.
//!
//! One `symlink_metadata` call per entry; symlinks are additionally
//! followed once so that a link to a directory can be expanded.

use std::sync::Arc;

use std::path::{Path, PathBuf};

use std::ffi::OsStr;

use std::fs::{self, FileType, Metadata};

use compact_str::CompactString;

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------
// ObjectType: file, directory or symlink.
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    Dir,
    File,
    Symlink,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dir => write!(f, "Dir"),
            Self::File => write!(f, "File"),
            Self::Symlink => write!(f, "Symlink"),
        }
    }
}

// ------------------------------------------------------------
// ObjectInfo: what a fork knows about its path.
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    // Shared absolute path
    pub path: Arc<PathBuf>,

    // File or directory name, rendering hot path
    pub name: CompactString,

    // Lower-case extension (files only)
    pub extension: Option<CompactString>,

    // Expandable (directory, or symlink resolving to one)
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ObjectInfo {
    #[inline]
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        if self.is_dir {
            ObjectType::Dir
        } else if self.is_symlink {
            ObjectType::Symlink
        } else {
            ObjectType::File
        }
    }

    /// Build from a path that is expected to exist.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta: Metadata = fs::symlink_metadata(path)?;

        Ok(Self::from_meta(path, &meta))
    }

    pub(crate) fn from_meta(path: &Path, meta: &Metadata) -> Self {
        let ftype: FileType = meta.file_type();
        let is_symlink: bool = ftype.is_symlink();

        // Follow the link once; a dangling link is simply not expandable.
        let is_dir: bool = if is_symlink {
            fs::metadata(path).is_ok_and(|m: Metadata| -> bool { m.is_dir() })
        } else {
            ftype.is_dir()
        };

        // Root paths ("/") have no file name; fall back to the whole path.
        let name = path.file_name().and_then(OsStr::to_str).map_or_else(
            || CompactString::new(path.to_string_lossy()),
            CompactString::new,
        );

        let extension = if ftype.is_file() {
            path.extension()
                .and_then(OsStr::to_str)
                .map(|s: &str| -> CompactString { CompactString::new(s.to_lowercase()) })
        } else {
            None
        };

        Self {
            path: Arc::new(path.to_path_buf()),
            name,
            extension,
            is_dir,
            is_symlink,
        }
    }
}

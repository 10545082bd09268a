//! src/model/fork.rs
//! ============================================================================
//! # Fork: one node of the navigable hierarchy
//!
//! A fork owns its payload (`ObjectInfo`) and the ids of its children. The
//! child list is only meaningful while the fork is expanded; otherwise it is
//! reported as unknown.

use std::{fmt, path::Path, sync::Arc};

use std::path::PathBuf;

use crate::fs::object_info::{ObjectInfo, ObjectType};

/// Arena index of a fork inside one tree generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForkId(pub usize);

impl fmt::Display for ForkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fork({})", self.0)
    }
}

/// Lazy-loading lifecycle of a fork's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

/// Handle to a fork as carried by view events.
///
/// The generation pins the handle to the tree it was issued from; once the
/// root is replaced every older handle resolves as stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForkRef {
    pub id: ForkId,
    pub generation: u64,
    pub path: Arc<PathBuf>,
}

impl ForkRef {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone)]
pub struct Fork {
    pub id: ForkId,
    pub info: ObjectInfo,
    pub parent: Option<ForkId>,
    pub(crate) children: Vec<ForkId>,
    pub(crate) expanded: bool,
    pub(crate) state: LoadState,
}

impl Fork {
    #[must_use]
    pub const fn new(id: ForkId, info: ObjectInfo, parent: Option<ForkId>) -> Self {
        Self {
            id,
            info,
            parent,
            children: Vec::new(),
            expanded: false,
            state: LoadState::Unloaded,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.info.path
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.info.is_dir
    }

    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        self.info.object_type()
    }

    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub const fn load_state(&self) -> LoadState {
        self.state
    }

    /// Children in listing order, or `None` while collapsed (unknown, not empty).
    #[must_use]
    pub fn children(&self) -> Option<&[ForkId]> {
        self.expanded.then_some(self.children.as_slice())
    }
}

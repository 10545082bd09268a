//! src/view/cell_cache.rs
//! ============================================================================
//! # Cell Cache: path → live visual cell
//!
//! Index from a filesystem path to the cell currently rendering it, used to
//! refresh a single row in place. The rendering layer owns the cells; the
//! cache only holds weak references and revalidates them on every access.
//! A miss is a normal outcome, not an error.

use std::{
    path::{Path, PathBuf},
    rc::{Rc, Weak},
};

use ahash::AHashMap;
use tracing::trace;

use crate::fs::utils::cache_key;

pub struct CellCache<C> {
    cells: AHashMap<PathBuf, Weak<C>>,
}

impl<C> CellCache<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: AHashMap::new(),
        }
    }

    /// Record that `cell` now renders `path`, replacing any previous cell.
    pub fn realize(&mut self, path: &Path, cell: &Rc<C>) {
        self.cells.insert(cache_key(path), Rc::downgrade(cell));
    }

    /// Live cell for `path`, if one is realized.
    pub fn lookup(&mut self, path: &Path) -> Option<Rc<C>> {
        let key = cache_key(path);
        let cell = self.cells.get(&key).and_then(Weak::upgrade);

        if cell.is_none() && self.cells.remove(&key).is_some() {
            trace!(path = %path.display(), "Evicted recycled cell");
        }

        cell
    }

    /// Forget the cell for `path` (the widget recycled it).
    pub fn evict(&mut self, path: &Path) -> bool {
        self.cells.remove(&cache_key(path)).is_some()
    }

    /// Drop every entry whose cell has been destroyed.
    pub fn prune(&mut self) {
        self.cells.retain(|_, cell| cell.strong_count() > 0);
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C> Default for CellCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

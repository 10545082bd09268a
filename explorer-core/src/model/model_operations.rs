//! src/model/model_operations.rs
//! ============================================================================
//! # `ModelOperations`: the only writer of fork state
//!
//! Panels express navigation intents here. Every successful intent mutates
//! the fork tree and then broadcasts exactly one event through the shared
//! observer registry. Failed intents broadcast nothing and leave the tree as
//! it was, so observers keep their last-known-good state.
//!
//! All borrows of the tree are released before broadcasting; observers may
//! call back into these operations from `receive_event`.

use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, info, instrument, warn};

use crate::{
    config::ScanConfig,
    error::{CoreResult, ExplorerError},
    fs::{
        dir_scanner::{is_hidden, scan_dir},
        object_info::ObjectInfo,
        utils,
    },
    model::{
        fork::{Fork, ForkId, ForkRef, LoadState},
        fork_tree::ForkTree,
    },
    view::{event::ViewEvent, observer::ObserverRegistry},
};

/// Lists the children of one directory.
type ScanFn = fn(&Path, &ScanConfig) -> CoreResult<Vec<ObjectInfo>>;

pub struct ModelOperations {
    tree: RefCell<Option<ForkTree>>,
    current: RefCell<Option<ForkRef>>,
    generation: Cell<u64>,
    scan: ScanConfig,
    scan_fn: ScanFn,
    bus: Rc<ObserverRegistry>,
}

impl ModelOperations {
    #[must_use]
    pub fn new(scan: ScanConfig, bus: Rc<ObserverRegistry>) -> Self {
        Self {
            tree: RefCell::new(None),
            current: RefCell::new(None),
            generation: Cell::new(0),
            scan,
            scan_fn: scan_dir,
            bus,
        }
    }

    #[cfg(test)]
    fn with_scanner(mut self, scan_fn: ScanFn) -> Self {
        self.scan_fn = scan_fn;
        self
    }

    // ------------------------------------------------------------------
    // Navigation intents
    // ------------------------------------------------------------------

    /// Navigate to `path`.
    ///
    /// A path outside the current tree (or the first navigation) re-roots the
    /// tree and broadcasts `ForkChanged`. A path inside it is expanded in
    /// place, together with any collapsed ancestors, and broadcasts
    /// `StateChanged`.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn load_fork(&self, path: &Path) -> CoreResult<ForkRef> {
        let path = Self::resolve(path)?;

        let in_tree = self
            .tree
            .borrow()
            .as_ref()
            .is_some_and(|tree: &ForkTree| tree.contains_path(&path));

        if in_tree {
            let fork = self.open_within(&path)?;
            Ok(self.publish(ViewEvent::StateChanged, fork))
        } else {
            let fork = self.replace_root(&path)?;
            Ok(self.publish(ViewEvent::ForkChanged, fork))
        }
    }

    /// Expand a fork that belongs to the current tree.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn expand(&self, path: &Path) -> CoreResult<ForkRef> {
        let path = Self::resolve(path)?;

        if !self.contains_path(&path) {
            return Err(ExplorerError::NotFound(path));
        }

        let fork = self.open_within(&path)?;
        Ok(self.publish(ViewEvent::StateChanged, fork))
    }

    /// Collapse a materialized fork. Its children are kept but reported as
    /// unknown until it is expanded again. Collapsing a collapsed fork is a
    /// silent no-op.
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn collapse(&self, path: &Path) -> CoreResult<ForkRef> {
        let path = utils::lexical_normalize(path);

        let (fork, changed) = {
            let mut guard = self.tree.borrow_mut();
            let tree = guard
                .as_mut()
                .ok_or_else(|| ExplorerError::NotFound(path.clone()))?;
            let id = tree
                .find(&path)
                .ok_or_else(|| ExplorerError::NotFound(path.clone()))?;
            let node = tree.get(id).ok_or_else(|| ExplorerError::NotFound(path.clone()))?;

            if !node.is_dir() {
                return Err(ExplorerError::NotADirectory(path));
            }

            let changed = node.is_expanded();
            tree.set_expanded(id, false);
            (Self::handle(tree, id)?, changed)
        };

        if changed {
            return Ok(self.publish(ViewEvent::StateChanged, fork));
        }
        Ok(fork)
    }

    /// Re-announce a materialized fork whose on-disk state changed (for
    /// example reported by a watcher and marshalled onto this thread).
    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    pub fn notify_changed(&self, path: &Path) -> CoreResult<ForkRef> {
        let path = utils::lexical_normalize(path);

        let fork = {
            let guard = self.tree.borrow();
            let tree = guard
                .as_ref()
                .ok_or_else(|| ExplorerError::NotFound(path.clone()))?;
            let id = tree
                .find(&path)
                .ok_or_else(|| ExplorerError::NotFound(path.clone()))?;
            Self::handle(tree, id)?
        };

        Ok(self.publish(ViewEvent::StateChanged, fork))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[must_use]
    pub fn root(&self) -> Option<ForkRef> {
        self.tree
            .borrow()
            .as_ref()
            .and_then(|tree: &ForkTree| tree.fork_ref(ForkTree::ROOT))
    }

    /// The fork most recently navigated to.
    #[must_use]
    pub fn current(&self) -> Option<ForkRef> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    #[must_use]
    pub fn contains_path(&self, path: &Path) -> bool {
        self.tree
            .borrow()
            .as_ref()
            .is_some_and(|tree: &ForkTree| tree.contains_path(path))
    }

    /// Run `read` against the live fork behind `fork`.
    pub fn with_fork<R>(&self, fork: &ForkRef, read: impl FnOnce(&Fork) -> R) -> CoreResult<R> {
        let guard = self.tree.borrow();
        let tree = guard.as_ref().ok_or_else(|| Self::stale(fork))?;

        tree.resolve(fork).map(read)
    }

    /// Handles for the children of `fork`, `None` while it is collapsed.
    pub fn children(&self, fork: &ForkRef) -> CoreResult<Option<Vec<ForkRef>>> {
        let guard = self.tree.borrow();
        let tree = guard.as_ref().ok_or_else(|| Self::stale(fork))?;

        Ok(tree.resolve(fork)?.children().map(|ids: &[ForkId]| -> Vec<ForkRef> {
            ids.iter().filter_map(|id| tree.fork_ref(*id)).collect()
        }))
    }

    /// Whether every ancestor of `fork` is expanded.
    pub fn is_visible(&self, fork: &ForkRef) -> CoreResult<bool> {
        let guard = self.tree.borrow();
        let tree = guard.as_ref().ok_or_else(|| Self::stale(fork))?;

        tree.resolve(fork)?;
        Ok(tree.is_visible(fork.id))
    }

    pub fn depth(&self, fork: &ForkRef) -> CoreResult<usize> {
        let guard = self.tree.borrow();
        let tree = guard.as_ref().ok_or_else(|| Self::stale(fork))?;

        tree.resolve(fork)?;
        Ok(tree.depth(fork.id))
    }

    /// Handles for the parent chain of `fork`, nearest first.
    pub fn ancestors(&self, fork: &ForkRef) -> CoreResult<Vec<ForkRef>> {
        let guard = self.tree.borrow();
        let tree = guard.as_ref().ok_or_else(|| Self::stale(fork))?;

        tree.resolve(fork)?;
        Ok(tree
            .ancestors(fork.id)
            .iter()
            .filter_map(|id| tree.fork_ref(*id))
            .collect())
    }

    /// Rows currently on screen, in display order.
    #[must_use]
    pub fn visible_forks(&self) -> Vec<ForkRef> {
        self.tree.borrow().as_ref().map_or_else(Vec::new, |tree: &ForkTree| {
            tree.visible_forks()
                .into_iter()
                .filter_map(|id| tree.fork_ref(id))
                .collect()
        })
    }

    /// Load state of a materialized path.
    #[must_use]
    pub fn load_state(&self, path: &Path) -> Option<LoadState> {
        let path = utils::lexical_normalize(path);
        let guard = self.tree.borrow();
        let tree = guard.as_ref()?;

        tree.find(&path)
            .and_then(|id| tree.get(id))
            .map(Fork::load_state)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resolve(path: &Path) -> CoreResult<PathBuf> {
        utils::resolve_path(path).map_err(|e| ExplorerError::from_resolve(path, &e))
    }

    fn stale(fork: &ForkRef) -> ExplorerError {
        ExplorerError::stale(fork.path.as_path(), fork.generation)
    }

    fn handle(tree: &ForkTree, id: ForkId) -> CoreResult<ForkRef> {
        tree.fork_ref(id)
            .ok_or_else(|| ExplorerError::stale(tree.root_path(), tree.generation()))
    }

    fn publish(&self, event: fn(ForkRef) -> ViewEvent, fork: ForkRef) -> ForkRef {
        self.bus.broadcast(&event(fork.clone()));
        fork
    }

    /// Build a tree rooted at `path`; the previous tree survives any failure.
    fn replace_root(&self, path: &Path) -> CoreResult<ForkRef> {
        let info = ObjectInfo::from_path(path).map_err(|e| ExplorerError::from_resolve(path, &e))?;
        let generation = self.generation.get() + 1;
        let mut tree = ForkTree::new(info, generation);

        if tree.root().is_dir() {
            self.expand_node(&mut tree, ForkTree::ROOT)?;
        } else {
            tree.set_state(ForkTree::ROOT, LoadState::Loaded);
        }

        let fork = Self::handle(&tree, ForkTree::ROOT)?;

        info!(
            root = %path.display(),
            generation,
            children = tree.len() - 1,
            "Fork root replaced"
        );

        self.generation.set(generation);
        *self.tree.borrow_mut() = Some(tree);
        *self.current.borrow_mut() = Some(fork.clone());

        Ok(fork)
    }

    /// Expand the chain from the root down to `path`, then `path` itself.
    ///
    /// On failure, ancestors expanded by this call are collapsed again so
    /// that the tree matches what observers last saw.
    fn open_within(&self, path: &Path) -> CoreResult<ForkRef> {
        let mut guard = self.tree.borrow_mut();
        let tree = guard
            .as_mut()
            .ok_or_else(|| ExplorerError::NotFound(path.to_path_buf()))?;

        let mut opened: Vec<ForkId> = Vec::new();
        let result = self.open_chain(tree, path, &mut opened);

        match result {
            Ok(id) => {
                let fork = Self::handle(tree, id)?;
                *self.current.borrow_mut() = Some(fork.clone());
                Ok(fork)
            }

            Err(e) => {
                for id in opened {
                    tree.set_expanded(id, false);
                }
                warn!(path = %path.display(), error = %e, "Navigation failed");
                Err(e)
            }
        }
    }

    fn open_chain(
        &self,
        tree: &mut ForkTree,
        path: &Path,
        opened: &mut Vec<ForkId>,
    ) -> CoreResult<ForkId> {
        let relative = path
            .strip_prefix(tree.root_path())
            .map_err(|_| ExplorerError::NotFound(path.to_path_buf()))?
            .to_path_buf();

        let mut id = ForkTree::ROOT;
        let mut walked = tree.root_path().to_path_buf();

        for component in relative.components() {
            if self.expand_node(tree, id)? {
                opened.push(id);
            }

            walked.push(component);
            id = self.find_child(tree, id, &walked)?;
        }

        let is_dir = tree.get(id).is_some_and(Fork::is_dir);
        if is_dir {
            if self.expand_node(tree, id)? {
                opened.push(id);
            }
        } else {
            tree.set_state(id, LoadState::Loaded);
        }

        Ok(id)
    }

    /// Look up `path` under `parent`. An entry that appeared on disk after
    /// the parent was listed is picked up by relisting the parent once;
    /// forks already in the tree keep their ids.
    fn find_child(&self, tree: &mut ForkTree, parent: ForkId, path: &Path) -> CoreResult<ForkId> {
        if let Some(id) = tree.find(path) {
            return Ok(id);
        }

        // Filtered entries (hidden files) are not part of the tree.
        if !self.scan.show_hidden && is_hidden(path) {
            return Err(ExplorerError::NotFound(path.to_path_buf()));
        }

        let parent_path = tree
            .get(parent)
            .map(|fork: &Fork| fork.path().to_path_buf())
            .ok_or_else(|| ExplorerError::stale(tree.root_path(), tree.generation()))?;

        let entries = (self.scan_fn)(&parent_path, &self.scan)?;
        debug!(path = %parent_path.display(), entries = entries.len(), "Fork relisted");
        tree.populate(parent, entries);

        tree.find(path)
            .ok_or_else(|| ExplorerError::NotFound(path.to_path_buf()))
    }

    /// Populate `id` if needed and mark it expanded.
    ///
    /// Returns whether the expansion flag changed.
    fn expand_node(&self, tree: &mut ForkTree, id: ForkId) -> CoreResult<bool> {
        let (path, is_dir, state, was_expanded) = {
            let fork = tree
                .get(id)
                .ok_or_else(|| ExplorerError::stale(tree.root_path(), tree.generation()))?;
            (
                fork.path().to_path_buf(),
                fork.is_dir(),
                fork.load_state(),
                fork.is_expanded(),
            )
        };

        if !is_dir {
            return Err(ExplorerError::NotADirectory(path));
        }

        if state != LoadState::Loaded {
            tree.set_state(id, LoadState::Loading);

            match (self.scan_fn)(&path, &self.scan) {
                Ok(entries) => {
                    debug!(path = %path.display(), entries = entries.len(), "Fork populated");
                    tree.populate(id, entries);
                }
                Err(e) => {
                    tree.set_state(id, LoadState::Unloaded);
                    return Err(e);
                }
            }
        }

        tree.set_expanded(id, true);
        Ok(!was_expanded)
    }
}

//! src/model/fork_tree.rs
//! ============================================================================
//! # `ForkTree`: arena-backed hierarchy with lazy children
//!
//! The tree starts with just the root fork. Directories are populated only
//! when expanded. Each tree carries a generation number; replacing the root
//! means building a new tree with a higher generation, which turns every
//! outstanding `ForkRef` stale.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    error::{CoreResult, ExplorerError},
    fs::object_info::ObjectInfo,
    model::fork::{Fork, ForkId, ForkRef, LoadState},
};

/// Parent chain of a fork, nearest ancestor first.
pub type Ancestors = SmallVec<[ForkId; 16]>;

#[derive(Debug)]
pub struct ForkTree {
    generation: u64,
    forks: Vec<Fork>,
    path_index: AHashMap<PathBuf, ForkId>,
}

impl ForkTree {
    pub const ROOT: ForkId = ForkId(0);

    #[must_use]
    pub fn new(root: ObjectInfo, generation: u64) -> Self {
        let mut path_index = AHashMap::new();
        path_index.insert(root.path.to_path_buf(), Self::ROOT);

        Self {
            generation,
            forks: vec![Fork::new(Self::ROOT, root, None)],
            path_index,
        }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn root(&self) -> &Fork {
        &self.forks[Self::ROOT.0]
    }

    #[must_use]
    pub fn root_path(&self) -> &Path {
        self.root().path()
    }

    #[must_use]
    pub fn get(&self, id: ForkId) -> Option<&Fork> {
        self.forks.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ForkId) -> Option<&mut Fork> {
        self.forks.get_mut(id.0)
    }

    /// Materialized fork for a normalized path, if any.
    #[must_use]
    pub fn find(&self, path: &Path) -> Option<ForkId> {
        self.path_index.get(path).copied()
    }

    /// Whether `path` lies at or below this tree's root.
    #[must_use]
    pub fn contains_path(&self, path: &Path) -> bool {
        path.starts_with(self.root_path())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    #[must_use]
    pub fn fork_ref(&self, id: ForkId) -> Option<ForkRef> {
        self.get(id).map(|fork: &Fork| -> ForkRef {
            ForkRef {
                id,
                generation: self.generation,
                path: fork.info.path.clone(),
            }
        })
    }

    /// Resolve an event handle back into a live fork.
    pub fn resolve(&self, fork_ref: &ForkRef) -> CoreResult<&Fork> {
        if fork_ref.generation != self.generation {
            return Err(ExplorerError::stale(
                fork_ref.path.as_path(),
                fork_ref.generation,
            ));
        }

        self.get(fork_ref.id)
            .filter(|fork: &&Fork| -> bool { fork.info.path == fork_ref.path })
            .ok_or_else(|| ExplorerError::stale(fork_ref.path.as_path(), fork_ref.generation))
    }

    /// Attach freshly scanned children to `id` and mark it loaded.
    pub(crate) fn populate(&mut self, id: ForkId, entries: Vec<ObjectInfo>) {
        let mut child_ids: Vec<ForkId> = Vec::with_capacity(entries.len());

        for info in entries {
            let path = info.path.to_path_buf();

            if let Some(existing) = self.path_index.get(&path) {
                child_ids.push(*existing);
                continue;
            }

            let child_id = ForkId(self.forks.len());
            self.forks.push(Fork::new(child_id, info, Some(id)));
            self.path_index.insert(path, child_id);
            child_ids.push(child_id);
        }

        if let Some(fork) = self.get_mut(id) {
            fork.children = child_ids;
            fork.state = LoadState::Loaded;
        }
    }

    pub(crate) fn set_state(&mut self, id: ForkId, state: LoadState) {
        if let Some(fork) = self.get_mut(id) {
            fork.state = state;
        }
    }

    pub(crate) fn set_expanded(&mut self, id: ForkId, expanded: bool) {
        if let Some(fork) = self.get_mut(id) {
            fork.expanded = expanded;
        }
    }

    #[must_use]
    pub fn ancestors(&self, id: ForkId) -> Ancestors {
        let mut chain = Ancestors::new();
        let mut current = self.get(id).and_then(|fork: &Fork| fork.parent);

        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(|fork: &Fork| fork.parent);
        }

        chain
    }

    /// Whether a refresh of `id` should reach its cell: every ancestor below
    /// the root must be expanded. The root's own flag is not consulted, so
    /// the root and its direct children always qualify.
    #[must_use]
    pub fn is_visible(&self, id: ForkId) -> bool {
        self.get(id).is_some()
            && self
                .ancestors(id)
                .iter()
                .filter(|ancestor: &&ForkId| **ancestor != Self::ROOT)
                .all(|ancestor: &ForkId| self.get(*ancestor).is_some_and(Fork::is_expanded))
    }

    /// Visible forks in display (pre-order) order.
    #[must_use]
    pub fn visible_forks(&self) -> Vec<ForkId> {
        let mut visible = Vec::new();
        self.collect_visible(Self::ROOT, &mut visible);
        visible
    }

    fn collect_visible(&self, id: ForkId, visible: &mut Vec<ForkId>) {
        visible.push(id);

        if let Some(children) = self.get(id).and_then(Fork::children) {
            for child in children {
                self.collect_visible(*child, visible);
            }
        }
    }

    /// Depth below the root (root is 0).
    #[must_use]
    pub fn depth(&self, id: ForkId) -> usize {
        self.ancestors(id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn info(path: &str, is_dir: bool) -> ObjectInfo {
        ObjectInfo {
            path: Arc::new(PathBuf::from(path)),
            name: path.rsplit('/').next().unwrap_or(path).into(),
            extension: None,
            is_dir,
            is_symlink: false,
        }
    }

    fn sample_tree() -> ForkTree {
        let mut tree = ForkTree::new(info("/r", true), 1);
        tree.populate(ForkTree::ROOT, vec![info("/r/a", true), info("/r/f", false)]);
        tree.set_expanded(ForkTree::ROOT, true);

        let a = tree.find(Path::new("/r/a")).unwrap();
        tree.populate(a, vec![info("/r/a/b", false)]);
        tree
    }

    #[test]
    fn test_populate_indexes_children() {
        let tree = sample_tree();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root().load_state(), LoadState::Loaded);
        assert_eq!(tree.root().children().map(<[ForkId]>::len), Some(2));
    }

    #[test]
    fn test_visibility_requires_expanded_ancestors() {
        let mut tree = sample_tree();
        let a = tree.find(Path::new("/r/a")).unwrap();
        let b = tree.find(Path::new("/r/a/b")).unwrap();

        assert!(tree.is_visible(ForkTree::ROOT));
        assert!(tree.is_visible(a));
        assert!(!tree.is_visible(b));

        tree.set_expanded(a, true);
        assert!(tree.is_visible(b));
        assert_eq!(tree.depth(b), 2);
        assert_eq!(tree.visible_forks().len(), 4);

        tree.set_expanded(ForkTree::ROOT, false);
        assert!(tree.is_visible(a));
        assert!(tree.is_visible(b));
        assert_eq!(tree.visible_forks().len(), 1);
    }

    #[test]
    fn test_resolve_rejects_other_generation() {
        let tree = sample_tree();
        let mut handle = tree.fork_ref(ForkTree::ROOT).unwrap();
        assert!(tree.resolve(&handle).is_ok());

        handle.generation += 1;
        assert!(matches!(
            tree.resolve(&handle),
            Err(ExplorerError::StaleReference { .. })
        ));
    }

    #[test]
    fn test_contains_path_is_component_wise() {
        let tree = sample_tree();

        assert!(tree.contains_path(Path::new("/r/a/b")));
        assert!(!tree.contains_path(Path::new("/rx")));
    }
}

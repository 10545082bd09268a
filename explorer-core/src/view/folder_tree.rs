//! src/view/folder_tree.rs
//! ============================================================================
//! # `FolderTree`: tree panel mirroring the fork hierarchy
//!
//! Headless model of the tree widget. The hosting renderer calls
//! [`FolderTree::render_rows`] to realize one [`TreeCell`] per visible fork;
//! the panel keeps the rows alive and indexes them in a [`CellCache`] so a
//! `StateChanged` broadcast refreshes a single row in place.
//!
//! Refresh is skipped when:
//! - the fork reference is stale
//! - an ancestor below the root is collapsed
//! - no cell is realized for the path
//!
//! Navigating to a deep fork may expand collapsed ancestors on the way; their
//! cells get their icon recomputed in the same dispatch. Rows that appear or
//! disappear are not inserted in place: the host must call `render_rows`
//! whenever [`FolderTree::needs_render`] reports true after a broadcast.

use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
    rc::Rc,
};

use compact_str::CompactString;
use ratatui::style::Style;
use tracing::{debug, trace, warn};

use crate::{
    controller::view_connector::ViewConnector,
    error::CoreResult,
    fs::object_info::ObjectType,
    model::{
        fork::{Fork, ForkRef},
        model_operations::ModelOperations,
    },
    view::{
        cell_cache::CellCache,
        event::ViewEvent,
        gesture::NavigationGesture,
        icons::fork_icon,
        observer::{ObserverId, ViewObserver},
        theme::Palette,
    },
};

/// One realized row of the tree.
#[derive(Debug)]
pub struct TreeCell {
    path: PathBuf,
    depth: usize,
    kind: ObjectType,
    is_symlink: bool,
    label: RefCell<CompactString>,
    icon: Cell<&'static str>,
    refreshes: Cell<u32>,
}

impl TreeCell {
    fn new(fork: &Fork, depth: usize) -> Self {
        Self {
            path: fork.path().to_path_buf(),
            depth,
            kind: fork.object_type(),
            is_symlink: fork.info.is_symlink,
            label: RefCell::new(fork.info.name.clone()),
            icon: Cell::new(fork_icon(fork)),
            refreshes: Cell::new(0),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn kind(&self) -> ObjectType {
        self.kind
    }

    #[must_use]
    pub fn label(&self) -> CompactString {
        self.label.borrow().clone()
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.icon.get()
    }

    /// In-place refreshes applied since the cell was realized.
    #[must_use]
    pub fn refresh_count(&self) -> u32 {
        self.refreshes.get()
    }

    fn apply(&self, fork: &Fork) {
        self.icon.set(fork_icon(fork));
        *self.label.borrow_mut() = fork.info.name.clone();
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

pub struct FolderTree {
    connector: Rc<ViewConnector>,
    root: RefCell<Option<ForkRef>>,
    rows: RefCell<Vec<Rc<TreeCell>>>,
    cells: RefCell<CellCache<TreeCell>>,
    palette: Cell<Palette>,
    dirty: Cell<bool>,
    observer_id: Cell<Option<ObserverId>>,
}

impl FolderTree {
    /// Build the panel and register it with `connector`.
    #[must_use]
    pub fn new(connector: &Rc<ViewConnector>) -> Rc<Self> {
        let panel = Rc::new(Self {
            connector: connector.clone(),
            root: RefCell::new(None),
            rows: RefCell::new(Vec::new()),
            cells: RefCell::new(CellCache::new()),
            palette: Cell::new(Palette::for_theme(connector.theme())),
            dirty: Cell::new(false),
            observer_id: Cell::new(None),
        });

        panel.observer_id.set(Some(connector.register(&panel)));
        panel
    }

    /// Root currently displayed by the tree.
    #[must_use]
    pub fn root(&self) -> Option<ForkRef> {
        self.root.borrow().clone()
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette.get()
    }

    /// True once a broadcast changed what `render_rows` would produce.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.dirty.get()
    }

    /// Style for `cell` under the current palette; the navigation target is
    /// highlighted.
    #[must_use]
    pub fn row_style(&self, cell: &TreeCell) -> Style {
        let palette = self.palette.get();
        let is_current = self
            .connector
            .model_operations()
            .current()
            .is_some_and(|fork: ForkRef| fork.path() == cell.path());

        if is_current {
            palette.highlight_style()
        } else if cell.is_symlink {
            palette.symlink_style()
        } else if cell.kind == ObjectType::Dir {
            palette.directory_style()
        } else {
            palette.base_style()
        }
    }

    #[must_use]
    pub fn rows(&self) -> Vec<Rc<TreeCell>> {
        self.rows.borrow().clone()
    }

    /// Live cell rendering `path`, if any.
    #[must_use]
    pub fn cell(&self, path: &Path) -> Option<Rc<TreeCell>> {
        self.cells.borrow_mut().lookup(path)
    }

    #[must_use]
    pub fn realized_cells(&self) -> usize {
        self.cells.borrow().len()
    }

    /// Realize a fresh cell for every visible fork, recycling the old rows.
    ///
    /// Returns the number of rows.
    pub fn render_rows(&self) -> usize {
        let model = self.connector.model_operations();

        let rows: Vec<Rc<TreeCell>> = model
            .visible_forks()
            .into_iter()
            .filter_map(|fork: ForkRef| {
                let depth = model.depth(&fork).ok()?;
                model
                    .with_fork(&fork, |node: &Fork| Rc::new(TreeCell::new(node, depth)))
                    .ok()
            })
            .collect();

        {
            let mut cells = self.cells.borrow_mut();
            for cell in &rows {
                cells.realize(cell.path(), cell);
            }
        }

        let count = rows.len();
        // Dropping the previous rows recycles their cells.
        *self.rows.borrow_mut() = rows;
        self.cells.borrow_mut().prune();
        self.dirty.set(false);

        trace!(rows = count, "Tree rows rendered");
        count
    }

    /// Handle input on the selected row.
    ///
    /// Returns `None` for gestures that are not navigation.
    pub fn on_gesture(
        &self,
        gesture: NavigationGesture,
        selected: &Path,
    ) -> Option<CoreResult<ForkRef>> {
        if !gesture.is_navigation() {
            return None;
        }

        let result = self.connector.model_operations().load_fork(selected);
        if let Err(e) = &result {
            warn!(path = %selected.display(), error = %e, "Tree navigation failed");
        }
        Some(result)
    }

    /// Unregister from the connector. Must be called before the panel goes away.
    pub fn teardown(&self) {
        if let Some(id) = self.observer_id.take() {
            self.connector.unregister(id);
        }
        self.rows.borrow_mut().clear();
        self.cells.borrow_mut().clear();
    }

    fn change_fork(&self, fork: &ForkRef) {
        let model = self.connector.model_operations();

        let adopt = match self.root.borrow().as_ref() {
            None => true,
            Some(root) => model.with_fork(root, |_| ()).is_err(),
        };

        if !adopt {
            debug!(fork = %fork.path().display(), "Tree keeps its root");
            return;
        }

        *self.root.borrow_mut() = Some(fork.clone());
        self.cells.borrow_mut().clear();
        self.render_rows();
        debug!(root = %fork.path().display(), "Tree root adopted");
    }

    fn change_state(&self, fork: &ForkRef) {
        let model = self.connector.model_operations();

        let visible = match model.is_visible(fork) {
            Ok(visible) => visible,
            Err(e) => {
                trace!(error = %e, "Refresh skipped");
                return;
            }
        };

        self.dirty.set(true);

        if !visible {
            trace!(fork = %fork.path().display(), "Refresh suppressed by collapsed ancestor");
            return;
        }

        if !self.refresh_cell(&model, fork, true) {
            trace!(fork = %fork.path().display(), "No realized cell to refresh");
        }

        // Ancestors opened on the way to `fork` show a stale folder icon.
        for ancestor in model.ancestors(fork).unwrap_or_default() {
            self.refresh_cell(&model, &ancestor, false);
        }
    }

    /// Recompute the cell of `fork`. Without `force`, only a changed icon
    /// triggers the refresh. Returns whether a cell was updated.
    fn refresh_cell(&self, model: &ModelOperations, fork: &ForkRef, force: bool) -> bool {
        let Some(cell) = self.cells.borrow_mut().lookup(fork.path()) else {
            return false;
        };

        let refreshed = model
            .with_fork(fork, |node: &Fork| -> bool {
                let changed = fork_icon(node) != cell.icon();
                if force || changed {
                    cell.apply(node);
                }
                force || changed
            })
            .unwrap_or(false);

        if refreshed {
            trace!(fork = %fork.path().display(), icon = cell.icon(), "Cell refreshed");
        }
        refreshed
    }
}

impl ViewObserver for FolderTree {
    fn receive_event(&self, event: &ViewEvent) {
        match event {
            ViewEvent::ForkChanged(fork) => self.change_fork(fork),
            ViewEvent::StateChanged(fork) => self.change_state(fork),
            ViewEvent::ThemeSet(theme) => self.palette.set(Palette::for_theme(*theme)),
        }
    }

    fn observer_name(&self) -> &'static str {
        "FolderTree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, Theme},
        view::{
            icons::{FILE_ICON, FOLDER_ICON, FOLDER_OPEN_ICON},
            theme::MOCHA,
        },
    };
    use crossterm::event::KeyCode;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_directory() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path();

        fs::create_dir_all(path.join("a").join("b")).unwrap();
        fs::write(path.join("a").join("b").join("leaf.txt"), b"").unwrap();
        fs::write(path.join("top.txt"), b"").unwrap();

        tmp
    }

    fn setup() -> (TempDir, Rc<ViewConnector>, Rc<FolderTree>) {
        let tmp = create_test_directory();
        let connector = ViewConnector::new(&Config::default());
        let tree = FolderTree::new(&connector);
        (tmp, connector, tree)
    }

    const CLICK: NavigationGesture = NavigationGesture::Click { count: 1 };

    #[test]
    fn test_first_fork_becomes_root_and_renders() {
        let (tmp, _connector, tree) = setup();

        let root = tree.on_gesture(CLICK, tmp.path()).unwrap().unwrap();

        assert_eq!(tree.root(), Some(root));
        // root, a, top.txt
        assert_eq!(tree.rows().len(), 3);
        assert_eq!(tree.cell(&tmp.path().join("a")).unwrap().icon(), FOLDER_ICON);
        assert_eq!(tree.cell(&tmp.path().join("top.txt")).unwrap().icon(), FILE_ICON);
    }

    #[test]
    fn test_refresh_follows_expansion_of_visible_fork() {
        let (tmp, _connector, tree) = setup();
        tree.on_gesture(CLICK, tmp.path()).unwrap().unwrap();
        let a = tree.cell(&tmp.path().join("a")).unwrap();

        tree.on_gesture(CLICK, &tmp.path().join("a")).unwrap().unwrap();

        assert_eq!(a.icon(), FOLDER_OPEN_ICON);
        assert_eq!(a.refresh_count(), 1);
        assert!(tree.needs_render());
        assert_eq!(tree.render_rows(), 4);
    }

    #[test]
    fn test_collapsed_ancestor_suppresses_refresh() {
        let (tmp, connector, tree) = setup();
        let model = connector.model_operations();
        let a_path = tmp.path().join("a");
        let b_path = a_path.join("b");

        model.load_fork(tmp.path()).unwrap();
        model.load_fork(&a_path).unwrap();
        tree.render_rows();
        model.collapse(&a_path).unwrap();

        let b = tree.cell(&b_path).unwrap();
        model.notify_changed(&b_path).unwrap();
        assert_eq!(b.refresh_count(), 0);

        let a = tree.cell(&a_path).unwrap();
        model.notify_changed(&a_path).unwrap();
        assert_eq!(a.refresh_count(), 2);
        assert_eq!(a.icon(), FOLDER_ICON);
    }

    #[test]
    fn test_reopened_ancestor_icon_is_refreshed() {
        let (tmp, connector, tree) = setup();
        let model = connector.model_operations();
        model.load_fork(tmp.path()).unwrap();
        let root = tree.cell(tmp.path()).unwrap();
        let a = tree.cell(&tmp.path().join("a")).unwrap();
        assert_eq!(a.icon(), FOLDER_ICON);

        model.load_fork(&tmp.path().join("a").join("b")).unwrap();

        assert_eq!(a.icon(), FOLDER_OPEN_ICON);
        assert_eq!(a.refresh_count(), 1);
        assert_eq!(root.refresh_count(), 0);
        assert!(tree.needs_render());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_row_has_its_own_cell() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("target")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("target"), tmp.path().join("link")).unwrap();
        let connector = ViewConnector::new(&Config::default());
        let tree = FolderTree::new(&connector);
        let model = connector.model_operations();

        model.load_fork(tmp.path()).unwrap();
        let link = tree.cell(&tmp.path().join("link")).unwrap();
        let target = tree.cell(&tmp.path().join("target")).unwrap();
        assert!(link.path().ends_with("link"));
        assert!(!Rc::ptr_eq(&link, &target));

        model.notify_changed(&tmp.path().join("link")).unwrap();

        assert_eq!(link.refresh_count(), 1);
        assert_eq!(target.refresh_count(), 0);
        assert_eq!(tree.row_style(&link), tree.palette().symlink_style());
    }

    #[test]
    fn test_row_style_follows_kind_and_target() {
        let (tmp, connector, tree) = setup();
        connector.model_operations().load_fork(tmp.path()).unwrap();
        let palette = tree.palette();

        let root = tree.cell(tmp.path()).unwrap();
        let a = tree.cell(&tmp.path().join("a")).unwrap();
        let top = tree.cell(&tmp.path().join("top.txt")).unwrap();

        assert_eq!(tree.row_style(&root), palette.highlight_style());
        assert_eq!(tree.row_style(&a), palette.directory_style());
        assert_eq!(tree.row_style(&top), palette.base_style());
        assert_eq!(a.kind(), ObjectType::Dir);
    }

    #[test]
    fn test_refresh_without_cell_is_noop() {
        let (tmp, connector, tree) = setup();
        let model = connector.model_operations();
        model.load_fork(tmp.path()).unwrap();

        tree.teardown();
        assert!(tree.cell(&tmp.path().join("top.txt")).is_none());

        let fresh = FolderTree::new(&connector);
        assert!(fresh.cell(&tmp.path().join("top.txt")).is_none());
        model.notify_changed(&tmp.path().join("top.txt")).unwrap();
        assert!(fresh.needs_render());
        assert_eq!(fresh.realized_cells(), 0);
    }

    #[test]
    fn test_stale_root_is_replaced() {
        let (tmp, connector, tree) = setup();
        let other = TempDir::new().unwrap();
        let model = connector.model_operations();

        model.load_fork(tmp.path()).unwrap();
        let second = model.load_fork(other.path()).unwrap();

        assert_eq!(tree.root(), Some(second));
        assert_eq!(tree.rows().len(), 1);
    }

    #[test]
    fn test_theme_and_gestures() {
        let (tmp, connector, tree) = setup();

        connector.change_theme(Theme::Dark);
        assert_eq!(tree.palette(), MOCHA);

        assert!(tree
            .on_gesture(NavigationGesture::KeyRelease(KeyCode::Enter), tmp.path())
            .is_none());
        assert!(tree
            .on_gesture(NavigationGesture::KeyRelease(KeyCode::Down), tmp.path())
            .is_some());
    }

    #[test]
    fn test_teardown_unregisters() {
        let (_tmp, connector, tree) = setup();
        assert_eq!(connector.observer_count(), 1);

        tree.teardown();
        assert_eq!(connector.observer_count(), 0);
    }
}

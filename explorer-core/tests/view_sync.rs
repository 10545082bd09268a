//! End-to-end behavior of the connector, the model and the reference panels.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use explorer_core::{
    Config, ExplorerError, Theme, ViewConnector, ViewEvent, ViewObserver,
    model::LoadState,
    view::{FolderTree, ViewEventKind},
};
use tempfile::TempDir;

struct Recorder {
    tag: &'static str,
    log: Rc<RefCell<Vec<(&'static str, ViewEventKind)>>>,
}

impl Recorder {
    fn new(tag: &'static str, log: &Rc<RefCell<Vec<(&'static str, ViewEventKind)>>>) -> Rc<Self> {
        Rc::new(Self {
            tag,
            log: log.clone(),
        })
    }
}

impl ViewObserver for Recorder {
    fn receive_event(&self, event: &ViewEvent) {
        self.log.borrow_mut().push((self.tag, event.kind()));
    }
}

fn create_test_directory() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path();

    fs::create_dir_all(path.join("src").join("nested")).unwrap();
    fs::write(path.join("src").join("nested").join("deep.rs"), b"").unwrap();
    fs::write(path.join("src").join("main.rs"), b"fn main() {}").unwrap();
    fs::write(path.join("README.md"), b"# readme").unwrap();

    tmp
}

fn join(base: &Path, parts: &[&str]) -> PathBuf {
    parts.iter().fold(base.to_path_buf(), |acc, part| acc.join(part))
}

#[test]
fn load_fork_emits_exactly_one_event() {
    let tmp = create_test_directory();
    let connector = ViewConnector::new(&Config::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder::new("only", &log);
    connector.register(&recorder);
    let model = connector.model_operations();

    model.load_fork(tmp.path()).unwrap();
    assert_eq!(*log.borrow(), vec![("only", ViewEventKind::ForkChanged)]);

    let src = tmp.path().join("src");
    assert_eq!(model.load_state(&src), Some(LoadState::Unloaded));
    model.load_fork(&src).unwrap();

    assert_eq!(model.load_state(&src), Some(LoadState::Loaded));
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(log.borrow()[1].1, ViewEventKind::StateChanged);
}

#[test]
fn missing_path_fails_without_events() {
    let tmp = create_test_directory();
    let connector = ViewConnector::new(&Config::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder::new("only", &log);
    connector.register(&recorder);
    let model = connector.model_operations();

    let root = model.load_fork(tmp.path()).unwrap();
    log.borrow_mut().clear();

    let err = model.load_fork(&tmp.path().join("nope")).unwrap_err();

    assert!(matches!(err, ExplorerError::NotFound(_)));
    assert!(log.borrow().is_empty());
    assert_eq!(model.root(), Some(root));
}

#[test]
fn duplicate_registration_delivers_theme_once() {
    let connector = ViewConnector::new(&Config::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder::new("dup", &log);

    let first = connector.register(&recorder);
    let second = connector.register(&recorder);
    assert_eq!(first, second);

    connector.change_theme(Theme::Dark);

    assert_eq!(*log.borrow(), vec![("dup", ViewEventKind::ThemeSet)]);
}

#[test]
fn collapsed_parent_suppresses_grandchild_refresh() {
    let tmp = create_test_directory();
    let connector = ViewConnector::new(&Config::default());
    let tree = FolderTree::new(&connector);
    let model = connector.model_operations();
    let src = tmp.path().join("src");
    let nested = join(tmp.path(), &["src", "nested"]);

    model.load_fork(tmp.path()).unwrap();
    model.load_fork(&src).unwrap();
    tree.render_rows();
    model.collapse(&src).unwrap();

    let nested_cell = tree.cell(&nested).unwrap();
    let src_cell = tree.cell(&src).unwrap();
    let src_before = src_cell.refresh_count();

    model.notify_changed(&nested).unwrap();
    assert_eq!(nested_cell.refresh_count(), 0);

    model.notify_changed(&src).unwrap();
    assert_eq!(src_cell.refresh_count(), src_before + 1);
}

#[test]
fn refresh_without_realized_cell_is_safe() {
    let tmp = create_test_directory();
    let connector = ViewConnector::new(&Config::default());
    let tree = FolderTree::new(&connector);
    let model = connector.model_operations();
    let main_rs = join(tmp.path(), &["src", "main.rs"]);

    model.load_fork(tmp.path()).unwrap();
    model.load_fork(&tmp.path().join("src")).unwrap();

    // Rows were rendered before `src` was expanded.
    assert!(tree.cell(&main_rs).is_none());
    model.notify_changed(&main_rs).unwrap();
    assert!(tree.cell(&main_rs).is_none());
}

#[test]
fn broadcast_respects_registration_order() {
    let tmp = create_test_directory();
    let connector = ViewConnector::new(&Config::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = Recorder::new("first", &log);
    let second = Recorder::new("second", &log);
    connector.register(&first);
    connector.register(&second);

    connector.model_operations().load_fork(tmp.path()).unwrap();
    connector.change_theme(Theme::Light);

    assert_eq!(
        *log.borrow(),
        vec![
            ("first", ViewEventKind::ForkChanged),
            ("second", ViewEventKind::ForkChanged),
            ("first", ViewEventKind::ThemeSet),
            ("second", ViewEventKind::ThemeSet),
        ]
    );
}

#[test]
fn dropped_panel_is_never_dispatched_into() {
    let tmp = create_test_directory();
    let connector = ViewConnector::new(&Config::default());
    let tree = FolderTree::new(&connector);
    assert_eq!(connector.observer_count(), 1);

    drop(tree);
    connector.model_operations().load_fork(tmp.path()).unwrap();

    assert_eq!(connector.observer_count(), 0);
}

//! src/view/content_view.rs
//! ============================================================================
//! # `ContentView`: listing of the navigation target
//!
//! Shows the children of whatever fork the user last navigated to, in either
//! list or preview mode. The mode is switched directly by the connector, not
//! through a broadcast.

use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::{
    config::ViewType,
    controller::view_connector::ViewConnector,
    fs::object_info::ObjectType,
    model::fork::{Fork, ForkRef},
    view::{
        event::ViewEvent,
        observer::{ObserverId, ViewObserver, ViewSwitcher},
        theme::Palette,
    },
};

/// One row of the content listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub path: Arc<PathBuf>,
    pub name: CompactString,
    pub object_type: ObjectType,
}

impl ContentEntry {
    fn from_fork(fork: &Fork) -> Self {
        Self {
            path: fork.info.path.clone(),
            name: fork.info.name.clone(),
            object_type: fork.object_type(),
        }
    }
}

pub struct ContentView {
    connector: Rc<ViewConnector>,
    shown: RefCell<Option<ForkRef>>,
    entries: RefCell<Vec<ContentEntry>>,
    view_type: Cell<ViewType>,
    palette: Cell<Palette>,
    observer_id: Cell<Option<ObserverId>>,
}

impl ContentView {
    /// Build the panel, register it and bind it as the right-view switcher.
    #[must_use]
    pub fn new(connector: &Rc<ViewConnector>) -> Rc<Self> {
        let panel = Rc::new(Self {
            connector: connector.clone(),
            shown: RefCell::new(None),
            entries: RefCell::new(Vec::new()),
            view_type: Cell::new(connector.view_type()),
            palette: Cell::new(Palette::for_theme(connector.theme())),
            observer_id: Cell::new(None),
        });

        panel.observer_id.set(Some(connector.register(&panel)));
        connector.bind_view_switcher(&panel);
        panel
    }

    /// Fork whose children are listed.
    #[must_use]
    pub fn shown(&self) -> Option<ForkRef> {
        self.shown.borrow().clone()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<ContentEntry> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn entry_names(&self) -> Vec<CompactString> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    #[must_use]
    pub fn view_type(&self) -> ViewType {
        self.view_type.get()
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette.get()
    }

    pub fn teardown(&self) {
        if let Some(id) = self.observer_id.take() {
            self.connector.unregister(id);
        }
    }

    fn show(&self, fork: &ForkRef) {
        let model = self.connector.model_operations();

        if model.current().as_ref() != Some(fork) {
            trace!(fork = %fork.path().display(), "Not the navigation target");
            return;
        }

        // A file or a collapsed directory lists nothing.
        let children = match model.children(fork) {
            Ok(children) => children.unwrap_or_default(),
            Err(e) => {
                trace!(error = %e, "Listing skipped");
                return;
            }
        };

        let entries: Vec<ContentEntry> = children
            .iter()
            .filter_map(|child| model.with_fork(child, ContentEntry::from_fork).ok())
            .collect();

        debug!(
            fork = %fork.path().display(),
            entries = entries.len(),
            view = %self.view_type.get(),
            "Content listed"
        );

        *self.entries.borrow_mut() = entries;
        *self.shown.borrow_mut() = Some(fork.clone());
    }

    #[must_use]
    pub fn is_showing(&self, path: &Path) -> bool {
        self.shown
            .borrow()
            .as_ref()
            .is_some_and(|fork: &ForkRef| fork.path() == path)
    }
}

impl ViewObserver for ContentView {
    fn receive_event(&self, event: &ViewEvent) {
        match event {
            ViewEvent::ForkChanged(fork) | ViewEvent::StateChanged(fork) => self.show(fork),
            ViewEvent::ThemeSet(theme) => self.palette.set(Palette::for_theme(*theme)),
        }
    }

    fn observer_name(&self) -> &'static str {
        "ContentView"
    }
}

impl ViewSwitcher for ContentView {
    fn change_view(&self, view_type: ViewType) {
        self.view_type.set(view_type);
        debug!(%view_type, "Content view switched");
    }
}

//! src/view/search_results_view.rs
//! ============================================================================
//! # `SearchResultsView`: panel for completed searches
//!
//! Receives finished [`SearchTask`]s from the connector. It also observes
//! broadcasts, but only theme changes concern it.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::info;

use crate::{
    controller::view_connector::ViewConnector,
    view::{
        event::ViewEvent,
        observer::{ObserverId, SearchResultsSink, ViewObserver},
        search::SearchTask,
        theme::Palette,
    },
};

pub struct SearchResultsView {
    connector: Rc<ViewConnector>,
    last: RefCell<Option<SearchTask>>,
    delivered: Cell<usize>,
    palette: Cell<Palette>,
    observer_id: Cell<Option<ObserverId>>,
}

impl SearchResultsView {
    #[must_use]
    pub fn new(connector: &Rc<ViewConnector>) -> Rc<Self> {
        let panel = Rc::new(Self {
            connector: connector.clone(),
            last: RefCell::new(None),
            delivered: Cell::new(0),
            palette: Cell::new(Palette::for_theme(connector.theme())),
            observer_id: Cell::new(None),
        });

        panel.observer_id.set(Some(connector.register(&panel)));
        connector.bind_search_sink(&panel);
        panel
    }

    /// Most recently delivered task.
    #[must_use]
    pub fn last_task(&self) -> Option<SearchTask> {
        self.last.borrow().clone()
    }

    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered.get()
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
}

impl SearchResultsSink for SearchResultsView {
    fn show_results(&self, task: SearchTask) {
        info!(
            query = task.query(),
            base = %task.base_directory().display(),
            matches = task.total_matches(),
            "Search results shown"
        );

        *self.last.borrow_mut() = Some(task);
        self.delivered.set(self.delivered.get() + 1);
    }
}

impl ViewObserver for SearchResultsView {
    fn receive_event(&self, event: &ViewEvent) {
        match event {
            ViewEvent::ThemeSet(theme) => self.palette.set(Palette::for_theme(*theme)),
            ViewEvent::ForkChanged(_) | ViewEvent::StateChanged(_) => {}
        }
    }

    fn observer_name(&self) -> &'static str {
        "SearchResultsView"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, Theme},
        view::theme::{LATTE, MOCHA},
    };
    use std::path::PathBuf;

    #[test]
    fn test_results_replace_previous_task() {
        let connector = ViewConnector::new(&Config::default());
        let view = SearchResultsView::new(&connector);

        let first = SearchTask::new("foo", PathBuf::from("/a"), vec![PathBuf::from("/a/foo")]);
        let second = SearchTask::new("bar", PathBuf::from("/a"), vec![]);

        connector.load_search_results(first);
        connector.load_search_results(second.clone());

        assert_eq!(view.delivered(), 2);
        assert_eq!(view.last_task(), Some(second));
    }

    #[test]
    fn test_follows_theme() {
        let connector = ViewConnector::new(&Config::default());
        let view = SearchResultsView::new(&connector);
        assert_eq!(view.palette(), LATTE);

        connector.change_theme(Theme::Dark);
        assert_eq!(view.palette(), MOCHA);

        view.teardown();
        connector.change_theme(Theme::Light);
        assert_eq!(view.palette(), MOCHA);
    }
}

//! src/controller/view_connector.rs
//! ============================================================================
//! # `ViewConnector`: coordination hub between the model and the panels
//!
//! Constructed once by the application root and handed by reference to every
//! panel. Owns the observer registry, the single shared `ModelOperations`,
//! and the process-wide theme. Theme changes are broadcast; right-view
//! switches and search results go straight to the one collaborator that
//! consumes them.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use tracing::{debug, info, instrument, warn};

use crate::{
    config::{Config, Theme, ViewType},
    model::model_operations::ModelOperations,
    view::{
        event::ViewEvent,
        observer::{ObserverId, ObserverRegistry, SearchResultsSink, ViewObserver, ViewSwitcher},
        search::SearchTask,
    },
};

pub struct ViewConnector {
    registry: Rc<ObserverRegistry>,
    model: Rc<ModelOperations>,
    theme: Cell<Theme>,
    view_type: Cell<ViewType>,
    view_switcher: RefCell<Option<Weak<dyn ViewSwitcher>>>,
    search_sink: RefCell<Option<Weak<dyn SearchResultsSink>>>,
}

impl ViewConnector {
    #[must_use]
    pub fn new(config: &Config) -> Rc<Self> {
        let registry = Rc::new(ObserverRegistry::new());
        let model = Rc::new(ModelOperations::new(config.scan.clone(), registry.clone()));

        info!(theme = %config.theme, view = %config.view_type, "View connector created");

        Rc::new(Self {
            registry,
            model,
            theme: Cell::new(config.theme),
            view_type: Cell::new(config.view_type),
            view_switcher: RefCell::new(None),
            search_sink: RefCell::new(None),
        })
    }

    /// Add `observer` to the broadcast list. Registering twice is harmless.
    pub fn register<O: ViewObserver + 'static>(&self, observer: &Rc<O>) -> ObserverId {
        self.registry.register(observer)
    }

    /// Panels call this on teardown.
    pub fn unregister(&self, id: ObserverId) -> bool {
        self.registry.unregister(id)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    /// The one instance every panel navigates through.
    #[must_use]
    pub fn model_operations(&self) -> Rc<ModelOperations> {
        self.model.clone()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    #[must_use]
    pub fn view_type(&self) -> ViewType {
        self.view_type.get()
    }

    /// Store `theme` and broadcast `ThemeSet`; returns how many observers got it.
    #[instrument(level = "debug", skip(self))]
    pub fn change_theme(&self, theme: Theme) -> usize {
        self.theme.set(theme);
        self.registry.broadcast(&ViewEvent::ThemeSet(theme))
    }

    pub fn bind_view_switcher<S: ViewSwitcher + 'static>(&self, switcher: &Rc<S>) {
        let weak = Rc::downgrade(switcher);
        let weak: Weak<dyn ViewSwitcher> = weak;
        *self.view_switcher.borrow_mut() = Some(weak);
        debug!("View switcher bound");
    }

    pub fn bind_search_sink<S: SearchResultsSink + 'static>(&self, sink: &Rc<S>) {
        let weak = Rc::downgrade(sink);
        let weak: Weak<dyn SearchResultsSink> = weak;
        *self.search_sink.borrow_mut() = Some(weak);
        debug!("Search results sink bound");
    }

    /// Switch the content panel's display mode. Not broadcast.
    ///
    /// Returns false when no live switcher is bound.
    #[instrument(level = "debug", skip(self))]
    pub fn change_right_view(&self, view_type: ViewType) -> bool {
        self.view_type.set(view_type);

        let switcher = self.view_switcher.borrow().as_ref().and_then(Weak::upgrade);
        match switcher {
            Some(switcher) => {
                switcher.change_view(view_type);
                true
            }
            None => {
                warn!(%view_type, "No view switcher bound; view change dropped");
                false
            }
        }
    }

    /// Hand a completed search task to the results panel. The task is
    /// transported as-is.
    #[instrument(level = "debug", skip(self, task), fields(query = task.query(), matches = task.total_matches()))]
    pub fn load_search_results(&self, task: SearchTask) -> bool {
        let sink = self.search_sink.borrow().as_ref().and_then(Weak::upgrade);
        match sink {
            Some(sink) => {
                sink.show_results(task);
                true
            }
            None => {
                warn!("No search results sink bound; results dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Order {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ViewObserver for Order {
        fn receive_event(&self, _event: &ViewEvent) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    #[derive(Default)]
    struct Switch {
        last: Cell<Option<ViewType>>,
    }

    impl ViewSwitcher for Switch {
        fn change_view(&self, view_type: ViewType) {
            self.last.set(Some(view_type));
        }
    }

    #[derive(Default)]
    struct Sink {
        tasks: RefCell<Vec<SearchTask>>,
    }

    impl SearchResultsSink for Sink {
        fn show_results(&self, task: SearchTask) {
            self.tasks.borrow_mut().push(task);
        }
    }

    #[test]
    fn test_theme_broadcast_in_registration_order() {
        let connector = ViewConnector::new(&Config::default());
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::new(Order { tag: "first", log: log.clone() });
        let second = Rc::new(Order { tag: "second", log: log.clone() });

        connector.register(&first);
        connector.register(&second);
        connector.register(&first);

        assert_eq!(connector.change_theme(Theme::Dark), 2);
        assert_eq!(connector.theme(), Theme::Dark);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_model_operations_is_shared() {
        let connector = ViewConnector::new(&Config::default());

        assert!(Rc::ptr_eq(
            &connector.model_operations(),
            &connector.model_operations()
        ));
    }

    #[test]
    fn test_right_view_goes_to_bound_switcher_only() {
        let connector = ViewConnector::new(&Config::default());
        assert!(!connector.change_right_view(ViewType::Preview));

        let switch = Rc::new(Switch::default());
        connector.bind_view_switcher(&switch);

        assert!(connector.change_right_view(ViewType::Preview));
        assert_eq!(switch.last.get(), Some(ViewType::Preview));
        assert_eq!(connector.view_type(), ViewType::Preview);
    }

    #[test]
    fn test_search_results_are_forwarded_untouched() {
        let connector = ViewConnector::new(&Config::default());
        let sink = Rc::new(Sink::default());
        connector.bind_search_sink(&sink);

        let task = SearchTask::new(
            "*.rs",
            PathBuf::from("/src"),
            vec![PathBuf::from("/src/b.rs"), PathBuf::from("/src/a.rs")],
        );
        assert!(connector.load_search_results(task.clone()));

        assert_eq!(sink.tasks.borrow().as_slice(), &[task]);

        drop(sink);
        assert!(!connector.load_search_results(SearchTask::new("x", PathBuf::new(), vec![])));
    }
}

pub mod error;

pub mod config;

pub mod logging;
pub use logging::LoggerBuilder;

pub mod fs {
    pub mod dir_scanner;
    pub mod object_info;
    pub mod utils;
}

pub mod model {
    pub mod fork;
    pub use fork::{Fork, ForkId, ForkRef, LoadState};

    pub mod fork_tree;
    pub use fork_tree::ForkTree;

    pub mod model_operations;
    pub use model_operations::ModelOperations;
}

pub mod view {
    pub mod event;
    pub use event::{ViewEvent, ViewEventKind};

    pub mod observer;
    pub use observer::{ObserverId, ObserverRegistry, SearchResultsSink, ViewObserver, ViewSwitcher};

    pub mod cell_cache;
    pub use cell_cache::CellCache;

    pub mod search;
    pub use search::SearchTask;

    pub mod gesture;
    pub use gesture::NavigationGesture;

    pub mod icons;

    pub mod theme;
    pub use theme::Palette;

    pub mod folder_tree;
    pub use folder_tree::{FolderTree, TreeCell};

    pub mod content_view;
    pub use content_view::{ContentEntry, ContentView};

    pub mod search_results_view;
    pub use search_results_view::SearchResultsView;
}

pub mod controller {
    pub mod view_connector;
    pub use view_connector::ViewConnector;

    pub mod dispatcher;
    pub use dispatcher::{DispatchHandle, DispatchStats, Dispatcher, ViewRequest};
}

pub use config::{ChildOrdering, Config, ScanConfig, Theme, ViewType};
pub use controller::{ViewConnector, dispatcher};
pub use error::{CoreResult, ExplorerError};
pub use model::{ForkRef, ModelOperations};
pub use view::{ViewEvent, ViewObserver};

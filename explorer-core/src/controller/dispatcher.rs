//! src/controller/dispatcher.rs
//! ============================================================================
//! # Dispatcher: marshals cross-thread requests onto the dispatch thread
//!
//! The connector and the fork tree are `!Send`. Background producers (search
//! workers, file watchers) hold a cloneable [`DispatchHandle`] and post
//! [`ViewRequest`]s; the [`Dispatcher`] owns the receiving end and applies
//! each request on the thread that owns the connector.
//!
//! A failed request is logged and counted, never fatal. The loop ends when a
//! `Shutdown` request arrives or every handle has been dropped.

use std::{path::PathBuf, rc::Rc, time::Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::{
    config::{Theme, ViewType},
    controller::view_connector::ViewConnector,
    error::{CoreResult, ExplorerError},
    view::search::SearchTask,
};

/// Work posted from another thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    LoadFork(PathBuf),
    Expand(PathBuf),
    Collapse(PathBuf),
    /// On-disk state of a materialized path changed.
    NotifyChanged(PathBuf),
    ChangeTheme(Theme),
    ChangeRightView(ViewType),
    SearchCompleted(SearchTask),
    Shutdown,
}

/// Sending half; `Send` and cheap to clone.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    tx: UnboundedSender<ViewRequest>,
}

impl DispatchHandle {
    pub fn send(&self, request: ViewRequest) -> CoreResult<()> {
        self.tx
            .send(request)
            .map_err(|_| ExplorerError::DispatcherClosed)
    }

    pub fn load_fork<P: Into<PathBuf>>(&self, path: P) -> CoreResult<()> {
        self.send(ViewRequest::LoadFork(path.into()))
    }

    pub fn notify_changed<P: Into<PathBuf>>(&self, path: P) -> CoreResult<()> {
        self.send(ViewRequest::NotifyChanged(path.into()))
    }

    pub fn search_completed(&self, task: SearchTask) -> CoreResult<()> {
        self.send(ViewRequest::SearchCompleted(task))
    }

    pub fn shutdown(&self) -> CoreResult<()> {
        self.send(ViewRequest::Shutdown)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: u64,
    pub failed: u64,
}

pub struct Dispatcher {
    rx: UnboundedReceiver<ViewRequest>,
    connector: Rc<ViewConnector>,
    stats: DispatchStats,
}

/// Create a connected handle/dispatcher pair for `connector`.
#[must_use]
pub fn channel(connector: &Rc<ViewConnector>) -> (DispatchHandle, Dispatcher) {
    let (tx, rx) = mpsc::unbounded_channel();

    (
        DispatchHandle { tx },
        Dispatcher {
            rx,
            connector: connector.clone(),
            stats: DispatchStats::default(),
        },
    )
}

impl Dispatcher {
    #[must_use]
    pub const fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Apply requests until shutdown or until every handle is gone.
    pub async fn run(mut self) -> DispatchStats {
        info!("Dispatcher started");

        while let Some(request) = self.rx.recv().await {
            if !self.apply(request) {
                break;
            }
        }

        self.rx.close();
        info!(
            handled = self.stats.handled,
            failed = self.stats.failed,
            "Dispatcher stopped"
        );
        self.stats
    }

    /// Apply whatever is already queued without waiting.
    ///
    /// Returns false once a `Shutdown` request was applied.
    pub fn drain_pending(&mut self) -> bool {
        while let Ok(request) = self.rx.try_recv() {
            if !self.apply(request) {
                return false;
            }
        }
        true
    }

    /// Apply one request; returns false for `Shutdown`.
    pub fn apply(&mut self, request: ViewRequest) -> bool {
        let start = Instant::now();
        trace!(?request, "Applying request");

        let model = self.connector.model_operations();
        let result: CoreResult<()> = match request {
            ViewRequest::LoadFork(path) => model.load_fork(&path).map(drop),
            ViewRequest::Expand(path) => model.expand(&path).map(drop),
            ViewRequest::Collapse(path) => model.collapse(&path).map(drop),
            ViewRequest::NotifyChanged(path) => model.notify_changed(&path).map(drop),

            ViewRequest::ChangeTheme(theme) => {
                self.connector.change_theme(theme);
                Ok(())
            }

            ViewRequest::ChangeRightView(view_type) => {
                self.connector.change_right_view(view_type);
                Ok(())
            }

            ViewRequest::SearchCompleted(task) => {
                self.connector.load_search_results(task);
                Ok(())
            }

            ViewRequest::Shutdown => {
                debug!("Shutdown requested");
                return false;
            }
        };

        match result {
            Ok(()) => self.stats.handled += 1,
            Err(e) => {
                self.stats.failed += 1;
                warn!(error = %e, "Marshalled request failed");
            }
        }

        debug!(elapsed_us = start.elapsed().as_micros(), "Request applied");
        true
    }
}

//! src/view/event.rs
//! ============================================================================
//! # View Events
//!
//! Immutable notifications broadcast to every registered observer. Observers
//! match on the enum exhaustively, so adding a variant is a compile error in
//! every panel until it is handled.

use std::fmt;

use crate::{config::Theme, model::fork::ForkRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The tree was re-rooted at this fork.
    ForkChanged(ForkRef),

    /// A fork inside the current tree changed its visual state.
    StateChanged(ForkRef),

    /// The process-wide theme changed.
    ThemeSet(Theme),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewEventKind {
    ForkChanged,
    StateChanged,
    ThemeSet,
}

impl ViewEvent {
    #[must_use]
    pub const fn kind(&self) -> ViewEventKind {
        match self {
            Self::ForkChanged(_) => ViewEventKind::ForkChanged,
            Self::StateChanged(_) => ViewEventKind::StateChanged,
            Self::ThemeSet(_) => ViewEventKind::ThemeSet,
        }
    }

    /// Fork payload, if the event carries one.
    #[must_use]
    pub const fn fork(&self) -> Option<&ForkRef> {
        match self {
            Self::ForkChanged(fork) | Self::StateChanged(fork) => Some(fork),
            Self::ThemeSet(_) => None,
        }
    }
}

impl fmt::Display for ViewEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'_ str = match self {
            Self::ForkChanged => "fork_changed",
            Self::StateChanged => "state_changed",
            Self::ThemeSet => "theme_set",
        };

        write!(f, "{s}")
    }
}

impl fmt::Display for ViewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForkChanged(fork) | Self::StateChanged(fork) => {
                write!(f, "{}({})", self.kind(), fork.path.display())
            }
            Self::ThemeSet(theme) => write!(f, "{}({theme})", self.kind()),
        }
    }
}

//! src/view/icons.rs
//! ============================================================================
//! # Fork Icons (Nerd Fonts)
//!
//! Icon shown in a tree cell, derived from the fork's type and expansion
//! state. A `StateChanged` refresh recomputes it.

use crate::{
    fs::object_info::ObjectType,
    model::fork::{Fork, LoadState},
};

pub const FOLDER_ICON: &str = "\u{f07b}";
pub const FOLDER_OPEN_ICON: &str = "\u{f07c}";
pub const FILE_ICON: &str = "\u{f15b}";
pub const SYMLINK_ICON: &str = "\u{f0c1}";
pub const LOADING_ICON: &str = "\u{f110}";

#[must_use]
pub fn fork_icon(fork: &Fork) -> &'static str {
    match (fork.object_type(), fork.load_state(), fork.is_expanded()) {
        (ObjectType::Dir, LoadState::Loading, _) => LOADING_ICON,
        (ObjectType::Dir, _, true) => FOLDER_OPEN_ICON,
        (ObjectType::Dir, _, false) => FOLDER_ICON,
        (ObjectType::Symlink, ..) => SYMLINK_ICON,
        (ObjectType::File, ..) => FILE_ICON,
    }
}

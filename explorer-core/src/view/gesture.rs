//! src/view/gesture.rs
//! ============================================================================
//! # Navigation Gestures
//!
//! The only input distinction the core cares about: did the user ask to
//! navigate to the selected row. A single click or an arrow key release on
//! the tree does; anything else does not.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationGesture {
    Click { count: u8 },
    KeyRelease(KeyCode),
}

impl NavigationGesture {
    #[must_use]
    pub const fn is_navigation(&self) -> bool {
        match self {
            Self::Click { count } => *count == 1,
            Self::KeyRelease(code) => matches!(
                code,
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
            ),
        }
    }

    #[must_use]
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        (event.kind == KeyEventKind::Release).then_some(Self::KeyRelease(event.code))
    }

    #[must_use]
    pub const fn from_mouse_event(event: &MouseEvent) -> Option<Self> {
        match event.kind {
            MouseEventKind::Up(MouseButton::Left) => Some(Self::Click { count: 1 }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    #[test]
    fn test_arrow_release_navigates() {
        let event = KeyEvent {
            code: KeyCode::Down,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };

        let gesture = NavigationGesture::from_key_event(&event).unwrap();
        assert!(gesture.is_navigation());
    }

    #[test]
    fn test_press_and_other_keys_do_not_navigate() {
        let press = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(NavigationGesture::from_key_event(&press), None);

        assert!(!NavigationGesture::KeyRelease(KeyCode::Enter).is_navigation());
        assert!(!NavigationGesture::Click { count: 2 }.is_navigation());
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_left_button_release_is_single_click() {
        let gesture = NavigationGesture::from_mouse_event(&mouse(MouseEventKind::Up(MouseButton::Left)));

        assert_eq!(gesture, Some(NavigationGesture::Click { count: 1 }));
        assert!(gesture.unwrap().is_navigation());
    }

    #[test]
    fn test_other_mouse_events_are_ignored() {
        for kind in [
            MouseEventKind::Down(MouseButton::Left),
            MouseEventKind::Up(MouseButton::Right),
            MouseEventKind::Moved,
        ] {
            assert_eq!(NavigationGesture::from_mouse_event(&mouse(kind)), None);
        }
    }
}

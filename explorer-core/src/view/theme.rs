//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Palettes
//!
//! Latte for [`Theme::Light`], Mocha for [`Theme::Dark`]. Colors are from the
//! official Catppuccin theme specification:
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};

use crate::config::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub current_line: Color,
    pub directory: Color,
    pub symlink: Color,
    pub muted: Color,
}

pub const LATTE: Palette = Palette {
    background: Color::Rgb(239, 241, 245),   // Base
    foreground: Color::Rgb(76, 79, 105),     // Text
    current_line: Color::Rgb(204, 208, 218), // Surface0
    directory: Color::Rgb(30, 102, 245),     // Blue
    symlink: Color::Rgb(23, 146, 153),       // Teal
    muted: Color::Rgb(140, 143, 161),        // Overlay1
};

pub const MOCHA: Palette = Palette {
    background: Color::Rgb(30, 30, 46),     // Base
    foreground: Color::Rgb(205, 214, 244),  // Text
    current_line: Color::Rgb(69, 71, 90),   // Surface1
    directory: Color::Rgb(137, 180, 250),   // Blue
    symlink: Color::Rgb(148, 226, 213),     // Teal
    muted: Color::Rgb(127, 132, 156),       // Overlay1
};

impl Palette {
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => LATTE,
            Theme::Dark => MOCHA,
        }
    }

    #[must_use]
    pub fn base_style(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    #[must_use]
    pub fn directory_style(&self) -> Style {
        Style::default()
            .fg(self.directory)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn symlink_style(&self) -> Style {
        Style::default()
            .fg(self.symlink)
            .add_modifier(Modifier::ITALIC)
    }

    #[must_use]
    pub fn highlight_style(&self) -> Style {
        Style::default().bg(self.current_line).fg(self.foreground)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}

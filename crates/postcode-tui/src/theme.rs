//! Color schemes and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};
use tracing::warn;

use postcode_core::options::DEFAULT_THEME;

/// A named color palette. Every field group picks one through its `theme`
/// option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_muted: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border_color: Color,
    pub selection_bg: Color,
}

impl Theme {
    /// Plain ANSI colors that render on any terminal.
    pub const SAFE: Theme = Theme {
        name: "safe",
        fg: Color::Reset,
        fg_dim: Color::DarkGray,
        fg_muted: Color::Gray,
        accent: Color::Cyan,
        success: Color::Green,
        warning: Color::Yellow,
        error: Color::Red,
        border_color: Color::Gray,
        selection_bg: Color::Blue,
    };

    pub const DARK: Theme = Theme {
        name: "dark",
        fg: Color::Rgb(200, 200, 200),
        fg_dim: Color::Rgb(100, 100, 100),
        fg_muted: Color::Rgb(140, 140, 140),
        accent: Color::Rgb(110, 170, 255),
        success: Color::Rgb(80, 200, 120),
        warning: Color::Rgb(230, 180, 80),
        error: Color::Rgb(240, 80, 80),
        border_color: Color::Rgb(60, 60, 60),
        selection_bg: Color::Rgb(40, 40, 60),
    };

    pub const LIGHT: Theme = Theme {
        name: "light",
        fg: Color::Rgb(40, 40, 40),
        fg_dim: Color::Rgb(150, 150, 150),
        fg_muted: Color::Rgb(100, 100, 100),
        accent: Color::Rgb(0, 90, 180),
        success: Color::Rgb(20, 130, 60),
        warning: Color::Rgb(170, 110, 0),
        error: Color::Rgb(190, 30, 30),
        border_color: Color::Rgb(180, 180, 180),
        selection_bg: Color::Rgb(210, 225, 245),
    };

    pub fn all() -> &'static [Theme] {
        &[Theme::SAFE, Theme::DARK, Theme::LIGHT]
    }

    /// Look up a palette by name, ignoring case.
    pub fn named(name: &str) -> Option<Theme> {
        Theme::all()
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Like [`Theme::named`], but falls back to the default palette.
    pub fn resolve(name: &str) -> Theme {
        Theme::named(name).unwrap_or_default()
    }

    /// Check a theme name once at attach time so unknown names are reported
    /// without flooding the log from the render loop.
    pub fn check(name: &str) -> Theme {
        Theme::named(name).unwrap_or_else(|| {
            warn!(theme = name, fallback = DEFAULT_THEME, "Unknown theme");
            Theme::default()
        })
    }

    // ── Composite styles ────────────────────────────────────

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border_color)
    }

    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn selection(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn committed(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn searching(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Lookup failures are errors, so their notice is framed in `error`.
    pub fn notice_border(&self) -> Style {
        Style::default().fg(self.error)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::SAFE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_is_the_default_theme_option() {
        assert_eq!(Theme::default().name, DEFAULT_THEME);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Theme::named("Dark"), Some(Theme::DARK));
        assert_eq!(Theme::named("LIGHT"), Some(Theme::LIGHT));
    }

    #[test]
    fn unknown_names_fall_back_to_safe() {
        assert_eq!(Theme::named("neon"), None);
        assert_eq!(Theme::resolve("neon"), Theme::SAFE);
        assert_eq!(Theme::check("neon"), Theme::SAFE);
    }

    #[test]
    fn notices_use_the_error_color() {
        assert_eq!(Theme::SAFE.notice_border().fg, Some(Color::Red));
        assert_eq!(Theme::DARK.notice_border().fg, Some(Theme::DARK.error));
        assert_ne!(Theme::LIGHT.notice_border(), Theme::LIGHT.searching());
    }
}

//! Help overlay: the field group's tool tip and the keybinding reference.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use postcode_core::options::DEFAULT_TOOL_TIP;

use crate::action::Action;
use crate::components::{centered_rect, Component};
use crate::theme::Theme;

pub struct HelpComponent {
    pub visible: bool,
    /// Usage hints of the focused field group.
    pub tool_tip: String,
}

impl HelpComponent {
    pub fn new() -> Self {
        Self {
            visible: false,
            tool_tip: DEFAULT_TOOL_TIP.to_string(),
        }
    }

    fn lines(&self, theme: &Theme) -> Vec<Line<'_>> {
        let mut lines: Vec<Line> = self
            .tool_tip
            .lines()
            .map(|l| Line::from(Span::styled(l, theme.normal())))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("── Keys ──", theme.header())));
        lines.push(key_line("Up / Down", "Highlight a match", theme));
        lines.push(key_line("Enter / click", "Fill locality, state and postcode", theme));
        lines.push(key_line("Esc", "Close the list and undo the edit", theme));
        lines.push(key_line("Tab / Shift+Tab", "Next / previous field group", theme));
        lines.push(key_line("F1", "Toggle this help", theme));
        lines.push(key_line("Ctrl+C / Ctrl+Q", "Quit", theme));
        lines
    }
}

impl Default for HelpComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HelpComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ToggleHelp => {
                self.visible = !self.visible;
                None
            }
            Action::DismissNotice | Action::Escape | Action::Confirm if self.visible => {
                self.visible = false;
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }

        let lines = self.lines(theme);
        let height = (lines.len() as u16 + 2).min(area.height);
        let dialog = centered_rect(area, 64.min(area.width), height);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Help ")
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_style(theme.focused_border());

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, dialog);
    }
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<18}", key), theme.selected()),
        Span::styled(desc, theme.normal()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_and_closes_on_dismiss() {
        let mut help = HelpComponent::new();
        help.handle_action(&Action::ToggleHelp);
        assert!(help.visible);

        help.handle_action(&Action::Tick);
        assert!(help.visible);

        help.handle_action(&Action::DismissNotice);
        assert!(!help.visible);
    }

    #[test]
    fn shows_the_tool_tip_first() {
        let mut help = HelpComponent::new();
        help.tool_tip = "Type three letters\nthen pick one".into();
        let lines = help.lines(&Theme::default());
        assert_eq!(lines[0].to_string(), "Type three letters");
        assert_eq!(lines[1].to_string(), "then pick one");
    }
}

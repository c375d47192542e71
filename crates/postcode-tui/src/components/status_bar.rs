//! Status bar at the bottom of the TUI.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
    /// Label of the focused field group and its controller state.
    pub badge: String,
}

impl StatusBarComponent {
    pub fn new() -> Self {
        Self {
            message: "Type at least 3 letters of a locality.".to_string(),
            badge: String::new(),
        }
    }

    fn line(&self, width: usize, theme: &Theme) -> Line<'_> {
        let hints = "F1·Tab·Esc";
        let hints_len = hints.chars().count() + 1;
        let badge_len = self.badge.chars().count() + 2;

        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(hints_len)
            .saturating_sub(4);

        let msg: String = if self.message.chars().count() > msg_budget {
            if msg_budget > 3 {
                let kept: String = self.message.chars().take(msg_budget - 3).collect();
                format!("{kept}...")
            } else {
                String::new()
            }
        } else {
            self.message.clone()
        };

        let used = badge_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + hints_len);

        Line::from(vec![
            Span::styled(format!(" {} ", self.badge), theme.muted()),
            Span::styled("  ", theme.dim()),
            Span::styled(msg, theme.dim()),
            Span::raw(" ".repeat(pad)),
            Span::styled(hints, theme.key_hint()),
            Span::raw(" "),
        ])
    }
}

impl Default for StatusBarComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        if let Action::SetStatus(msg) = action {
            self.message = msg.clone();
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let line = self.line(area.width as usize, theme);
        frame.render_widget(Paragraph::new(line), area);
    }
}

//! Notice dialog: modal overlay for lookup failures.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use postcode_core::Notice;

use crate::action::Action;
use crate::components::{centered_rect, Component};
use crate::theme::Theme;

#[derive(Default)]
pub struct NoticeDialogComponent {
    notice: Option<Notice>,
}

impl NoticeDialogComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> bool {
        self.notice.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

impl Component for NoticeDialogComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ShowNotice(notice) => {
                self.notice = Some(notice.clone());
                None
            }
            Action::DismissNotice | Action::Escape | Action::Confirm if self.visible() => {
                self.notice = None;
                Some(Action::SetStatus(String::new()))
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(notice) = &self.notice else {
            return;
        };

        let width = 56.min(area.width);
        let text_width = usize::from(width.saturating_sub(4)).max(1);
        let text_rows = notice
            .message
            .lines()
            .map(|l| l.chars().count().div_ceil(text_width).max(1))
            .sum::<usize>() as u16;
        let dialog_area = centered_rect(area, width, (text_rows + 5).min(area.height));

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(format!(" {} ", notice.title))
            .title_style(theme.title())
            .borders(Borders::ALL)
            .border_style(theme.notice_border());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Message
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

        let message = Paragraph::new(notice.message.as_str())
            .style(theme.normal())
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[1]);

        let instructions = Paragraph::new(Line::from(vec![
            Span::styled("[Enter/Esc]", theme.selected()),
            Span::styled(" close", theme.dim()),
        ]));
        frame.render_widget(instructions, chunks[2]);
    }
}

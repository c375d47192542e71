//! Field group view: the locality, state and postcode inputs of one
//! controller and its drop-down result panel.

use ratatui::layout::{Constraint, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use ratatui::Frame;

use postcode_core::{Bounds, ControllerState, FieldGroupController};

use crate::theme::Theme;

/// Rows taken by one field group: three inputs inside a border.
pub const GROUP_HEIGHT: u16 = 5;

const LABEL_WIDTH: u16 = 10;

pub fn to_bounds(rect: Rect) -> Bounds {
    Bounds::new(rect.x, rect.y, rect.width, rect.height)
}

pub fn to_rect(bounds: Bounds) -> Rect {
    Rect::new(bounds.x, bounds.y, bounds.width, bounds.height)
}

/// Draws one controller. Holds no state of its own.
pub struct FieldGroupView<'a> {
    pub label: &'a str,
    pub controller: &'a FieldGroupController,
    pub focused: bool,
}

impl<'a> FieldGroupView<'a> {
    pub fn new(label: &'a str, controller: &'a FieldGroupController, focused: bool) -> Self {
        Self {
            label,
            controller,
            focused,
        }
    }

    /// The locality input row inside a group area.
    pub fn locality_area(area: Rect) -> Rect {
        Rect::new(
            area.x.saturating_add(1),
            area.y.saturating_add(1),
            area.width.saturating_sub(2),
            1.min(area.height.saturating_sub(2)),
        )
    }

    pub fn theme(&self) -> Theme {
        Theme::resolve(&self.controller.options().theme)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme();
        let state = self.controller.state();

        let border = if self.focused {
            theme.focused_border()
        } else {
            theme.border()
        };
        let mut block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(if self.focused {
                theme.title()
            } else {
                theme.muted()
            })
            .borders(Borders::ALL)
            .border_style(border);
        if state == ControllerState::Searching {
            block = block.title_top(
                Line::from(Span::styled(" searching... ", theme.searching())).right_aligned(),
            );
        }

        let live = self.controller.field_group().live();
        let value_style = if state == ControllerState::Committed {
            theme.committed()
        } else {
            theme.normal()
        };

        let locality = if live.locality.is_empty() {
            Span::styled(
                self.controller.options().locality_placeholder.as_str(),
                theme.dim(),
            )
        } else {
            Span::styled(live.locality.as_str(), value_style)
        };

        let lines = vec![
            Line::from(vec![field_label("Locality", &theme), locality]),
            Line::from(vec![
                field_label("State", &theme),
                Span::styled(live.state.as_str(), value_style),
            ]),
            Line::from(vec![
                field_label("Postcode", &theme),
                Span::styled(live.postcode.as_str(), value_style),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if self.focused {
            let input = Self::locality_area(area);
            let typed = live.locality.chars().count() as u16;
            let x = input
                .x
                .saturating_add(LABEL_WIDTH)
                .saturating_add(typed)
                .min(input.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, input.y));
        }
    }

    /// Draw the result panel on top of everything drawn so far.
    pub fn render_panel(&self, frame: &mut Frame) {
        let panel = self.controller.panel();
        if !panel.is_visible() {
            return;
        }
        let area = to_rect(panel.bounds()).intersection(frame.area());
        if area.height < 3 || area.width < 3 {
            return;
        }
        let theme = self.theme();

        let rows: Vec<Row> = panel
            .rows()
            .iter()
            .enumerate()
            .skip(panel.offset())
            .take(panel.capacity())
            .map(|(i, record)| {
                let style = if panel.highlighted() == Some(i) {
                    theme.selection()
                } else {
                    theme.normal()
                };
                Row::new(vec![
                    Cell::from(record.locality.as_str()),
                    Cell::from(record.state.as_str()),
                    Cell::from(record.postcode.as_str()),
                ])
                .style(style)
            })
            .collect();

        let count = panel.rows().len();
        let title = match count {
            1 => " 1 match ".to_string(),
            n => format!(" {n} matches "),
        };
        let table = Table::new(
            rows,
            [
                Constraint::Min(10),
                Constraint::Length(4),
                Constraint::Length(8),
            ],
        )
        .block(
            Block::default()
                .title(title)
                .title_style(theme.muted())
                .borders(Borders::ALL)
                .border_style(theme.focused_border()),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(table, area);
    }
}

fn field_label<'a>(name: &'a str, theme: &Theme) -> Span<'a> {
    Span::styled(
        format!("{:<width$}", format!("{name}:"), width = LABEL_WIDTH as usize),
        theme.muted(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcode_core::{FieldGroupOptions, Keystroke, Locality};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::{Duration, Instant};

    fn controller() -> FieldGroupController {
        let options = FieldGroupOptions::default().with_fields(
            ("locality", "locality"),
            ("state", "state"),
            ("postcode", "postcode"),
        );
        FieldGroupController::attach("address", options).unwrap()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn empty_group_shows_the_placeholder() {
        let ctl = controller();
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|frame| {
                FieldGroupView::new("Address", &ctl, true).render(frame, Rect::new(0, 0, 60, 5))
            })
            .unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Address"));
        assert!(text.contains("Please enter locality"));
    }

    #[test]
    fn visible_panel_lists_results_below_the_locality_field() {
        let mut ctl = controller();
        let group = Rect::new(0, 0, 40, GROUP_HEIGHT);
        ctl.reposition(
            to_bounds(group),
            to_bounds(FieldGroupView::locality_area(group)),
            Bounds::new(0, 0, 40, 20),
        );

        let t0 = Instant::now();
        ctl.on_keystroke(Keystroke::Text("Rich".into()), t0);
        let request = ctl.poll(t0 + Duration::from_secs(1)).unwrap();
        ctl.on_lookup_success(
            request.seq,
            vec![
                Locality::new("RICHMOND", "TAS", "7025"),
                Locality::new("RICHMOND", "VIC", "3121"),
            ],
        );

        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        terminal
            .draw(|frame| {
                let view = FieldGroupView::new("Address", &ctl, true);
                view.render(frame, group);
                view.render_panel(frame);
            })
            .unwrap();

        let text = screen(&terminal);
        assert!(text.contains("2 matches"));
        assert!(text.contains("RICHMOND"));
        assert!(text.contains("3121"));
    }

    #[test]
    fn hidden_panel_draws_nothing() {
        let ctl = controller();
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal
            .draw(|frame| FieldGroupView::new("Address", &ctl, false).render_panel(frame))
            .unwrap();
        assert!(screen(&terminal).trim().is_empty());
    }
}

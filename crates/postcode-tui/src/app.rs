//! Main application state and render loop.

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::Terminal;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use postcode_core::{
    FieldGroupController, FieldGroupOptions, FieldGroupRegistry, Keystroke, LookupRequest,
};
use postcode_lookup::LookupClient;

use crate::action::{Action, InputMode};
use crate::components::field_group::{to_bounds, FieldGroupView, GROUP_HEIGHT};
use crate::components::help::HelpComponent;
use crate::components::notice_dialog::NoticeDialogComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};
use crate::theme::Theme;

/// How often the event handler emits a Tick, which is also the resolution of
/// the debounce timers.
const TICK_RATE: Duration = Duration::from_millis(100);

/// What the host keeps per attached field group besides its controller.
struct Hosted {
    label: String,
    client: Arc<dyn LookupClient>,
}

/// Main application state.
pub struct App {
    /// Whether the app should exit.
    should_quit: bool,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,

    /// Every attached controller, in attachment order.
    registry: FieldGroupRegistry,
    /// Label and lookup client per host.
    hosted: HashMap<String, Hosted>,
    /// Index of the focused field group.
    focused: usize,
    /// Last known terminal size.
    screen: Rect,

    // Components
    notice: NoticeDialogComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            input_mode_flag: event::new_input_mode_flag(),
            registry: FieldGroupRegistry::new(),
            hosted: HashMap::new(),
            focused: 0,
            screen: Rect::default(),
            notice: NoticeDialogComponent::new(),
            status_bar: StatusBarComponent::new(),
            help: HelpComponent::new(),
        }
    }

    /// Attach a field group under `host`. Attaching a host twice keeps the
    /// first controller and its client.
    pub fn attach(
        &mut self,
        host: &str,
        label: &str,
        options: FieldGroupOptions,
        client: Arc<dyn LookupClient>,
    ) -> anyhow::Result<()> {
        if self.registry.position(host).is_some() {
            warn!(host, "Field group already attached");
            return Ok(());
        }

        Theme::check(&options.theme);
        self.registry.attach(host, options)?;
        info!(host, lookup = client.name(), "Field group attached");
        self.hosted.insert(
            host.to_string(),
            Hosted {
                label: label.to_string(),
                client,
            },
        );
        self.layout(self.screen);
        self.sync_chrome();
        Ok(())
    }

    /// Detach the field group under `host`.
    pub fn detach(&mut self, host: &str) -> bool {
        if !self.registry.detach(host) {
            return false;
        }
        self.hosted.remove(host);
        self.focused = self.focused.min(self.registry.len().saturating_sub(1));
        self.layout(self.screen);
        self.sync_chrome();
        true
    }

    pub fn registry(&self) -> &FieldGroupRegistry {
        &self.registry
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Set up terminal.
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        self.layout(Rect::new(0, 0, size.width, size.height));

        // Create the action channel.
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

        let event_tx = tx.clone();
        let mode_flag = self.input_mode_flag.clone();
        let event_handler = EventHandler::new(event_tx, TICK_RATE, mode_flag);
        tokio::spawn(async move {
            event_handler.run().await;
        });

        self.sync_input_mode();

        // Main loop.
        loop {
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            if let Some(action) = rx.recv().await {
                self.handle_action(&action, &tx);

                if self.should_quit {
                    break;
                }
            }
        }

        for host in self.hosts() {
            self.detach(&host);
        }

        // Restore terminal.
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn hosts(&self) -> Vec<String> {
        self.registry.iter().map(|c| c.host().to_string()).collect()
    }

    fn sync_input_mode(&self) {
        event::set_input_mode(&self.input_mode_flag, self.current_input_mode());
    }

    /// Overlays take the keyboard; otherwise keys go to the focused field.
    fn current_input_mode(&self) -> InputMode {
        if self.help.visible || self.notice.visible() {
            InputMode::Normal
        } else {
            InputMode::Editing
        }
    }

    fn focused_mut(&mut self) -> Option<&mut FieldGroupController> {
        self.registry.by_index_mut(self.focused)
    }

    /// Dispatch an action.
    fn handle_action(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Action>) {
        let overlay_open = self.current_input_mode() == InputMode::Normal;

        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::Tick => self.poll_lookups(tx),
            Action::Resize { width, height } => {
                self.layout(Rect::new(0, 0, *width, *height));
            }
            Action::LookupSucceeded { host, seq, results } => {
                self.apply_success(host, *seq, results.clone());
            }
            Action::LookupFailed { host, seq, message } => {
                if let Some(notice) = self.apply_failure(host, *seq, message.clone()) {
                    self.handle_action(&Action::ShowNotice(notice), tx);
                }
            }
            _ if overlay_open => {}
            Action::CharInput(c) => self.edit(|text| text.push(*c)),
            Action::BackspaceInput => self.edit(|text| {
                text.pop();
            }),
            Action::DeleteWord => self.edit(|text| {
                let kept = text.trim_end().rfind(' ').map_or(0, |i| i + 1);
                text.truncate(kept);
            }),
            Action::PasteBulk(pasted) => self.edit(|text| {
                text.extend(pasted.chars().filter(|c| !c.is_control()));
            }),
            Action::Escape => {
                if let Some(ctl) = self.focused_mut() {
                    ctl.on_keystroke(Keystroke::Escape, Instant::now());
                }
            }
            Action::NextField => self.move_focus(1),
            Action::PrevField => self.move_focus(-1),
            Action::ScrollUp => {
                if let Some(ctl) = self.focused_mut() {
                    ctl.panel_mut().highlight_prev();
                }
            }
            Action::ScrollDown => {
                if let Some(ctl) = self.focused_mut() {
                    ctl.panel_mut().highlight_next();
                }
            }
            Action::Confirm => {
                if let Some(ctl) = self.focused_mut() {
                    if ctl.activate_highlighted() {
                        let status = selected_status(ctl);
                        self.status_bar.message = status;
                    }
                }
            }
            Action::Click { column, row } => self.click(*column, *row),
            _ => {}
        }

        // Overlays and the status bar see every action. The input mode is
        // read before they react so the key that closes an overlay does not
        // also reach a field.
        let chained = [
            self.notice.handle_action(action),
            self.help.handle_action(action),
            self.status_bar.handle_action(action),
        ];

        self.sync_chrome();
        self.sync_input_mode();

        for chained in chained.into_iter().flatten() {
            self.handle_action(&chained, tx);
        }
    }

    /// Apply a text edit to the focused locality field and report the
    /// resulting text as a keystroke.
    fn edit(&mut self, apply: impl FnOnce(&mut String)) {
        let Some(ctl) = self.focused_mut() else {
            return;
        };
        let mut text = ctl.field_group().live().locality.clone();
        apply(&mut text);
        ctl.on_keystroke(Keystroke::Text(text), Instant::now());
    }

    /// Move focus by `step` groups. The locality field being left is blurred.
    fn move_focus(&mut self, step: isize) {
        let len = self.registry.len();
        if len == 0 {
            return;
        }
        if let Some(ctl) = self.focused_mut() {
            ctl.on_locality_blur();
        }
        self.focused = (self.focused as isize + step).rem_euclid(len as isize) as usize;
    }

    fn click(&mut self, column: u16, row: u16) {
        // A visible panel overlays the groups below it, so rows win.
        let hit = self
            .registry
            .iter()
            .enumerate()
            .find_map(|(i, ctl)| ctl.panel().row_at(column, row).map(|r| (i, r)));
        if let Some((index, row_index)) = hit {
            self.focus(index);
            if let Some(ctl) = self.registry.by_index_mut(index) {
                if ctl.activate_row(row_index) {
                    let status = selected_status(ctl);
                    self.status_bar.message = status;
                }
            }
            return;
        }

        let target = self
            .group_areas()
            .iter()
            .position(|area| to_bounds(*area).contains(column, row));
        if let Some(index) = target {
            self.focus(index);
        }
    }

    fn focus(&mut self, index: usize) {
        if index != self.focused {
            if let Some(ctl) = self.focused_mut() {
                ctl.on_locality_blur();
            }
            self.focused = index;
        }
    }

    /// Fire every debounce timer that has run out.
    fn poll_lookups(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        let now = Instant::now();
        let requests: Vec<LookupRequest> = self
            .registry
            .iter_mut()
            .filter_map(|ctl| ctl.poll(now))
            .collect();
        for request in requests {
            self.spawn_lookup(request, tx.clone());
        }
    }

    /// Run one lookup on a task; the reply comes back as an action tagged
    /// with the request's host and sequence number.
    fn spawn_lookup(&self, request: LookupRequest, tx: mpsc::UnboundedSender<Action>) {
        let Some(hosted) = self.hosted.get(&request.host) else {
            warn!(host = %request.host, "Lookup for unknown host dropped");
            return;
        };
        let client = hosted.client.clone();
        let _ = tx.send(Action::SetStatus(format!("Searching '{}'...", request.query)));

        tokio::spawn(async move {
            let LookupRequest { host, seq, query } = request;
            let action = match client.search(&query).await {
                Ok(results) => {
                    info!(%host, seq, count = results.len(), "Lookup finished");
                    Action::LookupSucceeded { host, seq, results }
                }
                Err(e) => {
                    warn!(%host, seq, "Lookup failed: {}", e);
                    Action::LookupFailed {
                        host,
                        seq,
                        message: e.user_message(),
                    }
                }
            };
            let _ = tx.send(action);
        });
    }

    fn apply_success(&mut self, host: &str, seq: u64, results: Vec<postcode_core::Locality>) {
        let count = results.len();
        let Some(ctl) = self.registry.get_mut(host) else {
            debug!(host, seq, "Reply for detached host dropped");
            return;
        };
        if ctl.on_lookup_success(seq, results) {
            self.status_bar.message = match count {
                1 => "1 locality found".to_string(),
                n => format!("{n} localities found"),
            };
        }
    }

    fn apply_failure(
        &mut self,
        host: &str,
        seq: u64,
        message: Option<String>,
    ) -> Option<postcode_core::Notice> {
        let Some(ctl) = self.registry.get_mut(host) else {
            debug!(host, seq, "Failure for detached host dropped");
            return None;
        };
        let notice = ctl.on_lookup_failure(seq, message)?;
        self.status_bar.message.clear();
        Some(notice)
    }

    /// Areas of the field groups, stacked from the top of `screen`.
    fn group_areas(&self) -> Vec<Rect> {
        group_areas(content_area(self.screen), self.registry.len())
    }

    /// Recompute every panel position for a new screen size.
    fn layout(&mut self, screen: Rect) {
        self.screen = screen;
        let viewport = to_bounds(content_area(screen));
        let areas = self.group_areas();
        for (ctl, area) in self.registry.iter_mut().zip(areas) {
            ctl.reposition(
                to_bounds(area),
                to_bounds(FieldGroupView::locality_area(area)),
                viewport,
            );
        }
    }

    /// Point the help overlay and the status badge at the focused group.
    fn sync_chrome(&mut self) {
        let Some(ctl) = self.registry.by_index(self.focused) else {
            self.status_bar.badge.clear();
            return;
        };
        let label = self
            .hosted
            .get(ctl.host())
            .map_or(ctl.host(), |h| h.label.as_str());
        self.status_bar.badge = format!("{label} · {}", ctl.state());
        self.help.tool_tip.clone_from(&ctl.options().tool_tip);
    }

    fn theme(&self) -> Theme {
        self.registry
            .by_index(self.focused)
            .map_or_else(Theme::default, |ctl| Theme::resolve(&ctl.options().theme))
    }

    /// Render the full UI.
    fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let theme = self.theme();

        let chunks = Layout::vertical([
            Constraint::Min(1),    // Field groups
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        let areas = group_areas(chunks[0], self.registry.len());
        let views: Vec<FieldGroupView> = self
            .registry
            .iter()
            .enumerate()
            .map(|(i, ctl)| {
                let label = self
                    .hosted
                    .get(ctl.host())
                    .map_or(ctl.host(), |h| h.label.as_str());
                FieldGroupView::new(label, ctl, i == self.focused)
            })
            .collect();

        for (view, area) in views.iter().zip(&areas) {
            view.render(frame, *area);
        }
        // Panels drop down over the groups below them.
        for view in &views {
            view.render_panel(frame);
        }

        self.status_bar.render(frame, chunks[1], &theme);

        // Overlays (rendered on top)
        self.notice.render(frame, area, &theme);
        self.help.render(frame, area, &theme);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn selected_status(ctl: &FieldGroupController) -> String {
    let live = ctl.field_group().live();
    format!(
        "Selected {} {} {}",
        live.locality, live.state, live.postcode
    )
}

/// Everything above the status bar.
fn content_area(screen: Rect) -> Rect {
    Rect::new(
        screen.x,
        screen.y,
        screen.width,
        screen.height.saturating_sub(1),
    )
}

/// Stack `count` field groups of [`GROUP_HEIGHT`] rows from the top of `area`.
fn group_areas(area: Rect, count: usize) -> Vec<Rect> {
    let mut constraints = vec![Constraint::Length(GROUP_HEIGHT); count];
    constraints.push(Constraint::Min(0));
    let chunks = Layout::vertical(constraints).split(area);
    chunks.iter().take(count).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use postcode_core::{ControllerState, Locality, PostcodePool};
    use postcode_lookup::{LookupError, OfflineLookupClient};

    struct Unreachable;

    #[async_trait]
    impl LookupClient for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn search(&self, _query: &str) -> Result<Vec<Locality>, LookupError> {
            Err(LookupError::Network("connection refused".into()))
        }
    }

    fn options() -> FieldGroupOptions {
        let mut options = FieldGroupOptions::default().with_fields(
            ("locality", "locality"),
            ("state", "state"),
            ("postcode", "postcode"),
        );
        options.key_stroke_delay = Duration::ZERO;
        options
    }

    fn offline() -> Arc<dyn LookupClient> {
        Arc::new(OfflineLookupClient::new(Arc::new(PostcodePool::from_records(
            vec![
                Locality::new("RICHMOND", "VIC", "3121"),
                Locality::new("RICHMOND", "TAS", "7025"),
            ],
        ))))
    }

    fn app() -> App {
        let mut app = App::new();
        app.layout(Rect::new(0, 0, 60, 30));
        app.attach("home", "Residential", options(), offline()).unwrap();
        app.attach("post", "Postal", options(), offline()).unwrap();
        app
    }

    fn type_text(app: &mut App, tx: &mpsc::UnboundedSender<Action>, text: &str) {
        for c in text.chars() {
            app.handle_action(&Action::CharInput(c), tx);
        }
    }

    /// Feed back every action the app sent itself until a lookup reply shows up.
    async fn pump_until_reply(
        app: &mut App,
        tx: &mpsc::UnboundedSender<Action>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) {
        loop {
            let action = rx.recv().await.unwrap();
            let is_reply = matches!(
                action,
                Action::LookupSucceeded { .. } | Action::LookupFailed { .. }
            );
            app.handle_action(&action, tx);
            if is_reply {
                break;
            }
        }
    }

    #[test]
    fn groups_are_stacked_and_panels_positioned() {
        let app = app();
        let areas = app.group_areas();
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[1].y, GROUP_HEIGHT);

        let panel = app.registry().by_index(0).unwrap().panel().bounds();
        assert_eq!(panel.y, 2);
        assert_eq!(panel.width, 60);
    }

    #[test]
    fn resize_moves_and_shrinks_every_panel() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();
        let before = app.registry().by_index(1).unwrap().panel().bounds();
        assert_eq!((before.y, before.height), (7, 5));

        app.handle_action(
            &Action::Resize {
                width: 60,
                height: 12,
            },
            &tx,
        );

        // 11 content rows: the first panel gets a quarter of the 9 rows under
        // its locality field and the second a quarter of 4, both raised to 3.
        let first = app.registry().by_index(0).unwrap().panel().bounds();
        assert_eq!((first.y, first.height, first.width), (2, 3, 60));
        let second = app.registry().by_index(1).unwrap().panel().bounds();
        assert_eq!((second.y, second.height, second.width), (7, 3, 60));
        assert!(second.bottom() <= 11);
    }

    #[test]
    fn attaching_a_host_twice_keeps_one_group() {
        let mut app = app();
        app.attach("home", "Again", options(), offline()).unwrap();
        assert_eq!(app.registry().len(), 2);
        assert_eq!(app.hosted["home"].label, "Residential");
    }

    #[tokio::test]
    async fn typing_then_enter_commits_the_first_match() {
        let mut app = app();
        let (tx, mut rx) = mpsc::unbounded_channel();

        type_text(&mut app, &tx, "rich");
        app.handle_action(&Action::Tick, &tx);
        pump_until_reply(&mut app, &tx, &mut rx).await;

        let ctl = app.registry().get("home").unwrap();
        assert_eq!(ctl.state(), ControllerState::ShowingResults);
        assert_eq!(ctl.panel().rows().len(), 2);

        app.handle_action(&Action::ScrollDown, &tx);
        app.handle_action(&Action::Confirm, &tx);

        let ctl = app.registry().get("home").unwrap();
        assert_eq!(ctl.state(), ControllerState::Committed);
        assert_eq!(ctl.field_group().live().state, "VIC");
        assert_eq!(ctl.field_group().live().postcode, "3121");
        assert!(app.status_bar.message.contains("3121"));
    }

    #[tokio::test]
    async fn failed_lookup_opens_a_notice_that_blocks_typing() {
        let mut app = App::new();
        app.layout(Rect::new(0, 0, 60, 30));
        app.attach("home", "Residential", options(), Arc::new(Unreachable))
            .unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        type_text(&mut app, &tx, "rich");
        app.handle_action(&Action::Tick, &tx);
        pump_until_reply(&mut app, &tx, &mut rx).await;

        assert!(app.notice.visible());
        assert_eq!(
            app.notice.notice().unwrap().message,
            "Something has happened. Please check server."
        );
        assert_eq!(app.current_input_mode(), InputMode::Normal);

        app.handle_action(&Action::CharInput('x'), &tx);
        let ctl = app.registry().get("home").unwrap();
        assert_eq!(ctl.field_group().live().locality, "rich");
        assert_eq!(ctl.state(), ControllerState::Idle);

        app.handle_action(&Action::DismissNotice, &tx);
        assert!(!app.notice.visible());
        assert_eq!(app.current_input_mode(), InputMode::Editing);
    }

    #[test]
    fn tab_blurs_an_empty_locality_and_moves_focus() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();

        type_text(&mut app, &tx, "ri");
        app.handle_action(&Action::BackspaceInput, &tx);
        app.handle_action(&Action::BackspaceInput, &tx);
        app.handle_action(&Action::NextField, &tx);

        assert_eq!(app.focused, 1);
        let home = app.registry().get("home").unwrap();
        assert!(home.field_group().committed().is_none());

        app.handle_action(&Action::NextField, &tx);
        assert_eq!(app.focused, 0);
    }

    #[test]
    fn clicking_a_group_focuses_it() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();

        app.handle_action(&Action::Click { column: 3, row: GROUP_HEIGHT + 1 }, &tx);
        assert_eq!(app.focused, 1);
        assert!(app.status_bar.badge.starts_with("Postal"));
    }

    #[test]
    fn ctrl_w_deletes_the_last_word() {
        let mut app = app();
        let (tx, _rx) = mpsc::unbounded_channel();

        type_text(&mut app, &tx, "alice spr");
        app.handle_action(&Action::DeleteWord, &tx);
        let ctl = app.registry().get("home").unwrap();
        assert_eq!(ctl.field_group().live().locality, "alice ");
    }
}

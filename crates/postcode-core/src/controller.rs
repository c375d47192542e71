//! The field-group controller.
//!
//! One controller owns a locality / state / postcode triple and its result
//! panel. It turns keystrokes into debounced lookups, applies lookup replies,
//! and commits or reverts the field values. It performs no I/O: lookups and
//! notices are handed back to the caller as [`LookupRequest`] and [`Notice`]
//! values, and replies come back tagged with the request's sequence number.

use std::time::Instant;

use tracing::debug;

use crate::debounce::Debouncer;
use crate::error::{PostcodeError, Result};
use crate::locality::{FieldGroup, Locality};
use crate::options::{FieldGroupOptions, OptionKey};
use crate::panel::{panel_bounds, Bounds, ResultPanel};

/// Fewer characters than this never trigger a lookup.
pub const MIN_QUERY_CHARS: usize = 3;

/// Title of the notice raised when a lookup fails.
pub const NOTICE_TITLE: &str = "For your info...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Searching,
    ShowingResults,
    Committed,
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerState::Idle => write!(f, "Idle"),
            ControllerState::Searching => write!(f, "Searching"),
            ControllerState::ShowingResults => write!(f, "Results"),
            ControllerState::Committed => write!(f, "Committed"),
        }
    }
}

/// A key released in the locality field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    Escape,
    /// Any other key; carries the locality text after the key was applied.
    Text(String),
}

/// A lookup the host must run and report back with the same `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub host: String,
    pub seq: u64,
    pub query: String,
}

/// A message the host must surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    group: Bounds,
    locality: Bounds,
    viewport: Bounds,
}

pub struct FieldGroupController {
    host: String,
    options: FieldGroupOptions,
    fields: FieldGroup,
    panel: ResultPanel,
    state: ControllerState,
    debouncer: Debouncer<String>,
    /// Last sequence number handed out.
    last_seq: u64,
    /// Sequence number whose reply is still wanted.
    in_flight: Option<u64>,
    layout: Option<Layout>,
}

impl FieldGroupController {
    /// Attach a new field group to `host`.
    pub fn attach(host: impl Into<String>, options: FieldGroupOptions) -> Result<Self> {
        options.validate()?;
        let host = host.into();
        let panel = ResultPanel::new();
        debug!(host = %host, panel = panel.id(), "Field group attached");

        Ok(Self {
            debouncer: Debouncer::new(options.key_stroke_delay),
            host,
            options,
            fields: FieldGroup::new(),
            panel,
            state: ControllerState::Idle,
            last_seq: 0,
            in_flight: None,
            layout: None,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn field_group(&self) -> &FieldGroup {
        &self.fields
    }

    pub fn panel(&self) -> &ResultPanel {
        &self.panel
    }

    /// Mutable access for row highlighting. Rows themselves only change
    /// through lookup replies.
    pub fn panel_mut(&mut self) -> &mut ResultPanel {
        &mut self.panel
    }

    pub fn options(&self) -> &FieldGroupOptions {
        &self.options
    }

    /// Query waiting for the debounce period to pass.
    pub fn pending_search(&self) -> Option<&str> {
        self.debouncer.pending().map(String::as_str)
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Change one option on the live controller.
    ///
    /// The lookup client is built from `url` at attach time, so `url` is
    /// refused here.
    pub fn set_option(&mut self, key: OptionKey, value: &str) -> Result<()> {
        if key == OptionKey::Url {
            return Err(PostcodeError::InvalidOption {
                key: key.name().to_string(),
                reason: "can only be set before the field group is attached".to_string(),
            });
        }
        self.options.set(key, value)?;
        match key {
            OptionKey::KeyStrokeDelay => self.debouncer.set_delay(self.options.key_stroke_delay),
            OptionKey::ResultPanelHeight | OptionKey::GlowWidth => self.apply_layout(),
            _ => {}
        }
        debug!(host = %self.host, option = %key, "Option changed");
        Ok(())
    }

    pub fn on_keystroke(&mut self, key: Keystroke, now: Instant) {
        match key {
            Keystroke::Escape => self.escape(),
            Keystroke::Text(text) => self.edit(text, now),
        }
    }

    fn escape(&mut self) {
        self.debouncer.cancel();
        self.in_flight = None;
        self.fields.revert();
        self.panel.close();

        let next = match self.state {
            ControllerState::ShowingResults | ControllerState::Searching => {
                if self.fields.committed().is_some() {
                    ControllerState::Committed
                } else {
                    ControllerState::Idle
                }
            }
            ControllerState::Committed | ControllerState::Idle => ControllerState::Idle,
        };
        self.transition(next);
    }

    fn edit(&mut self, text: String, now: Instant) {
        self.fields.edit_locality(&text);
        if self.state == ControllerState::Committed {
            self.transition(ControllerState::Idle);
        }

        if text.chars().count() < MIN_QUERY_CHARS {
            // The last keystroke wins: a shorter text withdraws both the
            // pending search and the one already sent.
            self.debouncer.cancel();
            self.in_flight = None;
            if self.state == ControllerState::Searching {
                self.transition(ControllerState::Idle);
            }
            return;
        }
        self.debouncer.trigger(text, now);
    }

    /// Advance the debounce timer. Returns the lookup to run once the quiet
    /// period after the last qualifying keystroke has passed.
    pub fn poll(&mut self, now: Instant) -> Option<LookupRequest> {
        let query = self.debouncer.poll(now)?;

        self.last_seq += 1;
        self.in_flight = Some(self.last_seq);
        self.panel.hide();
        self.transition(ControllerState::Searching);

        debug!(host = %self.host, seq = self.last_seq, query = %query, "Lookup issued");
        Some(LookupRequest {
            host: self.host.clone(),
            seq: self.last_seq,
            query,
        })
    }

    /// Whether a reply tagged `seq` is still wanted.
    fn accepts(&self, seq: u64) -> bool {
        self.in_flight == Some(seq) && self.state == ControllerState::Searching
    }

    /// Apply a successful lookup. Returns `false` when the reply is stale.
    pub fn on_lookup_success(&mut self, seq: u64, results: Vec<Locality>) -> bool {
        if !self.accepts(seq) {
            debug!(host = %self.host, seq, "Stale lookup reply dropped");
            return false;
        }
        self.in_flight = None;

        debug!(host = %self.host, seq, count = results.len(), "Lookup succeeded");
        self.panel.render(results);
        self.panel.show();
        self.transition(ControllerState::ShowingResults);
        true
    }

    /// Apply a failed lookup. Returns the notice to show, or `None` when the
    /// reply is stale.
    pub fn on_lookup_failure(&mut self, seq: u64, message: Option<String>) -> Option<Notice> {
        if !self.accepts(seq) {
            debug!(host = %self.host, seq, "Stale lookup failure dropped");
            return None;
        }
        self.in_flight = None;
        self.transition(ControllerState::Idle);

        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.options.error_msg.clone());
        Some(Notice {
            title: NOTICE_TITLE.to_string(),
            message,
        })
    }

    /// Commit `record` into all three fields.
    pub fn on_row_activated(&mut self, record: &Locality) {
        self.debouncer.cancel();
        self.in_flight = None;
        self.fields.commit(record);
        self.panel.close();
        debug!(host = %self.host, record = %record, "Row committed");
        self.transition(ControllerState::Committed);
    }

    /// Commit the panel row at `index`. Returns `false` when the panel shows
    /// no such row.
    pub fn activate_row(&mut self, index: usize) -> bool {
        let Some(record) = self.panel.row(index).cloned() else {
            return false;
        };
        self.on_row_activated(&record);
        true
    }

    /// Commit the highlighted panel row, if any.
    pub fn activate_highlighted(&mut self) -> bool {
        match self.panel.highlighted() {
            Some(index) => self.activate_row(index),
            None => false,
        }
    }

    /// Focus left the locality field.
    pub fn on_locality_blur(&mut self) {
        if !self.fields.live().locality.is_empty() {
            return;
        }
        self.debouncer.cancel();
        self.in_flight = None;
        self.fields.reset();
        self.panel.close();
        self.transition(ControllerState::Idle);
    }

    /// Recompute where the result panel goes.
    pub fn reposition(&mut self, group: Bounds, locality: Bounds, viewport: Bounds) {
        self.layout = Some(Layout {
            group,
            locality,
            viewport,
        });
        self.apply_layout();
    }

    fn apply_layout(&mut self) {
        if let Some(layout) = self.layout {
            self.panel.set_bounds(panel_bounds(
                layout.group,
                layout.locality,
                layout.viewport,
                self.options.glow_width,
                self.options.result_panel_height,
            ));
        }
    }

    /// Tear the controller down. Nothing outlives it.
    pub fn teardown(mut self) {
        self.debouncer.cancel();
        self.panel.close();
        debug!(host = %self.host, "Field group detached");
    }

    fn transition(&mut self, next: ControllerState) {
        if self.state != next {
            debug!(host = %self.host, from = %self.state, to = %next, "State change");
            self.state = next;
        }
    }
}

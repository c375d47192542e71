//! Action enum, the central message bus for the TUI.
//! Terminal input and lookup replies all flow through here.

use postcode_core::{Locality, Notice};

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle the help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// A tick event; drives the debounce timers.
    Tick,
    /// The terminal was resized.
    Resize { width: u16, height: u16 },

    // ── Text Input ───────────────────────────────────────────
    /// A character was typed into the focused locality field.
    CharInput(char),
    /// Backspace pressed.
    BackspaceInput,
    /// Delete word (Ctrl+W).
    DeleteWord,
    /// Bulk paste from bracketed paste mode.
    PasteBulk(String),
    /// Escape pressed.
    Escape,
    /// Move focus to the next field group (Tab).
    NextField,
    /// Move focus to the previous field group (Shift+Tab).
    PrevField,

    // ── Result panel ────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    Confirm,
    /// Left mouse button pressed at a screen position.
    Click { column: u16, row: u16 },

    // ── Lookups ─────────────────────────────────────────────
    /// A lookup finished with results.
    LookupSucceeded {
        host: String,
        seq: u64,
        results: Vec<Locality>,
    },
    /// A lookup failed; `message` is the server's description, if any.
    LookupFailed {
        host: String,
        seq: u64,
        message: Option<String>,
    },

    // ── Notices ─────────────────────────────────────────────
    ShowNotice(Notice),
    DismissNotice,
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the focused locality field instead of interpreted as
/// global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode: an overlay is open and keys are shortcuts.
    Normal,
    /// Text input mode: keys go to the focused locality field.
    Editing,
}

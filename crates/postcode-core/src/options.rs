//! Field-group options and the table of named setters.
//!
//! Every option has an external name (the one used in config overrides and
//! on the command line) and a typed setter that parses and validates the raw
//! string before storing it.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{PostcodeError, Result};

pub const DEFAULT_URL: &str = "http://localhost:5000/api/v0/aust-postcode/";
pub const DEFAULT_KEY_STROKE_DELAY_MS: u64 = 500;
pub const DEFAULT_RESULT_PANEL_HEIGHT: u8 = 25;
pub const DEFAULT_PLACEHOLDER: &str = "Please enter locality / suburb name...";
pub const DEFAULT_ERROR_MSG: &str = "Something has happened. Please check server.";
pub const DEFAULT_THEME: &str = "safe";
pub const DEFAULT_TOOL_TIP: &str = "\
Type 3 or more characters into locality to begin searching.
By default, there's a 500 millisecond delay since the last keystroke when searching starts.
Click on a result row to select locality, state and postcode.
Press ESC to cancel current / close search result.
If there were a previous selection, press ESC will reverse to this selection.
Clear out locality and move away from it, will clear out state and postcode also.";

/// Make sure a base URL ends with exactly one trailing `/` so a query can be
/// appended as the last path segment.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Every configurable option of a field group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Url,
    KeyStrokeDelay,
    ToolTip,
    GlowWidth,
    ResultPanelHeight,
    LocalityName,
    LocalityId,
    LocalityPlaceHolder,
    StateName,
    StateId,
    PostcodeName,
    PostcodeId,
    ErrorMsg,
    Theme,
}

impl OptionKey {
    pub fn all() -> &'static [OptionKey] {
        &[
            OptionKey::Url,
            OptionKey::KeyStrokeDelay,
            OptionKey::ToolTip,
            OptionKey::GlowWidth,
            OptionKey::ResultPanelHeight,
            OptionKey::LocalityName,
            OptionKey::LocalityId,
            OptionKey::LocalityPlaceHolder,
            OptionKey::StateName,
            OptionKey::StateId,
            OptionKey::PostcodeName,
            OptionKey::PostcodeId,
            OptionKey::ErrorMsg,
            OptionKey::Theme,
        ]
    }

    /// External option name.
    pub fn name(&self) -> &'static str {
        match self {
            OptionKey::Url => "url",
            OptionKey::KeyStrokeDelay => "keyStrokeDelay",
            OptionKey::ToolTip => "toolTip",
            OptionKey::GlowWidth => "glowWidth",
            OptionKey::ResultPanelHeight => "resultPanelHeight",
            OptionKey::LocalityName => "localityName",
            OptionKey::LocalityId => "localityId",
            OptionKey::LocalityPlaceHolder => "localityPlaceHolder",
            OptionKey::StateName => "stateName",
            OptionKey::StateId => "stateId",
            OptionKey::PostcodeName => "postcodeName",
            OptionKey::PostcodeId => "postcodeId",
            OptionKey::ErrorMsg => "errorMsg",
            OptionKey::Theme => "theme",
        }
    }
}

impl FromStr for OptionKey {
    type Err = PostcodeError;

    fn from_str(s: &str) -> Result<Self> {
        OptionKey::all()
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PostcodeError::UnknownOption(s.to_string()))
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Options a field group is attached with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroupOptions {
    /// Base URL of the postcode API, always ending in `/`.
    pub url: String,

    /// Quiet period after the last keystroke before a search starts.
    pub key_stroke_delay: Duration,

    /// Usage hints shown by the help overlay.
    pub tool_tip: String,

    /// Extra rows between the locality field and the result panel.
    pub glow_width: u16,

    /// Result panel height as a percentage of the space below the fields.
    pub result_panel_height: u8,

    pub locality_name: Option<String>,
    pub locality_id: Option<String>,
    pub locality_placeholder: String,
    pub state_name: Option<String>,
    pub state_id: Option<String>,
    pub postcode_name: Option<String>,
    pub postcode_id: Option<String>,

    /// Shown when a lookup fails without a description of its own.
    pub error_msg: String,

    pub theme: String,
}

impl Default for FieldGroupOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            key_stroke_delay: Duration::from_millis(DEFAULT_KEY_STROKE_DELAY_MS),
            tool_tip: DEFAULT_TOOL_TIP.to_string(),
            glow_width: 0,
            result_panel_height: DEFAULT_RESULT_PANEL_HEIGHT,
            locality_name: None,
            locality_id: None,
            locality_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            state_name: None,
            state_id: None,
            postcode_name: None,
            postcode_id: None,
            error_msg: DEFAULT_ERROR_MSG.to_string(),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl FieldGroupOptions {
    /// Set the name and id of all three fields at once.
    pub fn with_fields(
        mut self,
        locality: (&str, &str),
        state: (&str, &str),
        postcode: (&str, &str),
    ) -> Self {
        self.locality_name = Some(locality.0.to_string());
        self.locality_id = Some(locality.1.to_string());
        self.state_name = Some(state.0.to_string());
        self.state_id = Some(state.1.to_string());
        self.postcode_name = Some(postcode.0.to_string());
        self.postcode_id = Some(postcode.1.to_string());
        self
    }

    /// Check that every field has a name and an id.
    pub fn validate(&self) -> Result<()> {
        let required = [
            (OptionKey::LocalityName, &self.locality_name),
            (OptionKey::LocalityId, &self.locality_id),
            (OptionKey::StateName, &self.state_name),
            (OptionKey::StateId, &self.state_id),
            (OptionKey::PostcodeName, &self.postcode_name),
            (OptionKey::PostcodeId, &self.postcode_id),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(key, _)| key.name())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PostcodeError::Config(format!(
                "missing field identifiers: {}",
                missing.join(", ")
            )))
        }
    }

    /// Parse `value` and store it under `key`.
    pub fn set(&mut self, key: OptionKey, value: &str) -> Result<()> {
        match key {
            OptionKey::Url => self.set_url(value),
            OptionKey::KeyStrokeDelay => self.set_key_stroke_delay(value),
            OptionKey::ToolTip => {
                self.tool_tip = value.to_string();
                Ok(())
            }
            OptionKey::GlowWidth => self.set_glow_width(value),
            OptionKey::ResultPanelHeight => self.set_result_panel_height(value),
            OptionKey::LocalityName => set_identifier(&mut self.locality_name, key, value),
            OptionKey::LocalityId => set_identifier(&mut self.locality_id, key, value),
            OptionKey::LocalityPlaceHolder => {
                self.locality_placeholder = value.to_string();
                Ok(())
            }
            OptionKey::StateName => set_identifier(&mut self.state_name, key, value),
            OptionKey::StateId => set_identifier(&mut self.state_id, key, value),
            OptionKey::PostcodeName => set_identifier(&mut self.postcode_name, key, value),
            OptionKey::PostcodeId => set_identifier(&mut self.postcode_id, key, value),
            OptionKey::ErrorMsg => {
                self.error_msg = value.to_string();
                Ok(())
            }
            OptionKey::Theme => self.set_theme(value),
        }
    }

    /// Parse a `name=value` pair and apply it.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<OptionKey> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            PostcodeError::Config(format!("expected name=value, got '{assignment}'"))
        })?;
        let key: OptionKey = name.parse()?;
        self.set(key, value)?;
        Ok(key)
    }

    /// Current value of `key` rendered as text.
    pub fn get(&self, key: OptionKey) -> String {
        match key {
            OptionKey::Url => self.url.clone(),
            OptionKey::KeyStrokeDelay => self.key_stroke_delay.as_millis().to_string(),
            OptionKey::ToolTip => self.tool_tip.clone(),
            OptionKey::GlowWidth => self.glow_width.to_string(),
            OptionKey::ResultPanelHeight => self.result_panel_height.to_string(),
            OptionKey::LocalityName => self.locality_name.clone().unwrap_or_default(),
            OptionKey::LocalityId => self.locality_id.clone().unwrap_or_default(),
            OptionKey::LocalityPlaceHolder => self.locality_placeholder.clone(),
            OptionKey::StateName => self.state_name.clone().unwrap_or_default(),
            OptionKey::StateId => self.state_id.clone().unwrap_or_default(),
            OptionKey::PostcodeName => self.postcode_name.clone().unwrap_or_default(),
            OptionKey::PostcodeId => self.postcode_id.clone().unwrap_or_default(),
            OptionKey::ErrorMsg => self.error_msg.clone(),
            OptionKey::Theme => self.theme.clone(),
        }
    }

    fn set_url(&mut self, value: &str) -> Result<()> {
        let trimmed = value.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(invalid(OptionKey::Url, "must start with http:// or https://"));
        }
        self.url = normalize_base_url(trimmed);
        Ok(())
    }

    fn set_key_stroke_delay(&mut self, value: &str) -> Result<()> {
        let millis: u64 = value
            .trim()
            .parse()
            .map_err(|_| invalid(OptionKey::KeyStrokeDelay, "expected milliseconds"))?;
        self.key_stroke_delay = Duration::from_millis(millis);
        Ok(())
    }

    fn set_glow_width(&mut self, value: &str) -> Result<()> {
        self.glow_width = value
            .trim()
            .parse()
            .map_err(|_| invalid(OptionKey::GlowWidth, "expected a row count"))?;
        Ok(())
    }

    fn set_result_panel_height(&mut self, value: &str) -> Result<()> {
        let percent: u8 = value
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| invalid(OptionKey::ResultPanelHeight, "expected a percentage"))?;
        if !(1..=100).contains(&percent) {
            return Err(invalid(
                OptionKey::ResultPanelHeight,
                "must be between 1 and 100",
            ));
        }
        self.result_panel_height = percent;
        Ok(())
    }

    fn set_theme(&mut self, value: &str) -> Result<()> {
        let theme = value.trim();
        if theme.is_empty() || theme.contains(char::is_whitespace) {
            return Err(invalid(OptionKey::Theme, "expected a single theme name"));
        }
        self.theme = theme.to_string();
        Ok(())
    }
}

fn set_identifier(slot: &mut Option<String>, key: OptionKey, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(key, "must not be empty"));
    }
    *slot = Some(value.to_string());
    Ok(())
}

fn invalid(key: OptionKey, reason: &str) -> PostcodeError {
    PostcodeError::InvalidOption {
        key: key.name().to_string(),
        reason: reason.to_string(),
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::options::{
    normalize_base_url, FieldGroupOptions, DEFAULT_ERROR_MSG, DEFAULT_KEY_STROKE_DELAY_MS,
    DEFAULT_PLACEHOLDER, DEFAULT_RESULT_PANEL_HEIGHT, DEFAULT_THEME, DEFAULT_TOOL_TIP,
    DEFAULT_URL,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AustPostcodeConfig {
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub widget: WidgetConfig,

    #[serde(default = "default_field_groups")]
    pub field_groups: Vec<FieldGroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_error_msg")]
    pub error_msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_key_stroke_delay")]
    pub key_stroke_delay_ms: u64,

    #[serde(default = "default_result_panel_height")]
    pub result_panel_height: u8,

    #[serde(default)]
    pub glow_width: u16,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default = "default_tool_tip")]
    pub tool_tip: String,
}

/// One locality / state / postcode group on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldGroupConfig {
    /// Host id the group is attached to.
    pub host: String,

    /// Caption drawn above the fields.
    #[serde(default)]
    pub label: String,

    pub locality_name: Option<String>,
    pub locality_id: Option<String>,
    pub state_name: Option<String>,
    pub state_id: Option<String>,
    pub postcode_name: Option<String>,
    pub postcode_id: Option<String>,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_error_msg() -> String {
    DEFAULT_ERROR_MSG.to_string()
}
fn default_key_stroke_delay() -> u64 {
    DEFAULT_KEY_STROKE_DELAY_MS
}
fn default_result_panel_height() -> u8 {
    DEFAULT_RESULT_PANEL_HEIGHT
}
fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}
fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}
fn default_tool_tip() -> String {
    DEFAULT_TOOL_TIP.to_string()
}
fn default_field_groups() -> Vec<FieldGroupConfig> {
    vec![FieldGroupConfig::named("address", "Address")]
}

impl Default for AustPostcodeConfig {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            widget: WidgetConfig::default(),
            field_groups: default_field_groups(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_seconds: default_timeout(),
            error_msg: default_error_msg(),
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            key_stroke_delay_ms: default_key_stroke_delay(),
            result_panel_height: default_result_panel_height(),
            glow_width: 0,
            theme: default_theme(),
            placeholder: default_placeholder(),
            tool_tip: default_tool_tip(),
        }
    }
}

impl FieldGroupConfig {
    /// A group whose field names and ids are derived from `host`.
    pub fn named(host: &str, label: &str) -> Self {
        Self {
            host: host.to_string(),
            label: label.to_string(),
            locality_name: Some(format!("{host}_locality")),
            locality_id: Some(format!("{host}Locality")),
            state_name: Some(format!("{host}_state")),
            state_id: Some(format!("{host}State")),
            postcode_name: Some(format!("{host}_postcode")),
            postcode_id: Some(format!("{host}Postcode")),
        }
    }
}

impl AustPostcodeConfig {
    /// Load config from ~/.config/aust-postcode/config.toml, creating defaults if missing.
    pub fn load() -> crate::error::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                crate::error::PostcodeError::Config(format!("Failed to read config: {e}"))
            })?;
            Self::parse(&contents)
        } else {
            let config = AustPostcodeConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn parse(contents: &str) -> crate::error::Result<Self> {
        toml::from_str(contents).map_err(|e| {
            crate::error::PostcodeError::Config(format!("Failed to parse config: {e}"))
        })
    }

    /// Save config to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::PostcodeError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> crate::error::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::PostcodeError::Config("Could not determine config directory".into())
        })?;
        Ok(config_dir.join("aust-postcode").join("config.toml"))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup.timeout_seconds)
    }

    /// Attach options for one configured field group.
    pub fn options_for(&self, group: &FieldGroupConfig) -> FieldGroupOptions {
        FieldGroupOptions {
            url: normalize_base_url(&self.lookup.url),
            key_stroke_delay: Duration::from_millis(self.widget.key_stroke_delay_ms),
            tool_tip: self.widget.tool_tip.clone(),
            glow_width: self.widget.glow_width,
            result_panel_height: self.widget.result_panel_height.clamp(1, 100),
            locality_name: group.locality_name.clone(),
            locality_id: group.locality_id.clone(),
            locality_placeholder: self.widget.placeholder.clone(),
            state_name: group.state_name.clone(),
            state_id: group.state_id.clone(),
            postcode_name: group.postcode_name.clone(),
            postcode_id: group.postcode_id.clone(),
            error_msg: self.lookup.error_msg.clone(),
            theme: self.widget.theme.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AustPostcodeConfig::parse("").unwrap();
        assert_eq!(config.lookup.url, DEFAULT_URL);
        assert_eq!(config.widget.key_stroke_delay_ms, 500);
        assert_eq!(config.field_groups.len(), 1);
        assert!(config.options_for(&config.field_groups[0]).validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = AustPostcodeConfig::parse(
            r#"
            [lookup]
            url = "https://postcodes.example.com/api/v0/aust-postcode"

            [widget]
            theme = "dark"

            [[field_groups]]
            host = "postal"
            label = "Postal address"
            locality_name = "postal_locality"
            locality_id = "postalLocality"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookup.timeout_seconds, 10);
        assert_eq!(config.widget.result_panel_height, 25);

        let options = config.options_for(&config.field_groups[0]);
        assert_eq!(
            options.url,
            "https://postcodes.example.com/api/v0/aust-postcode/"
        );
        assert_eq!(options.theme, "dark");
        // State and postcode identifiers were left out.
        assert!(options.validate().is_err());
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let config = AustPostcodeConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = AustPostcodeConfig::parse(&text).unwrap();
        assert_eq!(parsed.field_groups[0].host, "address");
        assert_eq!(parsed.widget.tool_tip, DEFAULT_TOOL_TIP);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = AustPostcodeConfig::parse("[widget\ntheme = ").unwrap_err();
        assert!(matches!(err, crate::error::PostcodeError::Config(_)));
    }
}

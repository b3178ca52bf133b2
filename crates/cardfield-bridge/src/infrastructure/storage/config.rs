//! TOML configuration for the demo host.
//!
//! The demo binary reads its log level and the initial card field options
//! from a TOML file:
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [card_field]
//! postal_code_enabled = false
//! autofocus = true
//! dangerously_get_full_card_details = false
//!
//! [card_field.placeholder]
//! number = "4242 4242 4242 4242"
//! postal_code = "Postcode"
//!
//! [card_field.style]
//! border_width = 1.0
//! border_color = "#CCCCCC"
//! font_family = "Menlo"
//! font_size = 16.0
//! ```
//!
//! Every field has a default, so a missing file, or a file that only sets a
//! few keys, yields a usable configuration.  The card field section is
//! handed to the component through the same lenient parser as host props:
//! a malformed color is ignored rather than rejected.

use std::path::{Path, PathBuf};

use cardfield_core::domain::config::CardFieldConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level demo configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DemoConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub card_field: CardFieldSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Initial options for the mounted card field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardFieldSection {
    #[serde(default = "default_true")]
    pub postal_code_enabled: bool,
    #[serde(default)]
    pub autofocus: bool,
    #[serde(default)]
    pub dangerously_get_full_card_details: bool,
    #[serde(default)]
    pub placeholder: PlaceholderSection,
    #[serde(default)]
    pub style: StyleSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaceholderSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Style overrides.  Colors are hex strings (`#RGB`, `#RRGGBB`, `#AARRGGBB`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StyleSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_error_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_color: Option<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for CardFieldSection {
    fn default() -> Self {
        Self {
            postal_code_enabled: default_true(),
            autofocus: false,
            dangerously_get_full_card_details: false,
            placeholder: PlaceholderSection::default(),
            style: StyleSection::default(),
        }
    }
}

// ── Conversion to host props ──────────────────────────────────────────────────

/// Inserts `key` only when `value` is set.
fn put<T: Into<Value> + Clone>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v.clone().into());
    }
}

impl CardFieldSection {
    /// The section as a host props map, keyed the way hosts name props.
    pub fn to_props(&self) -> Value {
        let mut placeholder = Map::new();
        put(&mut placeholder, "number", &self.placeholder.number);
        put(&mut placeholder, "expiration", &self.placeholder.expiration);
        put(&mut placeholder, "cvc", &self.placeholder.cvc);
        put(&mut placeholder, "postalCode", &self.placeholder.postal_code);

        let s = &self.style;
        let mut style = Map::new();
        put(&mut style, "borderWidth", &s.border_width);
        put(&mut style, "backgroundColor", &s.background_color);
        put(&mut style, "borderColor", &s.border_color);
        put(&mut style, "borderRadius", &s.border_radius);
        put(&mut style, "cursorColor", &s.cursor_color);
        put(&mut style, "textColor", &s.text_color);
        put(&mut style, "textErrorColor", &s.text_error_color);
        put(&mut style, "fontFamily", &s.font_family);
        put(&mut style, "fontSize", &s.font_size);
        put(&mut style, "placeholderColor", &s.placeholder_color);

        json!({
            "postalCodeEnabled": self.postal_code_enabled,
            "autofocus": self.autofocus,
            "dangerouslyGetFullCardDetails": self.dangerously_get_full_card_details,
            "placeholder": placeholder,
            "cardStyle": style,
        })
    }

    /// Parses the section into component options.
    pub fn to_card_field_config(&self) -> CardFieldConfig {
        CardFieldConfig::from_value(&self.to_props())
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads `DemoConfig` from `path`, returning `DemoConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<DemoConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DemoConfig::default()),
        Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &DemoConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Typed placeholder and style configuration.
//!
//! Hosts send `placeholder` and `cardStyle` as loosely typed maps.  They are
//! parsed here exactly once into [`Placeholders`] and [`CardStyle`], where
//! every field is optional and any malformed value is treated as unset.
//! [`Appearance::resolve`] then fills in the fixed defaults and resolves the
//! font, producing the single value the widget applies in one step.
//!
//! ```text
//! serde_json::Value ──from_value──> CardStyle ─┐
//! serde_json::Value ──from_value──> Placeholders ─┼──resolve──> Appearance
//!                                   FontResolver ─┘
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default number placeholder: a generic digit pattern.
pub const DEFAULT_NUMBER_PLACEHOLDER: &str = "1234123412341234";
pub const DEFAULT_EXPIRATION_PLACEHOLDER: &str = "MM/YY";
pub const DEFAULT_CVC_PLACEHOLDER: &str = "CVC";
pub const DEFAULT_POSTAL_CODE_PLACEHOLDER: &str = "ZIP";

pub const DEFAULT_BORDER_WIDTH: f64 = 0.0;
pub const DEFAULT_BORDER_RADIUS: f64 = 5.0;
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

// ── Color ─────────────────────────────────────────────────────────────────────

/// Error returned when a color string is not a hex color.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color must have 3, 6, or 8 hex digits: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0:?}")]
    BadDigit(String),
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#RGB`, `#RRGGBB`, or `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).unwrap_or(0) * 0x11;
                Ok(Color::rgb(nibble(0), nibble(1), nibble(2)))
            }
            6 => Ok(Color::rgb(byte(0), byte(2), byte(4))),
            8 => Ok(Color { a: byte(0), r: byte(2), g: byte(4), b: byte(6) }),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }
}

// ── Lenient field readers ─────────────────────────────────────────────────────

fn read_string(map: &Value, key: &str, owner: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null => None,
        other => {
            debug!("{owner}.{key} ignored: expected a non-empty string, got {other}");
            None
        }
    }
}

fn read_dimension(map: &Value, key: &str, allow_zero: bool) -> Option<f64> {
    let raw = map.get(key)?;
    match raw.as_f64() {
        Some(n) if n.is_finite() && (n > 0.0 || (allow_zero && n == 0.0)) => Some(n),
        _ => {
            if !raw.is_null() {
                debug!("cardStyle.{key} ignored: expected a non-negative number, got {raw}");
            }
            None
        }
    }
}

fn read_color(map: &Value, key: &str) -> Option<Color> {
    let text = read_string(map, key, "cardStyle")?;
    match text.parse() {
        Ok(color) => Some(color),
        Err(e) => {
            debug!("cardStyle.{key} ignored: {e}");
            None
        }
    }
}

// ── Placeholders ──────────────────────────────────────────────────────────────

/// Per-field placeholder overrides.  `None` keeps the widget's default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placeholders {
    pub number: Option<String>,
    pub expiration: Option<String>,
    pub cvc: Option<String>,
    pub postal_code: Option<String>,
}

impl Placeholders {
    /// Parses a host `placeholder` map.  A non-object value yields no
    /// overrides.
    pub fn from_value(value: &Value) -> Self {
        Self {
            number: read_string(value, "number", "placeholder"),
            expiration: read_string(value, "expiration", "placeholder"),
            cvc: read_string(value, "cvc", "placeholder"),
            postal_code: read_string(value, "postalCode", "placeholder"),
        }
    }

    fn resolve(&self) -> ResolvedPlaceholders {
        let or = |v: &Option<String>, default: &str| v.clone().unwrap_or_else(|| default.to_string());
        ResolvedPlaceholders {
            number: or(&self.number, DEFAULT_NUMBER_PLACEHOLDER),
            expiration: or(&self.expiration, DEFAULT_EXPIRATION_PLACEHOLDER),
            cvc: or(&self.cvc, DEFAULT_CVC_PLACEHOLDER),
            postal_code: or(&self.postal_code, DEFAULT_POSTAL_CODE_PLACEHOLDER),
        }
    }
}

/// Placeholder text for every field, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlaceholders {
    pub number: String,
    pub expiration: String,
    pub cvc: String,
    pub postal_code: String,
}

impl Default for ResolvedPlaceholders {
    fn default() -> Self {
        Placeholders::default().resolve()
    }
}

// ── Card style ────────────────────────────────────────────────────────────────

/// Visual overrides sent by the host.  Malformed entries are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardStyle {
    pub border_width: Option<f64>,
    pub background_color: Option<Color>,
    pub border_color: Option<Color>,
    pub border_radius: Option<f64>,
    pub cursor_color: Option<Color>,
    pub text_color: Option<Color>,
    pub text_error_color: Option<Color>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub placeholder_color: Option<Color>,
}

impl CardStyle {
    /// Parses a host `cardStyle` map.  Never fails.
    pub fn from_value(value: &Value) -> Self {
        Self {
            border_width: read_dimension(value, "borderWidth", true),
            background_color: read_color(value, "backgroundColor"),
            border_color: read_color(value, "borderColor"),
            border_radius: read_dimension(value, "borderRadius", true),
            cursor_color: read_color(value, "cursorColor"),
            text_color: read_color(value, "textColor"),
            text_error_color: read_color(value, "textErrorColor"),
            font_family: read_string(value, "fontFamily", "cardStyle"),
            font_size: read_dimension(value, "fontSize", false),
            placeholder_color: read_color(value, "placeholderColor"),
        }
    }
}

// ── Fonts ─────────────────────────────────────────────────────────────────────

/// Platform font lookup.
pub trait FontResolver {
    /// `true` if `family` names an installed font.
    fn has_family(&self, family: &str) -> bool;
}

/// The font the widget renders with.
#[derive(Debug, Clone, PartialEq)]
pub enum Font {
    System { size: f64 },
    Named { family: String, size: f64 },
}

// ── Appearance ────────────────────────────────────────────────────────────────

/// Everything that affects rendering, fully resolved.
///
/// Colors left as `None` use the widget theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub border_width: f64,
    pub border_radius: f64,
    pub background_color: Option<Color>,
    pub border_color: Option<Color>,
    pub cursor_color: Option<Color>,
    pub text_color: Option<Color>,
    pub text_error_color: Option<Color>,
    pub placeholder_color: Option<Color>,
    pub font: Font,
    pub placeholders: ResolvedPlaceholders,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            border_width: DEFAULT_BORDER_WIDTH,
            border_radius: DEFAULT_BORDER_RADIUS,
            background_color: None,
            border_color: None,
            cursor_color: None,
            text_color: None,
            text_error_color: None,
            placeholder_color: None,
            font: Font::System { size: DEFAULT_FONT_SIZE },
            placeholders: ResolvedPlaceholders::default(),
        }
    }
}

impl Appearance {
    /// Applies defaults to every unset property and resolves the font.
    ///
    /// A font family that `fonts` does not know falls back to the system
    /// font at the requested size.
    pub fn resolve(style: &CardStyle, placeholders: &Placeholders, fonts: &dyn FontResolver) -> Self {
        let size = style.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let font = match &style.font_family {
            Some(family) if fonts.has_family(family) => Font::Named { family: family.clone(), size },
            Some(family) => {
                debug!("font family {family:?} not found; using system font");
                Font::System { size }
            }
            None => Font::System { size },
        };

        Self {
            border_width: style.border_width.unwrap_or(DEFAULT_BORDER_WIDTH),
            border_radius: style.border_radius.unwrap_or(DEFAULT_BORDER_RADIUS),
            background_color: style.background_color,
            border_color: style.border_color,
            cursor_color: style.cursor_color,
            text_color: style.text_color,
            text_error_color: style.text_error_color,
            placeholder_color: style.placeholder_color,
            font,
            placeholders: placeholders.resolve(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

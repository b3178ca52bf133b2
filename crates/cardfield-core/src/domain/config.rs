//! The host-settable options of a card field and their defaults.
//!
//! | option                          | default |
//! |---------------------------------|---------|
//! | `postalCodeEnabled`             | `true`  |
//! | `autofocus`                     | `false` |
//! | `dangerouslyGetFullCardDetails` | `false` |
//! | `placeholder`                   | widget defaults |
//! | `cardStyle`                     | widget defaults |

use serde_json::Value;

use crate::domain::style::{CardStyle, Placeholders};

/// A complete option set for one card field.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFieldConfig {
    pub postal_code_enabled: bool,
    pub autofocus: bool,
    pub dangerously_get_full_card_details: bool,
    pub placeholder: Placeholders,
    pub card_style: CardStyle,
}

impl Default for CardFieldConfig {
    fn default() -> Self {
        Self {
            postal_code_enabled: true,
            autofocus: false,
            dangerously_get_full_card_details: false,
            placeholder: Placeholders::default(),
            card_style: CardStyle::default(),
        }
    }
}

impl CardFieldConfig {
    /// Reads a whole props map at once (e.g. initial mount props).
    ///
    /// Missing or mistyped entries keep their defaults.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| value.get(key).and_then(Value::as_bool).unwrap_or(default);
        Self {
            postal_code_enabled: flag("postalCodeEnabled", defaults.postal_code_enabled),
            autofocus: flag("autofocus", defaults.autofocus),
            dangerously_get_full_card_details: flag(
                "dangerouslyGetFullCardDetails",
                defaults.dangerously_get_full_card_details,
            ),
            placeholder: value.get("placeholder").map(Placeholders::from_value).unwrap_or_default(),
            card_style: value.get("cardStyle").map(CardStyle::from_value).unwrap_or_default(),
        }
    }
}

//! Decoding of host prop updates into typed configuration changes.
//!
//! Host runtimes deliver each changed prop as `(name, value)` with an
//! untyped value.  A prop that is removed arrives as `null`; a prop of the
//! wrong type is treated the same way.  Both fall back to the option's
//! default, so decoding a known prop never fails.

use cardfield_core::domain::config::CardFieldConfig;
use cardfield_core::domain::style::{CardStyle, Placeholders};
use serde_json::Value;
use tracing::debug;

/// One typed configuration change.
#[derive(Debug, Clone, PartialEq)]
pub enum CardFieldProp {
    PostalCodeEnabled(bool),
    Autofocus(bool),
    DangerouslyGetFullCardDetails(bool),
    Placeholder(Placeholders),
    CardStyle(CardStyle),
}

impl CardFieldProp {
    /// Decodes a host prop.  Returns `None` for prop names this component
    /// does not own.
    pub fn decode(name: &str, value: &Value) -> Option<Self> {
        let defaults = CardFieldConfig::default();
        let flag = |default: bool| match value {
            Value::Bool(b) => *b,
            Value::Null => default,
            other => {
                debug!("prop {name} ignored: expected a boolean, got {other}");
                default
            }
        };

        let prop = match name {
            "postalCodeEnabled" => Self::PostalCodeEnabled(flag(defaults.postal_code_enabled)),
            "autofocus" => Self::Autofocus(flag(defaults.autofocus)),
            "dangerouslyGetFullCardDetails" => {
                Self::DangerouslyGetFullCardDetails(flag(defaults.dangerously_get_full_card_details))
            }
            "placeholder" => Self::Placeholder(Placeholders::from_value(value)),
            "cardStyle" => Self::CardStyle(CardStyle::from_value(value)),
            _ => return None,
        };
        Some(prop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_boolean_props() {
        assert_eq!(
            CardFieldProp::decode("postalCodeEnabled", &json!(false)),
            Some(CardFieldProp::PostalCodeEnabled(false))
        );
        assert_eq!(
            CardFieldProp::decode("autofocus", &json!(true)),
            Some(CardFieldProp::Autofocus(true))
        );
        assert_eq!(
            CardFieldProp::decode("dangerouslyGetFullCardDetails", &json!(true)),
            Some(CardFieldProp::DangerouslyGetFullCardDetails(true))
        );
    }

    #[test]
    fn test_decode_null_or_mistyped_boolean_uses_default() {
        assert_eq!(
            CardFieldProp::decode("postalCodeEnabled", &Value::Null),
            Some(CardFieldProp::PostalCodeEnabled(true))
        );
        assert_eq!(
            CardFieldProp::decode("dangerouslyGetFullCardDetails", &json!("yes")),
            Some(CardFieldProp::DangerouslyGetFullCardDetails(false))
        );
    }

    #[test]
    fn test_decode_nested_maps() {
        let prop = CardFieldProp::decode("cardStyle", &json!({ "borderWidth": 2 }));
        match prop {
            Some(CardFieldProp::CardStyle(style)) => assert_eq!(style.border_width, Some(2.0)),
            other => panic!("unexpected decode result: {other:?}"),
        }

        let prop = CardFieldProp::decode("placeholder", &json!({ "postalCode": "Postcode" }));
        match prop {
            Some(CardFieldProp::Placeholder(p)) => assert_eq!(p.postal_code.as_deref(), Some("Postcode")),
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_prop_is_none() {
        assert_eq!(CardFieldProp::decode("style", &json!({})), None);
        assert_eq!(CardFieldProp::decode("onCardChange", &json!(true)), None);
    }
}

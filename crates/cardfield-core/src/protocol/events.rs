//! Events delivered from a card field to the host.
//!
//! # Wire shape
//!
//! ```json
//! {"expiryMonth":12,"expiryYear":2034,"complete":true,"brand":"Visa","last4":"4242"}
//! {"focusedField":"CardNumber"}
//! {"focusedField":null}
//! ```
//!
//! `postalCode` appears only while postal entry is enabled.  `number` and
//! `cvc` appear only when the host opted into full card details; their
//! presence is decided by [`DataExposure`] at construction time, so a payload
//! built without the opt-in cannot carry them.
//!
//! # Direct events
//!
//! Both events are direct (non-bubbling).  The host runtime maps the native
//! event names to the prop names it invokes:
//!
//! | native event     | registration name |
//! |------------------|-------------------|
//! | `topCardChange`  | `onCardChange`    |
//! | `topFocusChange` | `onFocusChange`   |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::card::{CardBrand, CardField, CardState};

pub const CARD_CHANGE_EVENT: &str = "topCardChange";
pub const FOCUS_CHANGE_EVENT: &str = "topFocusChange";
pub const CARD_CHANGE_REGISTRATION: &str = "onCardChange";
pub const FOCUS_CHANGE_REGISTRATION: &str = "onFocusChange";

// ── Exposure policy ───────────────────────────────────────────────────────────

/// Which optional parts of the card state a change event may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataExposure {
    /// Include `postalCode` (postal entry enabled).
    pub postal_code: bool,
    /// Include raw `number` and `cvc` (explicit opt-in).
    pub full_card_details: bool,
}

// ── onCardChange ──────────────────────────────────────────────────────────────

/// Payload of `onCardChange`: the full current snapshot, not a diff.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardChangeEvent {
    pub expiry_month: Option<u32>,
    pub expiry_year: Option<u32>,
    pub complete: bool,
    pub brand: Option<CardBrand>,
    pub last4: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvc: Option<String>,
}

impl CardChangeEvent {
    /// Builds the payload for `state` under the given exposure policy.
    ///
    /// `complete` is aggregated from the individual field states.
    pub fn from_state(state: &CardState, exposure: DataExposure) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            expiry_month: state.exp_month,
            expiry_year: state.exp_year,
            complete: state.is_complete(),
            brand: state.brand.reported(),
            last4: text(&state.last4),
            postal_code: exposure.postal_code.then(|| text(&state.postal_code)),
            number: exposure.full_card_details.then(|| text(&state.number)),
            cvc: exposure.full_card_details.then(|| text(&state.cvc)),
        }
    }
}

impl fmt::Debug for CardChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardChangeEvent")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("complete", &self.complete)
            .field("brand", &self.brand)
            .field("last4", &self.last4)
            .field("postal_code", &self.postal_code)
            .field("number", &self.number.as_ref().map(|_| "<redacted>"))
            .field("cvc", &self.cvc.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ── onFocusChange ─────────────────────────────────────────────────────────────

/// Payload of `onFocusChange`.  `None` means the surface lost focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusEvent {
    pub focused_field: Option<CardField>,
}

// ── Host event envelope ───────────────────────────────────────────────────────

/// Any event a card field emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    CardChange(CardChangeEvent),
    FocusChange(FocusEvent),
}

impl HostEvent {
    /// Native event name, e.g. `"topCardChange"`.
    pub fn event_name(&self) -> &'static str {
        match self {
            HostEvent::CardChange(_) => CARD_CHANGE_EVENT,
            HostEvent::FocusChange(_) => FOCUS_CHANGE_EVENT,
        }
    }

    /// Host prop name, e.g. `"onCardChange"`.
    pub fn registration_name(&self) -> &'static str {
        match self {
            HostEvent::CardChange(_) => CARD_CHANGE_REGISTRATION,
            HostEvent::FocusChange(_) => FOCUS_CHANGE_REGISTRATION,
        }
    }

    /// The JSON payload handed to the host callback.
    pub fn payload(&self) -> serde_json::Result<Value> {
        match self {
            HostEvent::CardChange(e) => serde_json::to_value(e),
            HostEvent::FocusChange(e) => serde_json::to_value(e),
        }
    }
}

// ── Event declarations ────────────────────────────────────────────────────────

/// One direct (non-bubbling) event declared to the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectEventType {
    pub event_name: &'static str,
    pub registration_name: &'static str,
}

/// The events a card field can emit.
pub const DIRECT_EVENT_TYPES: [DirectEventType; 2] = [
    DirectEventType { event_name: FOCUS_CHANGE_EVENT, registration_name: FOCUS_CHANGE_REGISTRATION },
    DirectEventType { event_name: CARD_CHANGE_EVENT, registration_name: CARD_CHANGE_REGISTRATION },
];

/// The declaration map in the shape host runtimes consume:
/// `{"topCardChange": {"registrationName": "onCardChange"}, ...}`.
pub fn exported_direct_event_types() -> Value {
    let map: Map<String, Value> = DIRECT_EVENT_TYPES
        .iter()
        .map(|t| (t.event_name.to_string(), json!({ "registrationName": t.registration_name })))
        .collect();
    Value::Object(map)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{FieldState, FieldStates};

    fn partial_state() -> CardState {
        CardState {
            is_valid: false,
            fields: FieldStates {
                number: FieldState::Entering,
                ..FieldStates::default()
            },
            number: Some("42".to_string()),
            brand: CardBrand::Visa,
            postal_code_enabled: true,
            ..CardState::default()
        }
    }

    #[test]
    fn test_from_state_partial_card_uses_empty_and_null_values() {
        let event = CardChangeEvent::from_state(&partial_state(), DataExposure::default());

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "expiryMonth": null,
                "expiryYear": null,
                "complete": false,
                "brand": "Visa",
                "last4": ""
            })
        );
    }

    #[test]
    fn test_postal_code_key_present_when_exposed_even_if_empty() {
        let exposure = DataExposure { postal_code: true, full_card_details: false };
        let json = serde_json::to_value(CardChangeEvent::from_state(&partial_state(), exposure)).unwrap();

        assert_eq!(json["postalCode"], "");
        assert!(json.get("number").is_none());
        assert!(json.get("cvc").is_none());
    }

    #[test]
    fn test_full_details_exposure_adds_number_and_cvc() {
        let exposure = DataExposure { postal_code: false, full_card_details: true };
        let json = serde_json::to_value(CardChangeEvent::from_state(&partial_state(), exposure)).unwrap();

        assert_eq!(json["number"], "42");
        assert_eq!(json["cvc"], "");
        assert!(json.get("postalCode").is_none());
    }

    #[test]
    fn test_unknown_brand_serializes_as_null() {
        let state = CardState { brand: CardBrand::Unknown, ..partial_state() };
        let json = serde_json::to_value(CardChangeEvent::from_state(&state, DataExposure::default())).unwrap();
        assert!(json["brand"].is_null());
    }

    #[test]
    fn test_jcb_brand_serializes_uppercase() {
        let state = CardState { brand: CardBrand::Jcb, ..partial_state() };
        let json = serde_json::to_value(CardChangeEvent::from_state(&state, DataExposure::default())).unwrap();
        assert_eq!(json["brand"], "JCB");
    }

    #[test]
    fn test_focus_event_shapes() {
        let focused = FocusEvent { focused_field: Some(CardField::ExpiryDate) };
        let blurred = FocusEvent { focused_field: None };

        assert_eq!(serde_json::to_string(&focused).unwrap(), r#"{"focusedField":"ExpiryDate"}"#);
        assert_eq!(serde_json::to_string(&blurred).unwrap(), r#"{"focusedField":null}"#);
    }

    #[test]
    fn test_host_event_names() {
        let change = HostEvent::CardChange(CardChangeEvent::from_state(&partial_state(), DataExposure::default()));
        let focus = HostEvent::FocusChange(FocusEvent { focused_field: None });

        assert_eq!(change.event_name(), "topCardChange");
        assert_eq!(change.registration_name(), "onCardChange");
        assert_eq!(focus.event_name(), "topFocusChange");
        assert_eq!(focus.registration_name(), "onFocusChange");
    }

    #[test]
    fn test_exported_direct_event_types_shape() {
        let exported = exported_direct_event_types();

        assert_eq!(exported["topCardChange"]["registrationName"], "onCardChange");
        assert_eq!(exported["topFocusChange"]["registrationName"], "onFocusChange");
        assert_eq!(exported.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_debug_redacts_sensitive_fields() {
        let exposure = DataExposure { postal_code: false, full_card_details: true };
        let state = CardState { number: Some("4242424242424242".to_string()), ..partial_state() };

        let rendered = format!("{:?}", CardChangeEvent::from_state(&state, exposure));

        assert!(!rendered.contains("4242424242424242"));
    }
}

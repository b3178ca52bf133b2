//! Card data model: fields, per-field state, brands, and validated snapshots.
//!
//! # Three views of the same card
//!
//! ```text
//! CardState      live, keystroke-level view reported by the widget
//!                (may be partial, may be invalid)
//!     │
//!     ├──> CardChangeEvent   what the host is allowed to see
//!     │
//!     └──> CardParams        validated snapshot; exists only when every
//!                            required field is valid
//! ```
//!
//! `CardParams` has no optional fields.  Whether a snapshot exists at all is
//! expressed as `Option<CardParams>`, so a half-populated snapshot cannot be
//! constructed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Fields ────────────────────────────────────────────────────────────────────

/// One of the fixed sub-fields of the card surface.
///
/// Serialized with the names the host expects in `FocusEvent.focusedField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardField {
    CardNumber,
    ExpiryDate,
    Cvc,
    PostalCode,
}

impl CardField {
    /// All fields in the order the widget lays them out.
    pub const ENTRY_ORDER: [CardField; 4] = [
        CardField::CardNumber,
        CardField::ExpiryDate,
        CardField::Cvc,
        CardField::PostalCode,
    ];

    /// The host-facing identifier, e.g. `"CardNumber"`.
    pub fn as_str(self) -> &'static str {
        match self {
            CardField::CardNumber => "CardNumber",
            CardField::ExpiryDate => "ExpiryDate",
            CardField::Cvc => "Cvc",
            CardField::PostalCode => "PostalCode",
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation state of a single field.
///
/// ```text
/// Empty ──type──> Entering ──complete──> Valid
///                     │
///                     └──────complete──> Invalid
/// ```
///
/// Deleting characters can move a field back to `Entering` or `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Empty,
    Entering,
    Invalid,
    Valid,
}

impl FieldState {
    pub fn is_valid(self) -> bool {
        matches!(self, FieldState::Valid)
    }
}

/// The state of every field at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStates {
    pub number: FieldState,
    pub expiry: FieldState,
    pub cvc: FieldState,
    pub postal_code: FieldState,
}

impl FieldStates {
    /// Returns the state of `field`.
    pub fn get(&self, field: CardField) -> FieldState {
        match field {
            CardField::CardNumber => self.number,
            CardField::ExpiryDate => self.expiry,
            CardField::Cvc => self.cvc,
            CardField::PostalCode => self.postal_code,
        }
    }

    /// `true` iff every required field is individually valid.
    ///
    /// The postal code only participates when `postal_code_required` is set.
    pub fn is_complete(&self, postal_code_required: bool) -> bool {
        self.number.is_valid()
            && self.expiry.is_valid()
            && self.cvc.is_valid()
            && (!postal_code_required || self.postal_code.is_valid())
    }

    /// The first required field, in entry order, that is not yet valid.
    pub fn first_incomplete(&self, postal_code_required: bool) -> Option<CardField> {
        CardField::ENTRY_ORDER
            .into_iter()
            .filter(|f| postal_code_required || *f != CardField::PostalCode)
            .find(|f| !self.get(*f).is_valid())
    }
}

// ── Brand ─────────────────────────────────────────────────────────────────────

/// Card network classification derived from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    MasterCard,
    AmericanExpress,
    Discover,
    #[serde(rename = "JCB")]
    Jcb,
    DinersClub,
    UnionPay,
    #[default]
    Unknown,
}

impl CardBrand {
    /// The brand as reported to the host: `None` for [`CardBrand::Unknown`].
    pub fn reported(self) -> Option<CardBrand> {
        match self {
            CardBrand::Unknown => None,
            brand => Some(brand),
        }
    }

    /// Number lengths the network issues, ascending.
    pub fn valid_number_lengths(self) -> &'static [usize] {
        match self {
            CardBrand::AmericanExpress => &[15],
            CardBrand::DinersClub => &[14, 16],
            CardBrand::UnionPay => &[16, 17, 18, 19],
            _ => &[16],
        }
    }

    /// Longest number the widget accepts for this brand.
    pub fn max_number_length(self) -> usize {
        self.valid_number_lengths().last().copied().unwrap_or(16)
    }

    /// Longest CVC the widget accepts for this brand.
    pub fn max_cvc_length(self) -> usize {
        match self {
            CardBrand::AmericanExpress => 4,
            _ => 3,
        }
    }
}

// ── Live widget state ─────────────────────────────────────────────────────────

/// Everything the widget currently knows, queried synchronously.
///
/// Values are reported as typed so far, whether or not they are valid.
/// `Debug` redacts the full number and CVC.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CardState {
    /// The widget's own whole-surface validity verdict.
    pub is_valid: bool,
    pub fields: FieldStates,
    pub number: Option<String>,
    pub exp_month: Option<u32>,
    /// Four-digit year (e.g. `2034`).
    pub exp_year: Option<u32>,
    pub cvc: Option<String>,
    pub last4: Option<String>,
    pub brand: CardBrand,
    pub postal_code: Option<String>,
    /// Whether the postal sub-field currently participates in the surface.
    pub postal_code_enabled: bool,
}

impl CardState {
    /// Whole-surface completeness aggregated from the individual fields.
    pub fn is_complete(&self) -> bool {
        self.fields.is_complete(self.postal_code_enabled)
    }

    /// The validated snapshot, or `None` if any required field is not valid.
    pub fn card_params(&self) -> Option<CardParams> {
        if !self.is_complete() {
            return None;
        }
        Some(CardParams {
            number: self.number.clone()?,
            expiry_month: self.exp_month?,
            expiry_year: self.exp_year?,
            cvc: self.cvc.clone()?,
        })
    }

    /// [`CardState::card_params`] plus the postal code when postal entry is on.
    pub fn validated_card(&self) -> Option<ValidatedCard> {
        let params = self.card_params()?;
        let postal_code = if self.postal_code_enabled {
            self.postal_code.clone()
        } else {
            None
        };
        Some(ValidatedCard { params, postal_code })
    }
}

impl fmt::Debug for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardState")
            .field("is_valid", &self.is_valid)
            .field("fields", &self.fields)
            .field("number", &self.number.as_ref().map(|_| "<redacted>"))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &self.cvc.as_ref().map(|_| "<redacted>"))
            .field("last4", &self.last4)
            .field("brand", &self.brand)
            .field("postal_code", &self.postal_code)
            .field("postal_code_enabled", &self.postal_code_enabled)
            .finish()
    }
}

// ── Validated snapshot ────────────────────────────────────────────────────────

/// Fully validated card data for payment APIs.  Never partially populated.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardParams {
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub cvc: String,
}

impl CardParams {
    pub fn last4(&self) -> &str {
        let start = self.number.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
        &self.number[start..]
    }
}

impl fmt::Debug for CardParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardParams")
            .field("last4", &self.last4())
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

/// The snapshot a component stores while the surface is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    pub params: CardParams,
    /// Present only when postal entry is enabled.
    pub postal_code: Option<String>,
}

// ── Prefill ───────────────────────────────────────────────────────────────────

/// Host-supplied values pushed into the widget programmatically.
///
/// The widget still decides validity; prefilling never bypasses validation.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub number: Option<String>,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<u32>,
    pub cvc: Option<String>,
}

impl CardDetails {
    /// Reads details from an untyped host map.  Values of the wrong type are
    /// treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let int = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
        };
        Self {
            number: text("number"),
            expiration_month: int("expirationMonth"),
            expiration_year: int("expirationYear"),
            cvc: text("cvc"),
        }
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &self.number.as_ref().map(|_| "<redacted>"))
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("cvc", &self.cvc.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

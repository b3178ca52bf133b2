//! Headless card widget.
//!
//! `SimulatedCardWidget` behaves like a single-line card entry widget with
//! four sub-fields, without drawing anything:
//!
//! ```text
//! ┌──────────────────┬───────┬─────┬──────┐
//! │ 4242424242424242 │ 12/34 │ 123 │ ZIP  │
//! └──────────────────┴───────┴─────┴──────┘
//!    CardNumber        Expiry  Cvc  PostalCode
//! ```
//!
//! # Editing rules
//!
//! - Number, expiry, and CVC accept digits only; other characters are
//!   dropped.  Postal codes accept letters, digits, spaces, and hyphens.
//! - The number stops accepting digits at the longest length its brand
//!   issues.  The CVC stops at 4 digits for American Express, 3 otherwise.
//! - Typing `2`–`9` as the first expiry digit is read as a single-digit
//!   month and padded to `02`–`09`.
//! - When a field becomes valid at its maximum length, editing advances to
//!   the next field.
//! - Every accepted character raises one `DidChange`.
//!
//! Expiry dates are judged against a reference month fixed at construction,
//! which keeps the widget deterministic under test.

use std::fmt;

use cardfield_core::domain::card::{CardDetails, CardField, FieldState, FieldStates};
use cardfield_core::domain::style::Appearance;
use cardfield_core::domain::validation::{
    brand_for_number, cvc_state, expiry_state, last4, number_state, parse_expiry, postal_code_state,
    YearMonth, MAX_POSTAL_CODE_LENGTH,
};
use tracing::{debug, trace};

use crate::application::surface::{CardWidget, WidgetEvent, WidgetSnapshot};

/// Maximum expiry digits (`MMYY`).
const EXPIRY_DIGITS: usize = 4;

/// A fully functional card widget with no rendering.
#[derive(Clone)]
pub struct SimulatedCardWidget {
    today: YearMonth,
    number: String,
    expiry: String,
    cvc: String,
    postal_code: String,
    postal_code_entry_enabled: bool,
    focused: Option<CardField>,
    appearance: Appearance,
}

impl fmt::Debug for SimulatedCardWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedCardWidget")
            .field("today", &self.today)
            .field("fields", &self.field_states())
            .field("postal_code_entry_enabled", &self.postal_code_entry_enabled)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedCardWidget {
    fn default() -> Self {
        Self::new(YearMonth::current())
    }
}

impl SimulatedCardWidget {
    /// Creates an empty, unfocused widget that judges expiry dates against
    /// `today`.
    pub fn new(today: YearMonth) -> Self {
        Self {
            today,
            number: String::new(),
            expiry: String::new(),
            cvc: String::new(),
            postal_code: String::new(),
            postal_code_entry_enabled: true,
            focused: None,
            appearance: Appearance::default(),
        }
    }

    /// The sub-field currently being edited.
    pub fn focused_field(&self) -> Option<CardField> {
        self.focused
    }

    /// The appearance most recently applied.
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn postal_code_entry_enabled(&self) -> bool {
        self.postal_code_entry_enabled
    }

    // ── User interaction ──────────────────────────────────────────────────

    /// The user taps a sub-field.  Taps on a hidden postal field are ignored.
    pub fn tap(&mut self, field: CardField) -> Vec<WidgetEvent> {
        if field == CardField::PostalCode && !self.postal_code_entry_enabled {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.move_focus(field, &mut events);
        events
    }

    /// The user types `text` into the focused sub-field.  Characters typed
    /// while nothing is focused are dropped.
    pub fn type_text(&mut self, text: &str) -> Vec<WidgetEvent> {
        let mut events = Vec::new();
        for c in text.chars() {
            let Some(field) = self.focused else {
                trace!("keystroke dropped: widget not focused");
                break;
            };
            if self.accept(field, c) {
                events.push(WidgetEvent::DidChange(self.snapshot()));
                self.advance_if_filled(field, &mut events);
            }
        }
        events
    }

    /// The user presses backspace.  In an empty sub-field this moves editing
    /// back to the previous sub-field instead.
    pub fn delete_backward(&mut self) -> Vec<WidgetEvent> {
        let mut events = Vec::new();
        let Some(field) = self.focused else {
            return events;
        };
        if self.text_mut(field).pop().is_some() {
            events.push(WidgetEvent::DidChange(self.snapshot()));
        } else if let Some(previous) = self.previous_field(field) {
            self.move_focus(previous, &mut events);
        }
        events
    }

    /// The user dismisses the keyboard.
    pub fn dismiss(&mut self) -> Vec<WidgetEvent> {
        self.resign_first_responder()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn text_mut(&mut self, field: CardField) -> &mut String {
        match field {
            CardField::CardNumber => &mut self.number,
            CardField::ExpiryDate => &mut self.expiry,
            CardField::Cvc => &mut self.cvc,
            CardField::PostalCode => &mut self.postal_code,
        }
    }

    /// Appends `c` to `field` if the field's rules allow it.
    fn accept(&mut self, field: CardField, c: char) -> bool {
        match field {
            CardField::CardNumber => {
                if !c.is_ascii_digit() {
                    return false;
                }
                let mut candidate = self.number.clone();
                candidate.push(c);
                if candidate.len() > brand_for_number(&candidate).max_number_length() {
                    trace!("number at maximum length");
                    return false;
                }
                self.number = candidate;
                true
            }
            CardField::ExpiryDate => {
                if !c.is_ascii_digit() || self.expiry.len() >= EXPIRY_DIGITS {
                    return false;
                }
                if self.expiry.is_empty() && c > '1' {
                    self.expiry.push('0');
                }
                self.expiry.push(c);
                true
            }
            CardField::Cvc => {
                let max = brand_for_number(&self.number).max_cvc_length();
                if !c.is_ascii_digit() || self.cvc.len() >= max {
                    return false;
                }
                self.cvc.push(c);
                true
            }
            CardField::PostalCode => {
                let allowed = c.is_ascii_alphanumeric() || c == ' ' || c == '-';
                if !allowed || self.postal_code.len() >= MAX_POSTAL_CODE_LENGTH {
                    return false;
                }
                self.postal_code.push(c);
                true
            }
        }
    }

    fn advance_if_filled(&mut self, field: CardField, events: &mut Vec<WidgetEvent>) {
        let brand = brand_for_number(&self.number);
        let filled = match field {
            CardField::CardNumber => self.number.len() == brand.max_number_length(),
            CardField::ExpiryDate => self.expiry.len() == EXPIRY_DIGITS,
            CardField::Cvc => self.cvc.len() == brand.max_cvc_length(),
            CardField::PostalCode => false,
        };
        if !filled || !self.field_states().get(field).is_valid() {
            return;
        }
        if let Some(next) = self.next_field(field) {
            self.move_focus(next, events);
        }
    }

    fn move_focus(&mut self, field: CardField, events: &mut Vec<WidgetEvent>) {
        if self.focused != Some(field) {
            self.focused = Some(field);
            events.push(WidgetEvent::DidBeginEditing(field));
        }
    }

    fn visible_fields(&self) -> impl Iterator<Item = CardField> + '_ {
        CardField::ENTRY_ORDER
            .into_iter()
            .filter(|f| self.postal_code_entry_enabled || *f != CardField::PostalCode)
    }

    fn next_field(&self, field: CardField) -> Option<CardField> {
        self.visible_fields().skip_while(|f| *f != field).nth(1)
    }

    fn previous_field(&self, field: CardField) -> Option<CardField> {
        self.visible_fields().take_while(|f| *f != field).last()
    }

    fn field_states(&self) -> FieldStates {
        let brand = brand_for_number(&self.number);
        FieldStates {
            number: number_state(&self.number),
            expiry: expiry_state(&self.expiry, self.today),
            cvc: cvc_state(&self.cvc, brand),
            postal_code: if self.postal_code_entry_enabled {
                postal_code_state(&self.postal_code)
            } else {
                FieldState::Empty
            },
        }
    }
}

/// Expiry text for prefilled values.  Values the `MMYY` field cannot hold
/// clear the field instead of being wrapped into a different date.
fn prefill_expiry(month: Option<u32>, year: Option<u32>) -> String {
    let month_ok = |m: u32| (1..=12).contains(&m);
    match (month, year) {
        (Some(m), Some(y)) if month_ok(m) && (2000..=2099).contains(&y) => format!("{m:02}{:02}", y - 2000),
        (Some(m), None) if month_ok(m) => format!("{m:02}"),
        (None, None) => String::new(),
        (month, year) => {
            debug!(?month, ?year, "prefilled expiry not representable; field cleared");
            String::new()
        }
    }
}

fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

impl CardWidget for SimulatedCardWidget {
    fn snapshot(&self) -> WidgetSnapshot {
        let fields = self.field_states();
        let (exp_month, exp_year) = parse_expiry(&self.expiry);
        WidgetSnapshot {
            number: self.number.clone(),
            exp_month,
            exp_year,
            cvc: self.cvc.clone(),
            postal_code: if self.postal_code_entry_enabled {
                self.postal_code.clone()
            } else {
                String::new()
            },
            last4: last4(&self.number),
            brand: brand_for_number(&self.number),
            fields,
            is_valid: fields.is_complete(self.postal_code_entry_enabled),
            postal_code_entry_enabled: self.postal_code_entry_enabled,
        }
    }

    fn apply_appearance(&mut self, appearance: &Appearance) {
        self.appearance = appearance.clone();
    }

    fn set_postal_code_entry_enabled(&mut self, enabled: bool) -> Vec<WidgetEvent> {
        if self.postal_code_entry_enabled == enabled {
            return Vec::new();
        }
        self.postal_code_entry_enabled = enabled;
        if !enabled && self.focused == Some(CardField::PostalCode) {
            self.focused = None;
            return vec![WidgetEvent::DidEndEditing];
        }
        Vec::new()
    }

    fn become_first_responder(&mut self) -> Vec<WidgetEvent> {
        if self.focused.is_some() {
            return Vec::new();
        }
        let target = self
            .field_states()
            .first_incomplete(self.postal_code_entry_enabled)
            .unwrap_or(CardField::CardNumber);
        let mut events = Vec::new();
        self.move_focus(target, &mut events);
        events
    }

    fn resign_first_responder(&mut self) -> Vec<WidgetEvent> {
        match self.focused.take() {
            Some(_) => vec![WidgetEvent::DidEndEditing],
            None => Vec::new(),
        }
    }

    fn clear(&mut self) -> Vec<WidgetEvent> {
        self.number.clear();
        self.expiry.clear();
        self.cvc.clear();
        self.postal_code.clear();
        vec![WidgetEvent::DidChange(self.snapshot())]
    }

    fn set_card_details(&mut self, details: &CardDetails) -> Vec<WidgetEvent> {
        let mut number = digits_only(details.number.as_deref().unwrap_or_default());
        number.truncate(brand_for_number(&number).max_number_length());
        self.number = number;

        self.expiry = prefill_expiry(details.expiration_month, details.expiration_year);

        let mut cvc = digits_only(details.cvc.as_deref().unwrap_or_default());
        cvc.truncate(brand_for_number(&self.number).max_cvc_length());
        self.cvc = cvc;

        vec![WidgetEvent::DidChange(self.snapshot())]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

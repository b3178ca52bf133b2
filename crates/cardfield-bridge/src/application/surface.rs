//! Native card surface: the adapter over the trusted card widget.
//!
//! The widget itself (rendering, keystroke handling, validation) is a
//! certified black box reached through the [`CardWidget`] trait.  Platform
//! implementations live in the infrastructure layer.
//!
//! [`NativeCardSurface`] is the thin adapter the bridge component talks to:
//!
//! - `current_state()` reads the widget on every call; nothing is cached, so
//!   validity can never go stale across configuration changes.
//! - `apply_appearance()` hands the widget one fully resolved
//!   [`Appearance`], so style and placeholders change together.
//! - Every mutating call forwards the widget's delegate notifications to a
//!   [`CardSurfaceObserver`], in the order the widget raised them.
//!
//! # Notification model
//!
//! Mutating widget calls return the delegate notifications they caused as
//! [`WidgetEvent`]s.  A `DidChange` carries the widget snapshot taken at that
//! keystroke, so a burst of typing yields one distinct state per character.

use cardfield_core::domain::card::{CardBrand, CardDetails, CardField, CardState, FieldStates};
use cardfield_core::domain::style::Appearance;
use tracing::debug;

// ── Widget boundary ───────────────────────────────────────────────────────────

/// What the widget knows at one instant.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct WidgetSnapshot {
    /// Card number digits as typed.
    pub number: String,
    pub exp_month: Option<u32>,
    /// Four-digit year.
    pub exp_year: Option<u32>,
    pub cvc: String,
    pub postal_code: String,
    pub last4: Option<String>,
    pub brand: CardBrand,
    pub fields: FieldStates,
    /// The widget's own whole-surface verdict.
    pub is_valid: bool,
    pub postal_code_entry_enabled: bool,
}

impl std::fmt::Debug for WidgetSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetSnapshot")
            .field("fields", &self.fields)
            .field("brand", &self.brand)
            .field("last4", &self.last4)
            .field("is_valid", &self.is_valid)
            .finish_non_exhaustive()
    }
}

/// A delegate notification raised by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A field value changed (one per keystroke).
    DidChange(WidgetSnapshot),
    /// Editing moved into `field`.
    DidBeginEditing(CardField),
    /// The widget as a whole stopped editing.
    DidEndEditing,
}

/// The trusted card-entry widget.
///
/// Implementations must support programmatic focus, blur, and clear, and
/// expose live validity, brand, last four digits, and postal code text.
#[cfg_attr(test, mockall::automock)]
pub trait CardWidget {
    /// Live state, computed at call time.
    fn snapshot(&self) -> WidgetSnapshot;

    /// Replaces every visual property at once.
    fn apply_appearance(&mut self, appearance: &Appearance);

    /// Shows or hides the postal code sub-field.
    fn set_postal_code_entry_enabled(&mut self, enabled: bool) -> Vec<WidgetEvent>;

    /// Takes first-responder status.  No-op if already editing.
    fn become_first_responder(&mut self) -> Vec<WidgetEvent>;

    /// Gives up first-responder status.  No-op if not editing.
    fn resign_first_responder(&mut self) -> Vec<WidgetEvent>;

    /// Empties every field without moving focus.
    fn clear(&mut self) -> Vec<WidgetEvent>;

    /// Replaces field values with host-supplied details.
    fn set_card_details(&mut self, details: &CardDetails) -> Vec<WidgetEvent>;
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Receives translated widget notifications.
pub trait CardSurfaceObserver {
    /// Called once per keystroke-level change with the state at that moment.
    fn on_value_changed(&mut self, state: &CardState);

    /// Called when editing moves to a field (`Some`) or stops (`None`).
    fn on_focus_changed(&mut self, field: Option<CardField>);
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// Adapter over a [`CardWidget`].
pub struct NativeCardSurface<W> {
    widget: W,
}

impl<W: CardWidget> NativeCardSurface<W> {
    pub fn new(widget: W) -> Self {
        Self { widget }
    }

    /// Read-only access to the wrapped widget.
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// The card as the widget sees it right now.
    pub fn current_state(&self) -> CardState {
        state_from_snapshot(&self.widget.snapshot())
    }

    pub fn apply_appearance(&mut self, appearance: &Appearance) {
        self.widget.apply_appearance(appearance);
    }

    pub fn set_postal_code_entry_enabled(&mut self, enabled: bool, observer: &mut dyn CardSurfaceObserver) {
        let events = self.widget.set_postal_code_entry_enabled(enabled);
        deliver(events, observer);
    }

    pub fn focus(&mut self, observer: &mut dyn CardSurfaceObserver) {
        let events = self.widget.become_first_responder();
        deliver(events, observer);
    }

    pub fn blur(&mut self, observer: &mut dyn CardSurfaceObserver) {
        let events = self.widget.resign_first_responder();
        deliver(events, observer);
    }

    pub fn clear(&mut self, observer: &mut dyn CardSurfaceObserver) {
        let events = self.widget.clear();
        deliver(events, observer);
    }

    pub fn set_card_details(&mut self, details: &CardDetails, observer: &mut dyn CardSurfaceObserver) {
        let events = self.widget.set_card_details(details);
        deliver(events, observer);
    }

    /// Runs a user interaction against the widget (keystrokes, taps) and
    /// forwards whatever it raised.
    pub fn handle_input<F>(&mut self, input: F, observer: &mut dyn CardSurfaceObserver)
    where
        F: FnOnce(&mut W) -> Vec<WidgetEvent>,
    {
        let events = input(&mut self.widget);
        deliver(events, observer);
    }
}

fn deliver(events: Vec<WidgetEvent>, observer: &mut dyn CardSurfaceObserver) {
    for event in events {
        match event {
            WidgetEvent::DidChange(snapshot) => observer.on_value_changed(&state_from_snapshot(&snapshot)),
            WidgetEvent::DidBeginEditing(field) => observer.on_focus_changed(Some(field)),
            WidgetEvent::DidEndEditing => observer.on_focus_changed(None),
        }
    }
}

fn state_from_snapshot(snapshot: &WidgetSnapshot) -> CardState {
    let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let fields_complete = snapshot.fields.is_complete(snapshot.postal_code_entry_enabled);
    if snapshot.is_valid != fields_complete {
        debug!(
            widget_valid = snapshot.is_valid,
            fields_complete,
            "widget verdict disagrees with field states; completeness follows the fields"
        );
    }
    CardState {
        is_valid: snapshot.is_valid,
        fields: snapshot.fields,
        number: text(&snapshot.number),
        exp_month: snapshot.exp_month,
        exp_year: snapshot.exp_year,
        cvc: text(&snapshot.cvc),
        last4: snapshot.last4.clone(),
        brand: snapshot.brand,
        postal_code: text(&snapshot.postal_code),
        postal_code_enabled: snapshot.postal_code_entry_enabled,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! CardFieldView: the bridge component.
//!
//! One `CardFieldView` exists per mounted card field.  It owns the
//! [`NativeCardSurface`] and translates in both directions:
//!
//! ```text
//! host ──config / commands──> CardFieldView ──> NativeCardSurface ──> widget
//! host <──onCardChange / onFocusChange── CardFieldView <──observer── surface
//! ```
//!
//! # State kept here
//!
//! - The current [`CardFieldConfig`].  Flags are read at emission time, so
//!   toggling `dangerouslyGetFullCardDetails` affects the *next* change event
//!   and never re-emits an old one.
//! - The [`ValidatedCard`] snapshot: stored on every change that leaves the
//!   surface complete, cleared on every change that does not.
//! - The last focus target reported to the host.
//!
//! # Focus coalescing
//!
//! The widget may move editing through several fields while handling one
//! gesture or command (e.g. auto-advancing after a pasted number).  Focus
//! notifications are buffered for the duration of each surface call and only
//! the final target is reported, and only if it differs from the last
//! reported one.
//!
//! Commands never emit events themselves.  They drive the widget, and the
//! widget's own notifications produce the events.

use std::sync::Arc;

use cardfield_core::domain::card::{CardDetails, CardField, CardParams, CardState, ValidatedCard};
use cardfield_core::domain::config::CardFieldConfig;
use cardfield_core::domain::style::{Appearance, CardStyle, FontResolver, Placeholders};
use cardfield_core::protocol::commands::CardFieldCommand;
use cardfield_core::protocol::events::{CardChangeEvent, DataExposure, FocusEvent, HostEvent};
use tracing::{debug, trace};

use crate::application::host::{ComponentId, HostEventSink, SurfaceContext};
use crate::application::props::CardFieldProp;
use crate::application::surface::{CardSurfaceObserver, CardWidget, NativeCardSurface, WidgetEvent};

// ── Observer half ─────────────────────────────────────────────────────────────

/// The state a component keeps between notifications.
///
/// Split from the surface so the surface can borrow it mutably as its
/// observer while the component owns both.
struct BridgeState {
    id: ComponentId,
    sink: Arc<dyn HostEventSink>,
    config: CardFieldConfig,
    validated: Option<ValidatedCard>,
    reported_focus: Option<CardField>,
    pending_focus: Option<Option<CardField>>,
}

impl BridgeState {
    fn exposure(&self, state: &CardState) -> DataExposure {
        DataExposure {
            postal_code: state.postal_code_enabled,
            full_card_details: self.config.dangerously_get_full_card_details,
        }
    }

    /// Stores or clears the validated snapshot to match `state`.
    fn refresh_snapshot(&mut self, state: &CardState) {
        let next = state.validated_card();
        match (&self.validated, &next) {
            (None, Some(card)) => {
                debug!(component = %self.id, brand = ?state.brand, last4 = card.params.last4(), "card complete")
            }
            (Some(_), None) => debug!(component = %self.id, "card no longer complete"),
            _ => {}
        }
        self.validated = next;
    }

    /// Reports the final focus target of the surface call that just ended.
    fn flush_focus(&mut self) {
        let Some(target) = self.pending_focus.take() else {
            return;
        };
        if target == self.reported_focus {
            trace!(component = %self.id, "focus unchanged; nothing reported");
            return;
        }
        self.reported_focus = target;
        debug!(component = %self.id, focused = ?target, "focus changed");
        self.sink.emit(self.id, HostEvent::FocusChange(FocusEvent { focused_field: target }));
    }
}

impl CardSurfaceObserver for BridgeState {
    fn on_value_changed(&mut self, state: &CardState) {
        let event = CardChangeEvent::from_state(state, self.exposure(state));
        trace!(component = %self.id, ?event, "card changed");
        self.sink.emit(self.id, HostEvent::CardChange(event));
        self.refresh_snapshot(state);
    }

    fn on_focus_changed(&mut self, field: Option<CardField>) {
        self.pending_focus = Some(field);
    }
}

// ── Component ─────────────────────────────────────────────────────────────────

/// The bridge component for one mounted card field.
pub struct CardFieldView<W: CardWidget> {
    surface: NativeCardSurface<W>,
    state: BridgeState,
    fonts: Arc<dyn FontResolver + Send + Sync>,
}

impl<W: CardWidget> CardFieldView<W> {
    /// Wraps `widget` and applies the default configuration.
    ///
    /// Defaults are applied silently: construction never emits events and
    /// never requests focus (`autofocus` defaults to `false`).
    pub fn new(id: ComponentId, widget: W, context: &SurfaceContext) -> Self {
        let mut view = Self {
            surface: NativeCardSurface::new(widget),
            state: BridgeState {
                id,
                sink: Arc::clone(&context.sink),
                config: CardFieldConfig::default(),
                validated: None,
                reported_focus: None,
                pending_focus: None,
            },
            fonts: Arc::clone(&context.fonts),
        };
        let postal = view.state.config.postal_code_enabled;
        view.drive(|surface, observer| surface.set_postal_code_entry_enabled(postal, observer));
        view.reapply_appearance();
        view
    }

    pub fn id(&self) -> ComponentId {
        self.state.id
    }

    pub fn config(&self) -> &CardFieldConfig {
        &self.state.config
    }

    /// Read-only access to the wrapped widget.
    pub fn widget(&self) -> &W {
        self.surface.widget()
    }

    /// The live card state as reported by the surface.
    pub fn current_state(&self) -> CardState {
        self.surface.current_state()
    }

    /// The validated card data, present only while the surface is complete.
    pub fn card_params(&self) -> Option<&CardParams> {
        self.state.validated.as_ref().map(|v| &v.params)
    }

    /// The validated card data plus postal code.
    pub fn validated_card(&self) -> Option<&ValidatedCard> {
        self.state.validated.as_ref()
    }

    /// The last focus target reported to the host.
    pub fn focused_field(&self) -> Option<CardField> {
        self.state.reported_focus
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// Applies a whole option set, e.g. initial mount props.
    pub fn apply_config(&mut self, config: &CardFieldConfig) {
        self.set_postal_code_enabled(config.postal_code_enabled);
        self.set_dangerously_get_full_card_details(config.dangerously_get_full_card_details);
        if self.state.config.placeholder != config.placeholder || self.state.config.card_style != config.card_style {
            self.state.config.placeholder = config.placeholder.clone();
            self.state.config.card_style = config.card_style.clone();
            self.reapply_appearance();
        }
        self.set_autofocus(config.autofocus);
    }

    /// Applies one decoded host prop.
    pub fn apply_prop(&mut self, prop: CardFieldProp) {
        match prop {
            CardFieldProp::PostalCodeEnabled(v) => self.set_postal_code_enabled(v),
            CardFieldProp::Autofocus(v) => self.set_autofocus(v),
            CardFieldProp::DangerouslyGetFullCardDetails(v) => self.set_dangerously_get_full_card_details(v),
            CardFieldProp::Placeholder(p) => self.set_placeholder(p),
            CardFieldProp::CardStyle(s) => self.set_card_style(s),
        }
    }

    /// Shows or hides the postal code field.
    ///
    /// The stored snapshot is re-evaluated immediately, since the set of
    /// required fields changed.  No change event is emitted.
    pub fn set_postal_code_enabled(&mut self, enabled: bool) {
        self.state.config.postal_code_enabled = enabled;
        self.drive(|surface, observer| surface.set_postal_code_entry_enabled(enabled, observer));
        let current = self.surface.current_state();
        self.state.refresh_snapshot(&current);
    }

    /// `true` requests focus immediately; `false` does nothing retroactively.
    pub fn set_autofocus(&mut self, autofocus: bool) {
        self.state.config.autofocus = autofocus;
        if autofocus {
            self.drive(|surface, observer| surface.focus(observer));
        }
    }

    /// Takes effect on the next change event.
    pub fn set_dangerously_get_full_card_details(&mut self, enabled: bool) {
        self.state.config.dangerously_get_full_card_details = enabled;
    }

    pub fn set_placeholder(&mut self, placeholder: Placeholders) {
        if self.state.config.placeholder == placeholder {
            return;
        }
        self.state.config.placeholder = placeholder;
        self.reapply_appearance();
    }

    pub fn set_card_style(&mut self, style: CardStyle) {
        if self.state.config.card_style == style {
            return;
        }
        self.state.config.card_style = style;
        self.reapply_appearance();
    }

    fn reapply_appearance(&mut self) {
        let appearance = Appearance::resolve(
            &self.state.config.card_style,
            &self.state.config.placeholder,
            self.fonts.as_ref(),
        );
        self.surface.apply_appearance(&appearance);
    }

    // ── Commands ──────────────────────────────────────────────────────────

    pub fn execute(&mut self, command: CardFieldCommand) {
        debug!(component = %self.state.id, command = command.as_str(), "executing command");
        match command {
            CardFieldCommand::Focus => self.drive(|surface, observer| surface.focus(observer)),
            CardFieldCommand::Blur => self.drive(|surface, observer| surface.blur(observer)),
            CardFieldCommand::Clear => {
                self.drive(|surface, observer| surface.clear(observer));
                let current = self.surface.current_state();
                self.state.refresh_snapshot(&current);
            }
        }
    }

    /// Pushes host-supplied card details into the widget.
    pub fn set_card_details(&mut self, details: &CardDetails) {
        self.drive(|surface, observer| surface.set_card_details(details, observer));
    }

    /// Delivers a user interaction (keystrokes, taps) performed on the widget.
    pub fn handle_input<F>(&mut self, input: F)
    where
        F: FnOnce(&mut W) -> Vec<WidgetEvent>,
    {
        self.drive(|surface, observer| surface.handle_input(input, observer));
    }

    /// Runs one surface call with `self.state` as its observer, then reports
    /// the call's final focus target.
    fn drive<F>(&mut self, call: F)
    where
        F: FnOnce(&mut NativeCardSurface<W>, &mut dyn CardSurfaceObserver),
    {
        call(&mut self.surface, &mut self.state);
        self.state.flush_focus();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use cardfield_core::domain::card::{CardBrand, FieldState, FieldStates};

    use crate::application::surface::{MockCardWidget, WidgetSnapshot};

    #[derive(Default)]
    struct CollectingSink {
        events: Mutex<Vec<HostEvent>>,
    }

    impl HostEventSink for CollectingSink {
        fn emit(&self, _source: ComponentId, event: HostEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct NoFonts;

    impl FontResolver for NoFonts {
        fn has_family(&self, _family: &str) -> bool {
            false
        }
    }

    fn complete_snapshot() -> WidgetSnapshot {
        WidgetSnapshot {
            number: "4242424242424242".to_string(),
            exp_month: Some(12),
            exp_year: Some(2034),
            cvc: "123".to_string(),
            postal_code: String::new(),
            last4: Some("4242".to_string()),
            brand: CardBrand::Visa,
            fields: FieldStates {
                number: FieldState::Valid,
                expiry: FieldState::Valid,
                cvc: FieldState::Valid,
                postal_code: FieldState::Empty,
            },
            is_valid: true,
            postal_code_entry_enabled: false,
        }
    }

    /// A mock widget that accepts the construction-time calls.
    fn permissive_widget() -> MockCardWidget {
        let mut widget = MockCardWidget::new();
        widget.expect_set_postal_code_entry_enabled().returning(|_| Vec::new());
        widget.expect_apply_appearance().return_const(());
        widget.expect_snapshot().returning(WidgetSnapshot::default);
        widget
    }

    fn make_view(widget: MockCardWidget) -> (CardFieldView<MockCardWidget>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        let context = SurfaceContext {
            sink: Arc::clone(&sink) as Arc<dyn HostEventSink>,
            fonts: Arc::new(NoFonts),
        };
        (CardFieldView::new(ComponentId::new(), widget, &context), sink)
    }

    #[test]
    fn test_construction_emits_nothing() {
        let (view, sink) = make_view(permissive_widget());

        assert!(sink.events.lock().unwrap().is_empty());
        assert!(view.card_params().is_none());
        assert_eq!(view.focused_field(), None);
    }

    #[test]
    fn test_change_to_complete_stores_params_and_emits_once() {
        // Arrange
        let (mut view, sink) = make_view(permissive_widget());

        // Act
        view.handle_input(|_| vec![WidgetEvent::DidChange(complete_snapshot())]);

        // Assert
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            HostEvent::CardChange(e) => {
                assert!(e.complete);
                assert_eq!(e.number, None);
            }
            other => panic!("unexpected event {other:?}"),
        }
        let params = view.card_params().expect("params stored when complete");
        assert_eq!(params.number, "4242424242424242");
    }

    #[test]
    fn test_change_out_of_complete_clears_params() {
        let (mut view, _sink) = make_view(permissive_widget());
        view.handle_input(|_| vec![WidgetEvent::DidChange(complete_snapshot())]);

        let mut partial = complete_snapshot();
        partial.cvc = "12".to_string();
        partial.fields.cvc = FieldState::Entering;
        partial.is_valid = false;
        view.handle_input(move |_| vec![WidgetEvent::DidChange(partial)]);

        assert!(view.card_params().is_none());
    }

    #[test]
    fn test_full_details_flag_read_at_emission_time() {
        let (mut view, sink) = make_view(permissive_widget());

        view.set_dangerously_get_full_card_details(true);
        view.handle_input(|_| vec![WidgetEvent::DidChange(complete_snapshot())]);
        view.set_dangerously_get_full_card_details(false);
        view.handle_input(|_| vec![WidgetEvent::DidChange(complete_snapshot())]);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2, "toggling the flag must not re-emit");
        let numbers: Vec<_> = events
            .iter()
            .map(|e| match e {
                HostEvent::CardChange(c) => c.number.clone(),
                HostEvent::FocusChange(_) => panic!("unexpected focus event"),
            })
            .collect();
        assert_eq!(numbers, vec![Some("4242424242424242".to_string()), None]);
    }

    #[test]
    fn test_focus_notifications_in_one_gesture_are_coalesced() {
        let (mut view, sink) = make_view(permissive_widget());

        view.handle_input(|_| {
            vec![
                WidgetEvent::DidBeginEditing(CardField::CardNumber),
                WidgetEvent::DidBeginEditing(CardField::ExpiryDate),
                WidgetEvent::DidBeginEditing(CardField::Cvc),
            ]
        });

        let events = sink.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![HostEvent::FocusChange(FocusEvent { focused_field: Some(CardField::Cvc) })]
        );
        drop(events);
        assert_eq!(view.focused_field(), Some(CardField::Cvc));
    }

    #[test]
    fn test_repeated_focus_target_is_reported_once() {
        let (mut view, sink) = make_view(permissive_widget());

        view.handle_input(|_| vec![WidgetEvent::DidBeginEditing(CardField::CardNumber)]);
        view.handle_input(|_| vec![WidgetEvent::DidBeginEditing(CardField::CardNumber)]);
        view.handle_input(|_| vec![WidgetEvent::DidEndEditing]);
        view.handle_input(|_| vec![WidgetEvent::DidEndEditing]);

        let events = sink.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                HostEvent::FocusChange(FocusEvent { focused_field: Some(CardField::CardNumber) }),
                HostEvent::FocusChange(FocusEvent { focused_field: None }),
            ]
        );
    }

    #[test]
    fn test_style_change_reapplies_appearance_once_and_skips_duplicates() {
        // Arrange: one application at construction, one for the new style.
        let mut widget = MockCardWidget::new();
        widget.expect_set_postal_code_entry_enabled().returning(|_| Vec::new());
        widget.expect_snapshot().returning(WidgetSnapshot::default);
        widget.expect_apply_appearance().times(2).return_const(());
        let (mut view, _sink) = make_view(widget);
        let style = CardStyle { border_width: Some(2.0), ..CardStyle::default() };

        // Act
        view.set_card_style(style.clone());
        view.set_card_style(style);
    }

    #[test]
    fn test_autofocus_false_does_not_touch_focus() {
        let mut widget = permissive_widget();
        widget.expect_become_first_responder().times(0);
        let (mut view, _sink) = make_view(widget);

        view.set_autofocus(false);

        assert!(!view.config().autofocus);
    }

    #[test]
    fn test_autofocus_true_requests_focus() {
        let mut widget = permissive_widget();
        widget
            .expect_become_first_responder()
            .times(1)
            .returning(|| vec![WidgetEvent::DidBeginEditing(CardField::CardNumber)]);
        let (mut view, sink) = make_view(widget);

        view.set_autofocus(true);

        assert_eq!(view.focused_field(), Some(CardField::CardNumber));
        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_drops_params_even_without_widget_notification() {
        // Arrange: the widget reports complete, then clears silently.
        let mut widget = MockCardWidget::new();
        widget.expect_set_postal_code_entry_enabled().returning(|_| Vec::new());
        widget.expect_apply_appearance().return_const(());
        widget.expect_snapshot().returning(WidgetSnapshot::default);
        widget.expect_clear().times(1).returning(Vec::new);
        let (mut view, _sink) = make_view(widget);
        view.handle_input(|_| vec![WidgetEvent::DidChange(complete_snapshot())]);
        assert!(view.card_params().is_some());

        // Act
        view.execute(CardFieldCommand::Clear);

        // Assert
        assert!(view.card_params().is_none());
    }
}

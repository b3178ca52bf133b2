//! CardFieldManager: component registry and host-facing entry points.
//!
//! The manager is the hosting module's view of every mounted card field.  It
//! creates components on mount, destroys them on unmount, and routes
//! configuration and commands by [`ComponentId`].
//!
//! # Addressing
//!
//! ```text
//! mount() ──► ComponentId ──► set_prop / dispatch / set_card_details
//!                  │
//!                  └─ most recent live mount is also "current"
//! ```
//!
//! Commands always name their target explicitly.  The "current" instance
//! (last mounted and still live) exists only for id-less reads such as
//! [`CardFieldManager::current_card_params`].
//!
//! Addressing an id that is not mounted is never an error: the call is logged
//! at `debug` level and reported as [`DispatchOutcome::NoInstance`].

use std::collections::HashMap;

use cardfield_core::domain::card::{CardDetails, CardParams, ValidatedCard};
use cardfield_core::domain::config::CardFieldConfig;
use cardfield_core::protocol::commands::CardFieldCommand;
use cardfield_core::protocol::events::exported_direct_event_types;
use cardfield_core::protocol::VIEW_NAME;
use serde_json::Value;
use tracing::{debug, info};

use crate::application::card_field::CardFieldView;
use crate::application::host::{ComponentId, SurfaceContext};
use crate::application::props::CardFieldProp;
use crate::application::surface::{CardWidget, WidgetEvent};

/// Result of routing a host call to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The addressed component handled the call.
    Delivered,
    /// No live component has this id.
    NoInstance,
    /// The command or prop name is not one this component understands.
    Unrecognized,
}

/// Registry of mounted card fields.
pub struct CardFieldManager<W: CardWidget> {
    factory: Box<dyn FnMut() -> W>,
    context: SurfaceContext,
    components: HashMap<ComponentId, CardFieldView<W>>,
    /// Live ids in mount order; the last entry is the current instance.
    mount_order: Vec<ComponentId>,
}

impl<W: CardWidget> CardFieldManager<W> {
    /// Creates an empty manager.  `factory` builds one fresh widget per mount.
    pub fn new<F>(factory: F, context: SurfaceContext) -> Self
    where
        F: FnMut() -> W + 'static,
    {
        Self {
            factory: Box::new(factory),
            context,
            components: HashMap::new(),
            mount_order: Vec::new(),
        }
    }

    /// The view name the host runtime registers.
    pub fn view_name(&self) -> &'static str {
        VIEW_NAME
    }

    /// Direct-event declarations for the host runtime.
    pub fn exported_event_types(&self) -> Value {
        exported_direct_event_types()
    }

    /// Creates and registers a component with the given initial options.
    pub fn mount(&mut self, config: &CardFieldConfig) -> ComponentId {
        let id = ComponentId::new();
        let mut view = CardFieldView::new(id, (self.factory)(), &self.context);
        view.apply_config(config);
        self.components.insert(id, view);
        self.mount_order.push(id);
        info!(component = %id, live = self.components.len(), "card field mounted");
        id
    }

    /// Destroys a component.  Returns `false` if it was not mounted.
    pub fn unmount(&mut self, id: ComponentId) -> bool {
        if self.components.remove(&id).is_none() {
            debug!(component = %id, "unmount ignored: not mounted");
            return false;
        }
        self.mount_order.retain(|live| *live != id);
        info!(component = %id, live = self.components.len(), "card field unmounted");
        true
    }

    pub fn get(&self, id: ComponentId) -> Option<&CardFieldView<W>> {
        self.components.get(&id)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut CardFieldView<W>> {
        self.components.get_mut(&id)
    }

    /// The most recently mounted live component.
    pub fn current(&self) -> Option<&CardFieldView<W>> {
        self.mount_order.last().and_then(|id| self.components.get(id))
    }

    /// Validated card data of the current component.
    pub fn current_card_params(&self) -> Option<&CardParams> {
        self.current().and_then(CardFieldView::card_params)
    }

    /// Validated card data plus postal code of the current component.
    pub fn current_validated_card(&self) -> Option<&ValidatedCard> {
        self.current().and_then(CardFieldView::validated_card)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    // ── Host entry points ─────────────────────────────────────────────────

    /// Routes a typed command.
    pub fn dispatch(&mut self, id: ComponentId, command: CardFieldCommand) -> DispatchOutcome {
        self.with_component(id, |view| view.execute(command))
    }

    /// Routes a string-identified command from the host.
    pub fn receive_command(&mut self, id: ComponentId, command: &str) -> DispatchOutcome {
        match CardFieldCommand::parse(command) {
            Some(command) => self.dispatch(id, command),
            None => {
                debug!(component = %id, command, "unknown command ignored");
                DispatchOutcome::Unrecognized
            }
        }
    }

    /// Applies one host prop update.  Unknown prop names are ignored.
    pub fn set_prop(&mut self, id: ComponentId, name: &str, value: &Value) -> DispatchOutcome {
        match CardFieldProp::decode(name, value) {
            Some(prop) => self.with_component(id, |view| view.apply_prop(prop)),
            None => {
                debug!(component = %id, prop = name, "unknown prop ignored");
                DispatchOutcome::Unrecognized
            }
        }
    }

    /// Pushes host-supplied card details into a component's widget.
    pub fn set_card_details(&mut self, id: ComponentId, details: &CardDetails) -> DispatchOutcome {
        self.with_component(id, |view| view.set_card_details(details))
    }

    /// Delivers a user interaction to a component's widget.
    pub fn handle_input<F>(&mut self, id: ComponentId, input: F) -> DispatchOutcome
    where
        F: FnOnce(&mut W) -> Vec<WidgetEvent>,
    {
        self.with_component(id, |view| view.handle_input(input))
    }

    fn with_component<F>(&mut self, id: ComponentId, call: F) -> DispatchOutcome
    where
        F: FnOnce(&mut CardFieldView<W>),
    {
        match self.components.get_mut(&id) {
            Some(view) => {
                call(view);
                DispatchOutcome::Delivered
            }
            None => {
                debug!(component = %id, "call ignored: component not mounted");
                DispatchOutcome::NoInstance
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use cardfield_core::domain::style::FontResolver;
    use cardfield_core::protocol::events::HostEvent;
    use serde_json::json;

    use crate::application::host::HostEventSink;
    use crate::application::surface::{MockCardWidget, WidgetSnapshot};

    #[derive(Default)]
    struct CollectingSink {
        events: Mutex<Vec<(ComponentId, HostEvent)>>,
    }

    impl HostEventSink for CollectingSink {
        fn emit(&self, source: ComponentId, event: HostEvent) {
            self.events.lock().unwrap().push((source, event));
        }
    }

    struct NoFonts;

    impl FontResolver for NoFonts {
        fn has_family(&self, _family: &str) -> bool {
            false
        }
    }

    fn quiet_widget() -> MockCardWidget {
        let mut widget = MockCardWidget::new();
        widget.expect_set_postal_code_entry_enabled().returning(|_| Vec::new());
        widget.expect_apply_appearance().return_const(());
        widget.expect_snapshot().returning(WidgetSnapshot::default);
        widget.expect_become_first_responder().returning(Vec::new);
        widget.expect_resign_first_responder().returning(Vec::new);
        widget.expect_clear().returning(Vec::new);
        widget
    }

    fn make_manager() -> (CardFieldManager<MockCardWidget>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        let context = SurfaceContext {
            sink: Arc::clone(&sink) as Arc<dyn HostEventSink>,
            fonts: Arc::new(NoFonts),
        };
        (CardFieldManager::new(quiet_widget, context), sink)
    }

    #[test]
    fn test_manager_starts_empty() {
        let (manager, _sink) = make_manager();
        assert!(manager.is_empty());
        assert!(manager.current().is_none());
        assert!(manager.current_card_params().is_none());
    }

    #[test]
    fn test_mount_registers_component_with_config() {
        let (mut manager, _sink) = make_manager();
        let config = CardFieldConfig { postal_code_enabled: false, ..CardFieldConfig::default() };

        let id = manager.mount(&config);

        assert_eq!(manager.len(), 1);
        let view = manager.get(id).expect("mounted");
        assert!(!view.config().postal_code_enabled);
    }

    #[test]
    fn test_current_is_last_mounted_live_instance() {
        let (mut manager, _sink) = make_manager();
        let first = manager.mount(&CardFieldConfig::default());
        let second = manager.mount(&CardFieldConfig::default());
        assert_eq!(manager.current().map(CardFieldView::id), Some(second));

        manager.unmount(second);

        assert_eq!(manager.current().map(CardFieldView::id), Some(first));
    }

    #[test]
    fn test_command_to_unmounted_id_is_a_no_op() {
        let (mut manager, sink) = make_manager();
        let id = manager.mount(&CardFieldConfig::default());
        assert!(manager.unmount(id));

        let outcome = manager.receive_command(id, "focus");

        assert_eq!(outcome, DispatchOutcome::NoInstance);
        assert!(sink.events.lock().unwrap().is_empty());
        assert!(!manager.unmount(id));
    }

    #[test]
    fn test_unknown_command_and_prop_are_unrecognized() {
        let (mut manager, _sink) = make_manager();
        let id = manager.mount(&CardFieldConfig::default());

        assert_eq!(manager.receive_command(id, "submit"), DispatchOutcome::Unrecognized);
        assert_eq!(manager.set_prop(id, "onCardChange", &json!(true)), DispatchOutcome::Unrecognized);
    }

    #[test]
    fn test_set_prop_routes_to_addressed_component() {
        let (mut manager, _sink) = make_manager();
        let a = manager.mount(&CardFieldConfig::default());
        let b = manager.mount(&CardFieldConfig::default());

        let outcome = manager.set_prop(a, "dangerouslyGetFullCardDetails", &json!(true));

        assert_eq!(outcome, DispatchOutcome::Delivered);
        assert!(manager.get(a).unwrap().config().dangerously_get_full_card_details);
        assert!(!manager.get(b).unwrap().config().dangerously_get_full_card_details);
    }

    #[test]
    fn test_event_declarations() {
        let (manager, _sink) = make_manager();

        assert_eq!(manager.view_name(), "CardField");
        let exported = manager.exported_event_types();
        assert_eq!(exported["topCardChange"]["registrationName"], "onCardChange");
        assert_eq!(exported["topFocusChange"]["registrationName"], "onFocusChange");
    }
}

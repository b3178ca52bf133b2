//! Integration tests for host calls marshalled onto the UI thread.
//!
//! An async host task drives a card field through `UiHandle` while events
//! come back over a `ChannelEventSink`, as in the demo binary.

use std::sync::Arc;

use cardfield_bridge::application::host::{HostEventSink, SurfaceContext};
use cardfield_bridge::application::registry::CardFieldManager;
use cardfield_bridge::infrastructure::event_sink::{ChannelEventSink, EmittedEvent};
use cardfield_bridge::infrastructure::fonts::FontCatalog;
use cardfield_bridge::infrastructure::native_surface::SimulatedCardWidget;
use cardfield_bridge::infrastructure::ui_thread::UiThread;
use cardfield_core::{CardField, CardFieldConfig, YearMonth};
use serde_json::json;
use tokio::sync::mpsc;

fn start() -> (UiThread<SimulatedCardWidget>, mpsc::UnboundedReceiver<EmittedEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let context = SurfaceContext {
        sink: Arc::new(ChannelEventSink::new(tx)) as Arc<dyn HostEventSink>,
        fonts: Arc::new(FontCatalog::bundled()),
    };
    let thread = UiThread::spawn(move || {
        CardFieldManager::new(
            || SimulatedCardWidget::new(YearMonth { year: 2026, month: 10 }),
            context,
        )
    })
    .expect("UI thread starts");
    (thread, rx)
}

#[tokio::test]
async fn test_typed_card_flows_back_as_events_and_params() {
    // Arrange
    let (thread, mut events) = start();
    let ui = thread.handle();
    let config = CardFieldConfig { postal_code_enabled: false, ..CardFieldConfig::default() };
    let id = ui.mount(config).await.expect("mounted");

    // Act
    ui.command(id, "focus");
    ui.input(id, |w| w.type_text("4242424242424242"));
    ui.input(id, |w| w.type_text("1234"));
    ui.input(id, |w| w.type_text("123"));
    let params = ui.current_card_params().await.expect("reply");
    ui.unmount(id);
    drop(ui);
    thread.shutdown().expect("clean shutdown");

    // Assert
    let mut received = Vec::new();
    while let Some(event) = events.recv().await {
        received.push(event);
    }
    assert!(received.iter().all(|e| e.source == id));
    let last_change = received
        .iter()
        .rev()
        .find(|e| e.registration_name == "onCardChange")
        .expect("card change events");
    assert_eq!(
        last_change.payload,
        json!({
            "expiryMonth": 12,
            "expiryYear": 2034,
            "complete": true,
            "brand": "Visa",
            "last4": "4242"
        })
    );
    let focus: Vec<_> = received
        .iter()
        .filter(|e| e.registration_name == "onFocusChange")
        .map(|e| e.payload["focusedField"].clone())
        .collect();
    assert_eq!(
        focus,
        vec![
            json!(CardField::CardNumber.as_str()),
            json!(CardField::ExpiryDate.as_str()),
            json!(CardField::Cvc.as_str()),
        ]
    );
    assert_eq!(params.expect("complete").last4(), "4242");
}

#[tokio::test]
async fn test_props_and_commands_from_several_handles_share_one_component() {
    let (thread, _events) = start();
    let first = thread.handle();
    let second = first.clone();
    let id = first.mount(CardFieldConfig::default()).await.expect("mounted");

    second.set_prop(id, "postalCodeEnabled", json!(false));
    first.command(id, "focus");
    second.input(id, |w| w.type_text("42424242424242421234123"));

    let card = first.current_validated_card().await.expect("reply").expect("complete");
    assert_eq!(card.params.cvc, "123");
    assert_eq!(card.postal_code, None);
    thread.shutdown().expect("clean shutdown");
}

#[tokio::test]
async fn test_unknown_command_is_ignored() {
    let (thread, _events) = start();
    let ui = thread.handle();
    let id = ui.mount(CardFieldConfig::default()).await.expect("mounted");

    ui.command(id, "explode");
    let state = ui.current_state(id).await.expect("reply").expect("still mounted");

    assert!(state.number.is_none());
    thread.shutdown().expect("clean shutdown");
}

//! Host event sinks.
//!
//! - [`RecordingEventSink`] keeps every event in memory, in emission order.
//!   Tests and the demo binary inspect it after driving a component.
//! - [`ChannelEventSink`] forwards events over a Tokio channel so an async
//!   host task can deliver them off the UI thread.
//!
//! Both render events into [`EmittedEvent`]: the source component, the
//! host-side registration name, and the JSON payload.

use std::sync::Mutex;

use cardfield_core::protocol::events::HostEvent;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::application::host::{ComponentId, HostEventSink};

/// One event as delivered to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedEvent {
    pub source: ComponentId,
    /// Host prop name, e.g. `"onCardChange"`.
    pub registration_name: &'static str,
    pub payload: Value,
}

impl EmittedEvent {
    /// Renders a host event.  Returns `None` if the payload cannot be
    /// serialized.
    pub fn render(source: ComponentId, event: &HostEvent) -> Option<Self> {
        match event.payload() {
            Ok(payload) => Some(Self {
                source,
                registration_name: event.registration_name(),
                payload,
            }),
            Err(e) => {
                warn!(component = %source, event = event.event_name(), "dropping event: {e}");
                None
            }
        }
    }

    /// The event as one JSON line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

/// Records emitted events without delivering them anywhere.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<EmittedEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every event emitted so far.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Removes and returns every event emitted so far.
    pub fn take(&self) -> Vec<EmittedEvent> {
        self.events.lock().map(|mut e| std::mem::take(&mut *e)).unwrap_or_default()
    }

    /// Payloads of the events registered under `registration_name`.
    pub fn payloads(&self, registration_name: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e.registration_name == registration_name)
            .map(|e| e.payload)
            .collect()
    }
}

impl HostEventSink for RecordingEventSink {
    fn emit(&self, source: ComponentId, event: HostEvent) {
        let Some(rendered) = EmittedEvent::render(source, &event) else {
            return;
        };
        match self.events.lock() {
            Ok(mut events) => events.push(rendered),
            Err(_) => warn!(component = %source, "event log poisoned; event dropped"),
        }
    }
}

// ── Channel ───────────────────────────────────────────────────────────────────

/// Forwards emitted events to an async consumer.
///
/// Emission never blocks.  Once the receiver is dropped, events are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: UnboundedSender<EmittedEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: UnboundedSender<EmittedEvent>) -> Self {
        Self { tx }
    }
}

impl HostEventSink for ChannelEventSink {
    fn emit(&self, source: ComponentId, event: HostEvent) {
        let Some(rendered) = EmittedEvent::render(source, &event) else {
            return;
        };
        if self.tx.send(rendered).is_err() {
            debug!(component = %source, "event receiver gone; event discarded");
        }
    }
}

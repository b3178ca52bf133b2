//! UI-thread confinement for the component registry.
//!
//! Widgets are not thread-safe: every component and the registry that owns
//! them must live on one thread.  [`UiThread`] starts that thread, builds the
//! [`CardFieldManager`] on it, and serves [`HostCall`]s from a channel.
//! [`UiHandle`] is the cloneable, `Send` front door other threads and async
//! tasks use:
//!
//! ```text
//! async task ──UiHandle──► mpsc ──► [cardfield-ui thread]
//!                                     CardFieldManager
//!                                       └─ CardFieldView ─ widget
//!          ◄── oneshot (mount id, query results) ──┘
//! ```
//!
//! Calls are served strictly in send order.  Fire-and-forget calls sent
//! after the thread stopped are logged and dropped.  Calls that expect a
//! reply fail with [`UiThreadError::Stopped`].

use std::thread::JoinHandle;

use cardfield_core::domain::card::{CardDetails, CardParams, CardState, ValidatedCard};
use cardfield_core::domain::config::CardFieldConfig;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::application::host::ComponentId;
use crate::application::registry::CardFieldManager;
use crate::application::surface::{CardWidget, WidgetEvent};

/// Errors raised by the UI-thread front door.
#[derive(Debug, Error)]
pub enum UiThreadError {
    /// The OS refused to start the thread.
    #[error("failed to start UI thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The UI thread exited before answering.
    #[error("UI thread stopped before replying")]
    Stopped,

    /// The UI thread panicked.
    #[error("UI thread panicked")]
    Panicked,
}

/// A user interaction to run against a component's widget.
pub type WidgetInput<W> = Box<dyn FnOnce(&mut W) -> Vec<WidgetEvent> + Send>;

/// One call marshalled onto the UI thread.
pub enum HostCall<W> {
    Mount {
        config: CardFieldConfig,
        reply: oneshot::Sender<ComponentId>,
    },
    Unmount(ComponentId),
    SetProp {
        id: ComponentId,
        name: String,
        value: Value,
    },
    Command {
        id: ComponentId,
        command: String,
    },
    SetCardDetails {
        id: ComponentId,
        details: CardDetails,
    },
    Input {
        id: ComponentId,
        input: WidgetInput<W>,
    },
    CurrentState {
        id: ComponentId,
        reply: oneshot::Sender<Option<CardState>>,
    },
    CurrentCardParams {
        reply: oneshot::Sender<Option<CardParams>>,
    },
    CurrentValidatedCard {
        reply: oneshot::Sender<Option<ValidatedCard>>,
    },
    Shutdown,
}

impl<W> HostCall<W> {
    fn name(&self) -> &'static str {
        match self {
            HostCall::Mount { .. } => "mount",
            HostCall::Unmount(_) => "unmount",
            HostCall::SetProp { .. } => "set_prop",
            HostCall::Command { .. } => "command",
            HostCall::SetCardDetails { .. } => "set_card_details",
            HostCall::Input { .. } => "input",
            HostCall::CurrentState { .. } => "current_state",
            HostCall::CurrentCardParams { .. } => "current_card_params",
            HostCall::CurrentValidatedCard { .. } => "current_validated_card",
            HostCall::Shutdown => "shutdown",
        }
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Sends host calls to the UI thread.
pub struct UiHandle<W> {
    tx: mpsc::UnboundedSender<HostCall<W>>,
}

impl<W> Clone for UiHandle<W> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<W> UiHandle<W> {
    /// `false` once the UI thread has stopped serving calls.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, call: HostCall<W>) -> bool {
        let name = call.name();
        if self.tx.send(call).is_err() {
            warn!(call = name, "UI thread stopped; host call dropped");
            return false;
        }
        true
    }

    async fn request<T>(&self, call: impl FnOnce(oneshot::Sender<T>) -> HostCall<W>) -> Result<T, UiThreadError> {
        let (reply, rx) = oneshot::channel();
        if !self.send(call(reply)) {
            return Err(UiThreadError::Stopped);
        }
        rx.await.map_err(|_| UiThreadError::Stopped)
    }

    /// Mounts a card field and returns its id.
    pub async fn mount(&self, config: CardFieldConfig) -> Result<ComponentId, UiThreadError> {
        self.request(|reply| HostCall::Mount { config, reply }).await
    }

    pub fn unmount(&self, id: ComponentId) {
        self.send(HostCall::Unmount(id));
    }

    /// Applies one host prop update.
    pub fn set_prop(&self, id: ComponentId, name: &str, value: Value) {
        self.send(HostCall::SetProp { id, name: name.to_string(), value });
    }

    /// Sends a string-identified command (`"focus"`, `"blur"`, `"clear"`).
    pub fn command(&self, id: ComponentId, command: &str) {
        self.send(HostCall::Command { id, command: command.to_string() });
    }

    pub fn set_card_details(&self, id: ComponentId, details: CardDetails) {
        self.send(HostCall::SetCardDetails { id, details });
    }

    /// Runs a user interaction against the component's widget.
    pub fn input<F>(&self, id: ComponentId, input: F)
    where
        F: FnOnce(&mut W) -> Vec<WidgetEvent> + Send + 'static,
    {
        self.send(HostCall::Input { id, input: Box::new(input) });
    }

    /// The live card state of a component, or `None` if it is not mounted.
    pub async fn current_state(&self, id: ComponentId) -> Result<Option<CardState>, UiThreadError> {
        self.request(|reply| HostCall::CurrentState { id, reply }).await
    }

    /// Validated card data of the most recently mounted live component.
    pub async fn current_card_params(&self) -> Result<Option<CardParams>, UiThreadError> {
        self.request(|reply| HostCall::CurrentCardParams { reply }).await
    }

    /// Validated card data plus postal code of the current component.
    pub async fn current_validated_card(&self) -> Result<Option<ValidatedCard>, UiThreadError> {
        self.request(|reply| HostCall::CurrentValidatedCard { reply }).await
    }
}

// ── Thread ────────────────────────────────────────────────────────────────────

/// Owns the UI thread.
pub struct UiThread<W> {
    handle: UiHandle<W>,
    join: JoinHandle<()>,
}

impl<W: CardWidget + 'static> UiThread<W> {
    /// Starts the UI thread.  `build` runs on the new thread and creates the
    /// registry there, so the registry itself never crosses threads.
    pub fn spawn<B>(build: B) -> Result<Self, UiThreadError>
    where
        B: FnOnce() -> CardFieldManager<W> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let join = std::thread::Builder::new()
            .name("cardfield-ui".to_string())
            .spawn(move || run(build(), rx))?;
        info!("UI thread started");
        Ok(Self { handle: UiHandle { tx }, join })
    }

    pub fn handle(&self) -> UiHandle<W> {
        self.handle.clone()
    }

    /// Stops the thread after every call already sent has been served.
    pub fn shutdown(self) -> Result<(), UiThreadError> {
        self.handle.send(HostCall::Shutdown);
        self.join.join().map_err(|_| UiThreadError::Panicked)
    }
}

fn run<W: CardWidget>(mut manager: CardFieldManager<W>, mut rx: mpsc::UnboundedReceiver<HostCall<W>>) {
    while let Some(call) = rx.blocking_recv() {
        let name = call.name();
        debug!(call = name, "serving host call");
        match call {
            HostCall::Mount { config, reply } => {
                let id = manager.mount(&config);
                answer(name, reply, id);
            }
            HostCall::Unmount(id) => {
                manager.unmount(id);
            }
            HostCall::SetProp { id, name, value } => {
                manager.set_prop(id, &name, &value);
            }
            HostCall::Command { id, command } => {
                manager.receive_command(id, &command);
            }
            HostCall::SetCardDetails { id, details } => {
                manager.set_card_details(id, &details);
            }
            HostCall::Input { id, input } => {
                manager.handle_input(id, input);
            }
            HostCall::CurrentState { id, reply } => {
                answer(name, reply, manager.get(id).map(|view| view.current_state()));
            }
            HostCall::CurrentCardParams { reply } => {
                answer(name, reply, manager.current_card_params().cloned());
            }
            HostCall::CurrentValidatedCard { reply } => {
                answer(name, reply, manager.current_validated_card().cloned());
            }
            HostCall::Shutdown => break,
        }
    }
    info!(live = manager.len(), "UI thread stopped");
}

/// Replies to a query.  A caller that stopped waiting is logged and skipped.
fn answer<T>(call: &'static str, reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!(call, "caller went away before the reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cardfield_core::domain::validation::YearMonth;
    use cardfield_core::CardField;

    use crate::application::host::{HostEventSink, SurfaceContext};
    use crate::infrastructure::event_sink::RecordingEventSink;
    use crate::infrastructure::fonts::FontCatalog;
    use crate::infrastructure::native_surface::SimulatedCardWidget;

    fn start() -> (UiThread<SimulatedCardWidget>, Arc<RecordingEventSink>) {
        let sink = Arc::new(RecordingEventSink::new());
        let context = SurfaceContext {
            sink: Arc::clone(&sink) as Arc<dyn HostEventSink>,
            fonts: Arc::new(FontCatalog::bundled()),
        };
        let thread = UiThread::spawn(move || {
            CardFieldManager::new(
                || SimulatedCardWidget::new(YearMonth { year: 2026, month: 10 }),
                context,
            )
        })
        .expect("spawn");
        (thread, sink)
    }

    #[tokio::test]
    async fn test_mount_then_prefill_yields_card_params() {
        // Arrange
        let (thread, _sink) = start();
        let ui = thread.handle();
        let config = CardFieldConfig { postal_code_enabled: false, ..CardFieldConfig::default() };
        let id = ui.mount(config).await.expect("mounted");

        // Act
        ui.set_card_details(
            id,
            CardDetails {
                number: Some("4242424242424242".into()),
                expiration_month: Some(12),
                expiration_year: Some(2034),
                cvc: Some("123".into()),
            },
        );
        let params = ui.current_card_params().await.expect("reply");

        // Assert
        let params = params.expect("card complete");
        assert_eq!(params.last4(), "4242");
        assert_eq!((params.expiry_month, params.expiry_year), (12, 2034));
        thread.shutdown().expect("clean shutdown");
    }

    #[tokio::test]
    async fn test_calls_are_served_in_order() {
        let (thread, sink) = start();
        let ui = thread.handle();
        let id = ui.mount(CardFieldConfig::default()).await.expect("mounted");

        ui.command(id, "focus");
        ui.input(id, |w| w.type_text("42"));
        ui.command(id, "blur");
        let state = ui.current_state(id).await.expect("reply").expect("mounted");

        assert_eq!(state.number.as_deref(), Some("42"));
        let focus = sink.payloads("onFocusChange");
        assert_eq!(focus.len(), 2);
        assert_eq!(focus[0]["focusedField"], CardField::CardNumber.as_str());
        assert!(focus[1]["focusedField"].is_null());
        assert_eq!(sink.payloads("onCardChange").len(), 2);
        thread.shutdown().expect("clean shutdown");
    }

    #[tokio::test]
    async fn test_calls_after_shutdown_are_dropped() {
        let (thread, _sink) = start();
        let ui = thread.handle();
        thread.shutdown().expect("clean shutdown");

        assert!(!ui.is_running());
        ui.command(ComponentId::new(), "focus");
        let result = ui.mount(CardFieldConfig::default()).await;

        assert!(matches!(result, Err(UiThreadError::Stopped)));
    }

    #[tokio::test]
    async fn test_state_of_unmounted_component_is_none() {
        let (thread, _sink) = start();
        let ui = thread.handle();
        let id = ui.mount(CardFieldConfig::default()).await.expect("mounted");

        ui.unmount(id);

        assert!(ui.current_state(id).await.expect("reply").is_none());
        assert!(ui.current_card_params().await.expect("reply").is_none());
        thread.shutdown().expect("clean shutdown");
    }

    #[tokio::test]
    async fn test_abandoned_queries_do_not_stop_the_thread() {
        // Arrange
        let (thread, _sink) = start();
        let ui = thread.handle();
        let (params_reply, params_rx) = oneshot::channel();
        let (mount_reply, mount_rx) = oneshot::channel();
        drop(params_rx);
        drop(mount_rx);

        // Act
        assert!(ui.send(HostCall::CurrentCardParams { reply: params_reply }));
        assert!(ui.send(HostCall::Mount { config: CardFieldConfig::default(), reply: mount_reply }));
        let id = ui.mount(CardFieldConfig::default()).await.expect("still serving");

        // Assert
        assert!(ui.current_state(id).await.expect("reply").is_some());
        thread.shutdown().expect("clean shutdown");
    }
}
